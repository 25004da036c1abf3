//! Sliding window of loaded artwork around the carousel center.

use tokio::task::AbortHandle;

use super::loader::LoadedAsset;
use super::resolution::{AssetTarget, target_for};

/// Load ordering hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    High,
    Normal,
}

/// One carousel slot's artwork.
#[derive(Debug, Default)]
pub struct AssetRef {
    target: Option<AssetTarget>,
    loaded: Option<LoadedAsset>,
    visible: bool,
    ticket: u64,
    in_flight: Option<AbortHandle>,
}

impl AssetRef {
    fn placeholder() -> Self {
        Self {
            target: None,
            loaded: None,
            visible: true,
            ticket: 0,
            in_flight: None,
        }
    }

    pub fn primary_url(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.primary.as_str())
    }

    pub fn fallback_chain(&self) -> &[String] {
        match &self.target {
            Some(target) => &target.fallbacks,
            None => &[],
        }
    }

    /// URL of the artwork currently shown, if any.
    pub fn loaded_url(&self) -> Option<&str> {
        self.loaded.as_ref().map(|a| a.url.as_str())
    }

    pub fn loaded(&self) -> Option<&LoadedAsset> {
        self.loaded.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }

    /// Point the slot at a new target (or none), invalidating any load in
    /// flight for the old one.
    fn retarget(&mut self, target: Option<AssetTarget>, next_ticket: &mut u64) -> u64 {
        self.cancel();
        *next_ticket += 1;
        self.ticket = *next_ticket;
        if target.is_none() {
            self.loaded = None;
        }
        self.target = target;
        self.ticket
    }
}

impl Drop for AssetRef {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A load the caller should start and then [`attach`](WindowedPrefetcher::attach).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub slot: usize,
    pub ticket: u64,
    pub target: AssetTarget,
    pub priority: Priority,
}

/// Keeps artwork loaded for slots within `radius` of the center.
#[derive(Debug)]
pub struct WindowedPrefetcher {
    radius: usize,
    slots: Vec<AssetRef>,
    last_center: Option<usize>,
    next_ticket: u64,
}

impl WindowedPrefetcher {
    pub fn new(radius: usize) -> Self {
        Self {
            radius,
            slots: Vec::new(),
            last_center: None,
            next_ticket: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: usize) -> Option<&AssetRef> {
        self.slots.get(index)
    }

    pub fn last_center(&self) -> Option<usize> {
        self.last_center
    }

    /// Match the slot count to the queue. Removed slots cancel their loads.
    pub fn resize(&mut self, len: usize) {
        self.slots.truncate(len);
        while self.slots.len() < len {
            self.slots.push(AssetRef::placeholder());
        }
    }

    /// Make the next [`recompute`](Self::recompute) run even for an
    /// unchanged center.
    pub fn invalidate(&mut self) {
        self.last_center = None;
    }

    /// Recompute which slots hold artwork for a new center.
    ///
    /// `thumbnail` is only asked about slots inside the window. Returns the
    /// loads to start, high priority first. Nothing happens when the center
    /// has not moved since the last call.
    ///
    /// Slots outside the window drop their artwork but stay visible as
    /// placeholders; only slots with no thumbnail at all are hidden.
    pub fn recompute<'a>(
        &mut self,
        center: usize,
        active: Option<usize>,
        thumbnail: impl Fn(usize) -> Option<&'a str>,
    ) -> Vec<LoadRequest> {
        if self.last_center == Some(center) {
            return Vec::new();
        }
        self.last_center = Some(center);

        let mut requests = Vec::new();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if i.abs_diff(center) > self.radius {
                // Outside the window: free the artwork, keep the slot's space
                slot.visible = true;
                if slot.target.is_some() || slot.loaded.is_some() {
                    slot.retarget(None, &mut self.next_ticket);
                }
                continue;
            }

            let Some(thumb) = thumbnail(i) else {
                slot.visible = false;
                if slot.target.is_some() || slot.loaded.is_some() {
                    slot.retarget(None, &mut self.next_ticket);
                }
                continue;
            };

            slot.visible = true;
            let is_active = active == Some(i);
            let target = target_for(thumb, is_active);
            if slot.primary_url() == Some(target.primary.as_str()) {
                continue;
            }

            let ticket = slot.retarget(Some(target.clone()), &mut self.next_ticket);
            requests.push(LoadRequest {
                slot: i,
                ticket,
                target,
                priority: if is_active {
                    Priority::High
                } else {
                    Priority::Normal
                },
            });
        }

        requests.sort_by_key(|r| r.priority);
        requests
    }

    /// Register the task serving a request. A handle for a request that has
    /// already been superseded is aborted right away.
    pub fn attach(&mut self, slot: usize, ticket: u64, handle: AbortHandle) {
        match self.slots.get_mut(slot) {
            Some(s) if s.ticket == ticket => {
                s.cancel();
                s.in_flight = Some(handle);
            }
            _ => handle.abort(),
        }
    }

    /// Apply a finished load. Returns `false` when the result is stale.
    pub fn complete(&mut self, slot: usize, ticket: u64, asset: Option<LoadedAsset>) -> bool {
        let Some(s) = self.slots.get_mut(slot) else {
            return false;
        };
        if s.ticket != ticket {
            tracing::trace!("Dropping stale artwork for slot {}", slot);
            return false;
        }
        s.in_flight = None;
        s.loaded = asset;
        true
    }
}
