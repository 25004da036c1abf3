//! Keeps the carousel cursor and the queue's current index in step.
//!
//! Two pieces of state move independently: the queue index (changed by
//! playback and queue operations) and the cursor (changed by the user
//! dragging). Moving one must not bounce back through the other.
//!
//! ```text
//!            sync_to_queue (programmatic move, token t)
//!   Idle ───────────────────────────────────────────► AwaitingEcho(Some t)
//!    ▲                                                   │      ▲
//!    │ release(t)                                        │      │ sync_to_queue
//!    └───────────────────────────────────────────────────┘      │
//!    │                                                          │
//!    │ settle on new slot (Jump)                                │
//!    └──────────────────────────────────────► AwaitingEcho(None)┘
//! ```
//!
//! Position reports received outside `Idle` are discarded.

/// Distance from an integer slot at which a position counts as settled.
pub const SLOT_EPSILON: f64 = 0.001;

/// Token identifying one programmatic move; only its own release ends it.
pub type ReleaseToken = u64;

/// Snapshot of the user-facing cursor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cursor {
    pub float_position: f64,
    pub settled_index: Option<usize>,
    /// Position changes are not user navigation while set
    pub suppress_feedback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Echo {
    Idle,
    /// `Some` while a release timer is pending, `None` while waiting for
    /// the queue to echo an accepted user jump
    AwaitingEcho(Option<ReleaseToken>),
}

/// Programmatic cursor move the presentation must perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPlan {
    /// Number of carousel slots (equals queue length)
    pub slot_count: usize,
    /// Slot to scroll to without animation
    pub scroll_to: Option<usize>,
    /// Pass to [`PositionReconciler::release`] once the cursor has settled
    pub token: ReleaseToken,
}

/// What a reported cursor position means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionOutcome {
    /// Suppressed or unresolvable; nothing to do
    Discarded,
    /// Still moving; `center` is the nearest slot
    Preview { center: usize },
    /// Came to rest on the slot that is already current
    Settled { index: usize },
    /// Came to rest on another slot; the queue should jump there
    Jump { index: usize },
}

/// Bridge between the queue's current index and the cursor.
#[derive(Debug, Clone)]
pub struct PositionReconciler {
    cursor: Cursor,
    echo: Echo,
    slot_count: usize,
    epsilon: f64,
    next_token: ReleaseToken,
}

impl Default for PositionReconciler {
    fn default() -> Self {
        Self::new(SLOT_EPSILON)
    }
}

impl PositionReconciler {
    pub fn new(epsilon: f64) -> Self {
        Self {
            cursor: Cursor::default(),
            echo: Echo::Idle,
            slot_count: 0,
            epsilon,
            next_token: 0,
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn is_suppressed(&self) -> bool {
        self.echo != Echo::Idle
    }

    fn set_echo(&mut self, echo: Echo) {
        self.echo = echo;
        self.cursor.suppress_feedback = echo != Echo::Idle;
    }

    /// Move the cursor to the queue's current index.
    ///
    /// Returns `None` for an empty queue, leaving the cursor untouched.
    /// Otherwise suppression starts and lasts until `release` is called
    /// with the returned token.
    pub fn sync_to_queue(&mut self, queue_len: usize, current: Option<usize>) -> Option<SyncPlan> {
        if queue_len == 0 {
            return None;
        }

        self.next_token += 1;
        let token = self.next_token;
        self.set_echo(Echo::AwaitingEcho(Some(token)));
        self.slot_count = queue_len;

        let scroll_to = current.filter(|&i| i < queue_len);
        if let Some(index) = scroll_to {
            self.cursor.float_position = index as f64;
            self.cursor.settled_index = Some(index);
        }

        Some(SyncPlan {
            slot_count: queue_len,
            scroll_to,
            token,
        })
    }

    /// End suppression for a programmatic move. Stale tokens are ignored.
    pub fn release(&mut self, token: ReleaseToken) -> bool {
        if self.echo == Echo::AwaitingEcho(Some(token)) {
            self.set_echo(Echo::Idle);
            true
        } else {
            tracing::trace!("Ignoring stale cursor release {}", token);
            false
        }
    }

    /// Interpret a cursor position reported by the presentation.
    pub fn on_position_changed(
        &mut self,
        position: f64,
        current: Option<usize>,
        queue_len: usize,
    ) -> PositionOutcome {
        self.cursor.float_position = position;

        if self.is_suppressed() {
            return PositionOutcome::Discarded;
        }

        if !position.is_finite() {
            tracing::trace!("Ignoring non-finite cursor position {}", position);
            return PositionOutcome::Discarded;
        }
        let rounded = position.round();
        if rounded < 0.0 || rounded as usize >= self.slot_count {
            return PositionOutcome::Discarded;
        }
        let index = rounded as usize;

        if (position - rounded).abs() > self.epsilon {
            return PositionOutcome::Preview { center: index };
        }
        self.cursor.settled_index = Some(index);

        if index >= queue_len {
            // Slot from a window that no longer matches the queue
            tracing::trace!("Settled on slot {} outside queue of {}", index, queue_len);
            return PositionOutcome::Discarded;
        }

        if current == Some(index) {
            return PositionOutcome::Settled { index };
        }

        self.set_echo(Echo::AwaitingEcho(None));
        PositionOutcome::Jump { index }
    }
}
