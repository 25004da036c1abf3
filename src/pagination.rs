//! Near-end-of-list page loading for the collection view.

use crate::catalog::{Capabilities, CatalogError, CollectionKind, CollectionPage};

/// Pixels from the end of the list at which the next page is requested.
pub const DEFAULT_LOAD_MORE_THRESHOLD: f64 = 200.0;

/// Scroll offset past which the header title moves into the toolbar.
pub const DEFAULT_HEADER_TITLE_THRESHOLD: f64 = 100.0;

/// A page fetch the caller should run against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub collection_id: String,
    pub kind: CollectionKind,
    pub page_token: Option<String>,
    /// `false` for the first page, which replaces the collection
    pub append: bool,
    generation: u64,
}

/// What a scroll position means for the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollOutcome {
    pub show_header_title: bool,
    pub load_more: bool,
}

/// Decides when to fetch the next page and keeps one fetch in flight at most.
#[derive(Debug, Clone)]
pub struct PaginationController {
    threshold: f64,
    header_threshold: f64,
    collection_id: Option<String>,
    kind: CollectionKind,
    in_flight: bool,
    is_complete: bool,
    continuation: Option<String>,
    pages_loaded: usize,
    /// Bumped on reset so fetches for a previous collection are dropped
    generation: u64,
}

impl Default for PaginationController {
    fn default() -> Self {
        Self::new(DEFAULT_LOAD_MORE_THRESHOLD, DEFAULT_HEADER_TITLE_THRESHOLD)
    }
}

impl PaginationController {
    pub fn new(threshold: f64, header_threshold: f64) -> Self {
        Self {
            threshold,
            header_threshold,
            collection_id: None,
            kind: CollectionKind::default(),
            in_flight: false,
            is_complete: false,
            continuation: None,
            pages_loaded: 0,
            generation: 0,
        }
    }

    /// Start over for another collection.
    pub fn reset(&mut self, collection_id: impl Into<String>, kind: CollectionKind) {
        self.collection_id = Some(collection_id.into());
        self.kind = kind;
        self.in_flight = false;
        self.is_complete = false;
        self.continuation = None;
        self.pages_loaded = 0;
        self.generation += 1;
    }

    pub fn collection_id(&self) -> Option<&str> {
        self.collection_id.as_deref()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    /// Interpret a scroll position.
    ///
    /// `upper` is the scrollable extent and `page_size` the visible height.
    pub fn on_scroll(&self, value: f64, upper: f64, page_size: f64) -> ScrollOutcome {
        let max = upper - page_size;
        let near_end = max > 0.0 && value >= max - self.threshold;

        ScrollOutcome {
            show_header_title: value > self.header_threshold,
            load_more: near_end && self.can_fetch(),
        }
    }

    fn can_fetch(&self) -> bool {
        !self.in_flight && !self.is_complete && self.collection_id.is_some()
    }

    /// Claim the in-flight slot and describe the next fetch.
    pub fn begin_fetch(&mut self) -> Option<FetchRequest> {
        if !self.can_fetch() {
            return None;
        }
        let collection_id = self.collection_id.clone()?;
        self.in_flight = true;

        Some(FetchRequest {
            collection_id,
            kind: self.kind,
            page_token: self.continuation.clone(),
            append: self.pages_loaded > 0,
            generation: self.generation,
        })
    }

    /// Record a fetched page. Returns `false` when the request belongs to a
    /// collection that has since been replaced.
    pub fn finish(&mut self, request: &FetchRequest, page: &CollectionPage) -> bool {
        if request.generation != self.generation {
            tracing::debug!("Dropping page for stale collection {}", request.collection_id);
            return false;
        }
        self.in_flight = false;
        self.pages_loaded += 1;
        self.continuation = page.continuation.clone();

        let capabilities = self.capabilities();
        if !capabilities.is_infinite && page.is_last(capabilities.fetch) {
            self.is_complete = true;
        }
        true
    }

    /// Record a failed fetch; a later scroll retries.
    pub fn fail(&mut self, request: &FetchRequest, error: &CatalogError) {
        if request.generation != self.generation {
            return;
        }
        self.in_flight = false;
        tracing::warn!(
            "Failed to load page of {}: {}",
            request.collection_id,
            error
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mock_track;

    fn page(n: usize, continuation: Option<&str>) -> CollectionPage {
        CollectionPage {
            tracks: (0..n).map(|i| mock_track(&format!("v{i}"), "T", "A")).collect(),
            continuation: continuation.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_load_more_near_end() {
        let mut p = PaginationController::default();
        p.reset("PL1", CollectionKind::Playlist);

        assert!(!p.on_scroll(500.0, 2000.0, 800.0).load_more);
        assert!(p.on_scroll(1000.0, 2000.0, 800.0).load_more);
        assert!(p.on_scroll(1200.0, 2000.0, 800.0).load_more);
    }

    #[test]
    fn test_no_load_when_content_fits() {
        let mut p = PaginationController::default();
        p.reset("PL1", CollectionKind::Playlist);
        assert!(!p.on_scroll(0.0, 600.0, 800.0).load_more);
    }

    #[test]
    fn test_no_load_without_collection() {
        let p = PaginationController::default();
        assert!(!p.on_scroll(1200.0, 2000.0, 800.0).load_more);
    }

    #[test]
    fn test_header_title_threshold() {
        let p = PaginationController::default();
        assert!(!p.on_scroll(100.0, 2000.0, 800.0).show_header_title);
        assert!(p.on_scroll(101.0, 2000.0, 800.0).show_header_title);
    }

    #[test]
    fn test_single_fetch_in_flight() {
        let mut p = PaginationController::default();
        p.reset("PL1", CollectionKind::Playlist);

        let first = p.begin_fetch().unwrap();
        assert!(!first.append);
        assert!(first.page_token.is_none());
        assert!(p.is_loading());
        assert!(p.begin_fetch().is_none());
        assert!(!p.on_scroll(1200.0, 2000.0, 800.0).load_more);

        assert!(p.finish(&first, &page(100, Some("c1"))));
        let second = p.begin_fetch().unwrap();
        assert!(second.append);
        assert_eq!(second.page_token.as_deref(), Some("c1"));
    }

    #[test]
    fn test_playlist_completes_without_continuation() {
        let mut p = PaginationController::default();
        p.reset("PL1", CollectionKind::Playlist);
        let r = p.begin_fetch().unwrap();
        p.finish(&r, &page(30, None));

        assert!(p.is_complete());
        assert!(p.begin_fetch().is_none());
    }

    #[test]
    fn test_album_completes_after_first_page() {
        let mut p = PaginationController::default();
        p.reset("MPRE1", CollectionKind::Album);
        let r = p.begin_fetch().unwrap();
        p.finish(&r, &page(12, Some("ignored")));
        assert!(p.is_complete());
    }

    #[test]
    fn test_mix_never_completes() {
        let mut p = PaginationController::default();
        p.reset("RD1", CollectionKind::Mix);
        for _ in 0..3 {
            let r = p.begin_fetch().unwrap();
            p.finish(&r, &page(0, None));
        }
        assert!(!p.is_complete());
        assert_eq!(p.pages_loaded(), 3);
    }

    #[test]
    fn test_failure_clears_guard() {
        let mut p = PaginationController::default();
        p.reset("PL1", CollectionKind::Playlist);
        let r = p.begin_fetch().unwrap();
        p.fail(&r, &CatalogError::Status(500));

        assert!(!p.is_loading());
        assert!(!p.is_complete());
        assert!(p.begin_fetch().is_some());
    }

    #[test]
    fn test_stale_completion_after_reset() {
        let mut p = PaginationController::default();
        p.reset("PL1", CollectionKind::Playlist);
        let old = p.begin_fetch().unwrap();

        p.reset("PL2", CollectionKind::Playlist);
        let fresh = p.begin_fetch().unwrap();
        assert!(!p.finish(&old, &page(5, None)));
        assert!(p.is_loading());
        assert!(p.finish(&fresh, &page(5, None)));
        assert!(p.is_complete());
    }
}
