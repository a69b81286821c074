/// Gallery browsing state
///
/// Holds the ordered artworks fetched from the store, the current selection
/// and the zoom factor, and keeps attached list views in step with them.
/// It never talks to the store itself: the shell mutates through the store
/// and then hands the fresh `get_all()` result to `reload`.

use super::data::{ArtworkId, ArtworkRecord};

/// Zoom bounds and step
pub const ZOOM_MIN: f64 = 0.4;
pub const ZOOM_MAX: f64 = 3.0;
pub const ZOOM_STEP: f64 = 0.2;
pub const ZOOM_DEFAULT: f64 = 1.0;

/// A list widget showing one label per artwork with a highlighted row
pub trait ListView {
    /// Replace all rows
    fn populate(&mut self, labels: &[String]);
    /// Highlight a row, or clear the highlight
    fn select(&mut self, index: Option<usize>);
}

/// Selection is `None` exactly when `items` is empty; otherwise it is a
/// valid index into `items`.
pub struct GalleryState {
    items: Vec<ArtworkRecord>,
    current: Option<usize>,
    zoom: f64,
    views: Vec<Box<dyn ListView>>,
}

impl Default for GalleryState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current: None,
            zoom: ZOOM_DEFAULT,
            views: Vec::new(),
        }
    }
}

impl GalleryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a list view and bring it up to date immediately
    pub fn attach_view(&mut self, mut view: Box<dyn ListView>) {
        view.populate(&self.list_labels());
        view.select(self.current);
        self.views.push(view);
    }

    // ========== Queries ==========

    #[cfg(test)]
    pub fn items(&self) -> &[ArtworkRecord] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_record(&self) -> Option<&ArtworkRecord> {
        self.current.and_then(|i| self.items.get(i))
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn can_select_previous(&self) -> bool {
        matches!(self.current, Some(i) if i > 0)
    }

    pub fn can_select_next(&self) -> bool {
        matches!(self.current, Some(i) if i + 1 < self.items.len())
    }

    /// One "#id - title" label per artwork, in gallery order
    pub fn list_labels(&self) -> Vec<String> {
        self.items.iter().map(ArtworkRecord::list_label).collect()
    }

    // ========== Transitions ==========

    /// Replace the whole collection with a fresh snapshot from the store.
    ///
    /// The selection follows the previously selected artwork by ID. If that
    /// artwork is gone the old index is clamped into the new bounds; an empty
    /// snapshot clears the selection.
    pub fn reload(&mut self, items: Vec<ArtworkRecord>) {
        let previous_index = self.current;
        let previous_id = self.current_record().map(|r| r.id);

        self.items = items;
        self.current = if self.items.is_empty() {
            None
        } else {
            let kept = previous_id.and_then(|id| self.position_of(id));
            let clamped = previous_index.unwrap_or(0).min(self.items.len() - 1);
            Some(kept.unwrap_or(clamped))
        };

        let current_id = self.current_record().map(|r| r.id);
        if self.current != previous_index || current_id != previous_id {
            self.zoom = ZOOM_DEFAULT;
        }

        let labels = self.list_labels();
        for view in &mut self.views {
            view.populate(&labels);
            view.select(self.current);
        }
    }

    /// Select the artwork at `index`. Out-of-range indices are ignored.
    pub fn select_index(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.set_current(index);
        true
    }

    /// Select the artwork with this ID, if it is in the gallery
    pub fn select_id(&mut self, id: ArtworkId) -> bool {
        match self.position_of(id) {
            Some(index) => self.select_index(index),
            None => false,
        }
    }

    /// Move to the next artwork; no-op on the last one
    pub fn select_next(&mut self) -> bool {
        if !self.can_select_next() {
            return false;
        }
        let next = self.current.map_or(0, |i| i + 1);
        self.set_current(next);
        true
    }

    /// Move to the previous artwork; no-op on the first one
    pub fn select_previous(&mut self) -> bool {
        if !self.can_select_previous() {
            return false;
        }
        let previous = self.current.map_or(0, |i| i - 1);
        self.set_current(previous);
        true
    }

    pub fn zoom_in(&mut self) -> bool {
        self.adjust_zoom(ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.adjust_zoom(-ZOOM_STEP)
    }

    fn adjust_zoom(&mut self, delta: f64) -> bool {
        if self.current.is_none() {
            return false;
        }
        let zoom = (self.zoom + delta).clamp(ZOOM_MIN, ZOOM_MAX);
        if zoom == self.zoom {
            return false;
        }
        self.zoom = zoom;
        true
    }

    fn set_current(&mut self, index: usize) {
        self.current = Some(index);
        self.zoom = ZOOM_DEFAULT;
        for view in &mut self.views {
            view.select(self.current);
        }
    }

    fn position_of(&self, id: ArtworkId) -> Option<usize> {
        self.items.iter().position(|r| r.id == id)
    }
}

impl std::fmt::Debug for GalleryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryState")
            .field("items", &self.items.len())
            .field("current", &self.current)
            .field("zoom", &self.zoom)
            .field("views", &self.views.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record(id: ArtworkId) -> ArtworkRecord {
        ArtworkRecord {
            id,
            title: format!("Art {}", id),
            artist: "Artist".to_string(),
            description: String::new(),
            image: None,
            created_at: Some(Utc::now()),
        }
    }

    fn records(ids: &[ArtworkId]) -> Vec<ArtworkRecord> {
        ids.iter().copied().map(record).collect()
    }

    fn gallery(ids: &[ArtworkId]) -> GalleryState {
        let mut state = GalleryState::new();
        state.reload(records(ids));
        state
    }

    /// List view that remembers what it was told
    #[derive(Clone, Default)]
    struct RecordingView {
        labels: Rc<RefCell<Vec<String>>>,
        selected: Rc<RefCell<Option<usize>>>,
    }

    impl ListView for RecordingView {
        fn populate(&mut self, labels: &[String]) {
            *self.labels.borrow_mut() = labels.to_vec();
        }

        fn select(&mut self, index: Option<usize>) {
            *self.selected.borrow_mut() = index;
        }
    }

    #[test]
    fn test_empty_gallery() {
        let mut state = GalleryState::new();
        state.reload(Vec::new());

        assert_eq!(state.current_index(), None);
        assert!(state.current_record().is_none());
        assert!(!state.select_next());
        assert!(!state.select_previous());
        assert!(!state.zoom_in());
        assert!(!state.zoom_out());
        assert!(!state.select_index(0));
        assert_eq!(state.zoom(), ZOOM_DEFAULT);
    }

    #[test]
    fn test_first_load_selects_first() {
        let state = gallery(&[3, 5, 9]);
        assert_eq!(state.current_index(), Some(0));
        assert_eq!(state.current_record().unwrap().id, 3);
    }

    #[test]
    fn test_navigation_bounds() {
        let mut state = gallery(&[1, 2, 3, 4]);

        for _ in 0..10 {
            state.select_next();
        }
        assert_eq!(state.current_index(), Some(3));
        assert!(!state.can_select_next());
        assert!(!state.select_next());

        for _ in 0..10 {
            state.select_previous();
        }
        assert_eq!(state.current_index(), Some(0));
        assert!(!state.can_select_previous());
        assert!(!state.select_previous());
    }

    #[test]
    fn test_select_index_out_of_range_is_noop() {
        let mut state = gallery(&[1, 2]);
        state.select_index(1);
        state.zoom_in();
        let zoom = state.zoom();

        assert!(!state.select_index(2));
        assert_eq!(state.current_index(), Some(1));
        assert_eq!(state.zoom(), zoom);
    }

    #[test]
    fn test_select_id() {
        let mut state = gallery(&[10, 20, 30]);
        assert!(state.select_id(30));
        assert_eq!(state.current_index(), Some(2));
        assert!(!state.select_id(99));
        assert_eq!(state.current_index(), Some(2));
    }

    #[test]
    fn test_zoom_bounds() {
        let mut state = gallery(&[1]);

        for _ in 0..50 {
            state.zoom_in();
        }
        assert!(state.zoom() <= ZOOM_MAX);
        assert_eq!(state.zoom(), ZOOM_MAX);
        assert!(!state.zoom_in());

        for _ in 0..50 {
            state.zoom_out();
        }
        assert!(state.zoom() >= ZOOM_MIN);
        assert_eq!(state.zoom(), ZOOM_MIN);
        assert!(!state.zoom_out());
    }

    #[test]
    fn test_navigation_resets_zoom() {
        let mut state = gallery(&[1, 2]);
        state.zoom_in();
        state.zoom_in();
        assert!(state.zoom() > ZOOM_DEFAULT);

        assert!(state.select_next());
        assert_eq!(state.zoom(), ZOOM_DEFAULT);

        // A no-op move keeps the zoom
        state.zoom_out();
        let zoom = state.zoom();
        assert!(!state.select_next());
        assert_eq!(state.zoom(), zoom);
    }

    #[test]
    fn test_reload_follows_selected_id() {
        let mut state = gallery(&[1, 2, 3]);
        state.select_index(2);
        state.zoom_in();

        // Artwork 1 removed elsewhere: same artwork, new index
        state.reload(records(&[2, 3]));
        assert_eq!(state.current_index(), Some(1));
        assert_eq!(state.current_record().unwrap().id, 3);
        assert_eq!(state.zoom(), ZOOM_DEFAULT);

        // Same index and same artwork: zoom survives the reload
        state.zoom_in();
        state.reload(records(&[2, 3, 4]));
        assert_eq!(state.current_record().unwrap().id, 3);
        assert!(state.zoom() > ZOOM_DEFAULT);
    }

    #[test]
    fn test_reload_after_selected_deleted() {
        let mut state = gallery(&[1, 2, 3]);
        state.select_index(1);

        state.reload(records(&[1, 3]));
        let index = state.current_index().unwrap();
        assert!(index < state.len());
        assert_eq!(state.current_record().unwrap().id, 3);
    }

    #[test]
    fn test_reload_clamps_past_end() {
        let mut state = gallery(&[1, 2, 3]);
        state.select_index(2);

        state.reload(records(&[1]));
        assert_eq!(state.current_index(), Some(0));
    }

    #[test]
    fn test_delete_only_record() {
        let mut state = gallery(&[7]);
        state.zoom_in();

        state.reload(Vec::new());
        assert_eq!(state.current_index(), None);
        assert!(state.current_record().is_none());
        assert_eq!(state.zoom(), ZOOM_DEFAULT);
        assert!(!state.select_next());
        assert!(!state.select_previous());
        assert!(!state.zoom_in());
    }

    #[test]
    fn test_list_view_sync() {
        let view = RecordingView::default();
        let mut state = gallery(&[4, 8]);
        state.attach_view(Box::new(view.clone()));

        assert_eq!(*view.labels.borrow(), vec!["#4 - Art 4", "#8 - Art 8"]);
        assert_eq!(*view.selected.borrow(), Some(0));

        state.select_next();
        assert_eq!(*view.selected.borrow(), Some(1));

        state.reload(records(&[4]));
        assert_eq!(*view.labels.borrow(), vec!["#4 - Art 4"]);
        assert_eq!(*view.selected.borrow(), Some(0));

        state.reload(Vec::new());
        assert!(view.labels.borrow().is_empty());
        assert_eq!(*view.selected.borrow(), None);
    }

    #[test]
    fn test_multiple_views_stay_consistent() {
        let a = RecordingView::default();
        let b = RecordingView::default();
        let mut state = GalleryState::new();
        state.attach_view(Box::new(a.clone()));
        state.attach_view(Box::new(b.clone()));

        state.reload(records(&[1, 2, 3]));
        state.select_id(3);

        assert_eq!(*a.labels.borrow(), *b.labels.borrow());
        assert_eq!(*a.selected.borrow(), Some(2));
        assert_eq!(*b.selected.borrow(), Some(2));
    }
}
