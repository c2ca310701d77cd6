//! Drill-down navigation shared by the CI and Org views.
//!
//! A pane walks `List → Detail → SubDetail → Content`, one depth per
//! `descend`, and tracks the generation of its latest outstanding fetch so
//! completions that arrive out of order can be dropped.

use std::sync::atomic::{AtomicU64, Ordering};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Process-wide, so a rebuilt view never reuses a number an old instance issued
pub fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Latest outstanding fetch of one pane
#[derive(Debug, Default)]
pub struct FetchTracker {
    current: u64,
    loading: bool,
}

impl FetchTracker {
    pub fn begin(&mut self) -> u64 {
        self.current = next_generation();
        self.loading = true;
        self.current
    }

    /// True when `generation` is the latest request; settles the loading flag.
    pub fn settle(&mut self, generation: u64) -> bool {
        if generation != self.current {
            tracing::debug!(generation, current = self.current, "discarding stale completion");
            return false;
        }
        self.loading = false;
        true
    }

    /// Forget any outstanding request
    pub fn invalidate(&mut self) {
        self.current = next_generation();
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Depth {
    List,
    Detail,
    SubDetail,
    Content,
}

impl Depth {
    fn deeper(self) -> Option<Depth> {
        match self {
            Depth::List => Some(Depth::Detail),
            Depth::Detail => Some(Depth::SubDetail),
            Depth::SubDetail => Some(Depth::Content),
            Depth::Content => None,
        }
    }

    fn shallower(self) -> Option<Depth> {
        match self {
            Depth::List => None,
            Depth::Detail => Some(Depth::List),
            Depth::SubDetail => Some(Depth::Detail),
            Depth::Content => Some(Depth::SubDetail),
        }
    }
}

#[derive(Debug)]
pub struct PaneState {
    depth: Depth,
    deepest: Depth,
    fetch: FetchTracker,
}

impl PaneState {
    pub fn new(deepest: Depth) -> Self {
        Self {
            depth: Depth::List,
            deepest,
            fetch: FetchTracker::default(),
        }
    }

    pub fn depth(&self) -> Depth {
        self.depth
    }

    pub fn is_loading(&self) -> bool {
        self.fetch.is_loading()
    }

    pub fn begin_fetch(&mut self) -> u64 {
        self.fetch.begin()
    }

    pub fn settle(&mut self, generation: u64) -> bool {
        self.fetch.settle(generation)
    }

    /// Drop the outstanding fetch without changing depth
    pub fn cancel(&mut self) {
        self.fetch.invalidate();
    }

    /// Move one depth deeper; false at the pane's deepest depth.
    pub fn descend(&mut self) -> bool {
        match self.depth.deeper() {
            Some(next) if next <= self.deepest => {
                self.depth = next;
                true
            }
            _ => false,
        }
    }

    /// Move one depth up and return the depth that was left.
    /// Outstanding fetches belong to the old position and are invalidated.
    pub fn back(&mut self) -> Option<Depth> {
        let up = self.depth.shallower()?;
        let left = self.depth;
        self.depth = up;
        self.fetch.invalidate();
        Some(left)
    }
}

/// Cursor movement shared by every list and scroll view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Up,
    Down,
    Top,
    Bottom,
    PageUp,
    PageDown,
}

pub fn nav_key(key: &KeyEvent) -> Option<Nav> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => Some(Nav::Down),
        KeyCode::Char('k') | KeyCode::Up => Some(Nav::Up),
        KeyCode::Char('g') | KeyCode::Home => Some(Nav::Top),
        KeyCode::Char('G') | KeyCode::End => Some(Nav::Bottom),
        KeyCode::Char('d') if ctrl => Some(Nav::PageDown),
        KeyCode::Char('u') if ctrl => Some(Nav::PageUp),
        KeyCode::PageDown => Some(Nav::PageDown),
        KeyCode::PageUp => Some(Nav::PageUp),
        _ => None,
    }
}

/// Apply `nav` to a position in `0..len`
pub fn step(pos: usize, len: usize, nav: Nav, page: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let last = len - 1;
    let page = page.max(1);
    match nav {
        Nav::Up => pos.saturating_sub(1),
        Nav::Down => (pos + 1).min(last),
        Nav::Top => 0,
        Nav::Bottom => last,
        Nav::PageUp => pos.saturating_sub(page),
        Nav::PageDown => (pos + page).min(last),
    }
}

/// Items of one depth with a cursor
#[derive(Debug, Clone)]
pub struct Selectable<T> {
    items: Vec<T>,
    index: usize,
}

impl<T> Default for Selectable<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: 0,
        }
    }
}

impl<T> Selectable<T> {
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.index = 0;
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn selected(&self) -> Option<&T> {
        self.items.get(self.index)
    }

    pub fn navigate(&mut self, nav: Nav, page: usize) {
        self.index = step(self.index, self.items.len(), nav, page);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descend_stops_at_deepest() {
        let mut pane = PaneState::new(Depth::Detail);
        assert!(pane.descend());
        assert_eq!(pane.depth(), Depth::Detail);
        assert!(!pane.descend());
        assert_eq!(pane.depth(), Depth::Detail);
    }

    #[test]
    fn back_reports_the_depth_left() {
        let mut pane = PaneState::new(Depth::Content);
        pane.descend();
        pane.descend();
        pane.descend();
        assert_eq!(pane.back(), Some(Depth::Content));
        assert_eq!(pane.depth(), Depth::SubDetail);
        assert_eq!(pane.back(), Some(Depth::SubDetail));
        assert_eq!(pane.back(), Some(Depth::Detail));
        assert_eq!(pane.back(), None);
        assert_eq!(pane.depth(), Depth::List);
    }

    #[test]
    fn newer_fetch_makes_older_stale() {
        let mut pane = PaneState::new(Depth::Content);
        let first = pane.begin_fetch();
        let second = pane.begin_fetch();
        assert!(second > first);
        assert!(pane.settle(second));
        assert!(!pane.is_loading());
        assert!(!pane.settle(first));
    }

    #[test]
    fn back_invalidates_outstanding_fetch() {
        let mut pane = PaneState::new(Depth::Content);
        pane.descend();
        let generation = pane.begin_fetch();
        pane.back();
        assert!(!pane.is_loading());
        assert!(!pane.settle(generation));
    }

    #[test]
    fn cancel_keeps_depth() {
        let mut pane = PaneState::new(Depth::Detail);
        let generation = pane.begin_fetch();
        pane.cancel();
        assert_eq!(pane.depth(), Depth::List);
        assert!(!pane.is_loading());
        assert!(!pane.settle(generation));
    }

    #[test]
    fn generations_are_unique_across_panes() {
        let mut a = FetchTracker::default();
        let mut b = FetchTracker::default();
        let ga = a.begin();
        let gb = b.begin();
        assert_ne!(ga, gb);
        assert!(!b.settle(ga));
    }

    #[test]
    fn step_clamps() {
        assert_eq!(step(0, 0, Nav::Down, 10), 0);
        assert_eq!(step(0, 3, Nav::Up, 10), 0);
        assert_eq!(step(2, 3, Nav::Down, 10), 2);
        assert_eq!(step(1, 30, Nav::PageDown, 10), 11);
        assert_eq!(step(25, 30, Nav::PageDown, 10), 29);
        assert_eq!(step(5, 30, Nav::PageUp, 10), 0);
        assert_eq!(step(5, 30, Nav::Bottom, 10), 29);
    }

    #[test]
    fn selectable_resets_cursor_on_new_items() {
        let mut list = Selectable::default();
        list.set_items(vec!['a', 'b', 'c']);
        list.navigate(Nav::Bottom, 1);
        assert_eq!(list.selected(), Some(&'c'));
        list.set_items(vec!['x']);
        assert_eq!(list.selected(), Some(&'x'));
    }
}
