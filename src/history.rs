//! Session history.
//!
//! The router talks to the browser's history through the [`History`] trait:
//! push an entry, replace the current one, read the current location. Back
//! and forward are driven by the host: a browser implementation forwards its
//! `popstate` event to [`Router::on_pop`](crate::Router::on_pop). Hosts
//! without a browser use [`MemoryHistory`], whose [`back`](History::back) and
//! [`forward`](History::forward) move synchronously and hand the popped entry
//! straight back.

use crate::debug_log;
use crate::location::Location;
use std::cell::RefCell;

/// State payload stored with a history entry.
///
/// Event pages keep their selected tab here and in the URL fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryState {
    pub tab: Option<String>,
}

impl HistoryState {
    pub fn with_tab(tab: impl Into<String>) -> Self {
        Self {
            tab: Some(tab.into()),
        }
    }
}

/// One entry of the session history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub location: Location,
    pub state: HistoryState,
}

impl HistoryEntry {
    pub fn new(location: Location, state: HistoryState) -> Self {
        Self { location, state }
    }
}

/// The browser navigation API, as far as the router needs it.
pub trait History {
    /// The entry the user is currently on.
    fn current(&self) -> HistoryEntry;

    /// Add an entry after the current one, dropping any forward entries.
    fn push(&self, entry: HistoryEntry);

    /// Overwrite the current entry.
    fn replace(&self, entry: HistoryEntry);

    /// Number of entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Step back. Returns the new current entry when the move is
    /// synchronous, `None` when there is nothing to go back to or when the
    /// host will report the move later through a pop event.
    fn back(&self) -> Option<HistoryEntry>;

    /// Step forward. Same contract as [`back`](Self::back).
    fn forward(&self) -> Option<HistoryEntry>;
}

#[derive(Debug)]
struct Stack {
    entries: Vec<HistoryEntry>,
    current: usize,
}

/// In-memory history stack.
///
/// ```
/// use spa_navigator::{History, HistoryEntry, HistoryState, Location, MemoryHistory};
///
/// let history = MemoryHistory::new("/");
/// history.push(HistoryEntry::new(Location::parse("/events"), HistoryState::default()));
/// assert_eq!(history.len(), 2);
///
/// let popped = history.back().unwrap();
/// assert_eq!(popped.location.path(), "/");
/// assert_eq!(history.len(), 2);
/// ```
#[derive(Debug)]
pub struct MemoryHistory {
    stack: RefCell<Stack>,
}

impl MemoryHistory {
    /// Start with a single entry at `initial`.
    pub fn new(initial: impl Into<Location>) -> Self {
        Self {
            stack: RefCell::new(Stack {
                entries: vec![HistoryEntry::new(initial.into(), HistoryState::default())],
                current: 0,
            }),
        }
    }

    /// Index of the current entry.
    pub fn index(&self) -> usize {
        self.stack.borrow().current
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.stack.borrow().entries.clone()
    }

    pub fn can_go_back(&self) -> bool {
        self.stack.borrow().current > 0
    }

    pub fn can_go_forward(&self) -> bool {
        let stack = self.stack.borrow();
        stack.current + 1 < stack.entries.len()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn current(&self) -> HistoryEntry {
        let stack = self.stack.borrow();
        stack.entries[stack.current].clone()
    }

    fn push(&self, entry: HistoryEntry) {
        let mut stack = self.stack.borrow_mut();
        let keep = stack.current + 1;
        stack.entries.truncate(keep);
        debug_log!("History push: '{}'", entry.location);
        stack.entries.push(entry);
        stack.current += 1;
    }

    fn replace(&self, entry: HistoryEntry) {
        let mut stack = self.stack.borrow_mut();
        debug_log!("History replace: '{}'", entry.location);
        let current = stack.current;
        stack.entries[current] = entry;
    }

    fn len(&self) -> usize {
        self.stack.borrow().entries.len()
    }

    fn back(&self) -> Option<HistoryEntry> {
        let mut stack = self.stack.borrow_mut();
        if stack.current == 0 {
            return None;
        }
        stack.current -= 1;
        Some(stack.entries[stack.current].clone())
    }

    fn forward(&self) -> Option<HistoryEntry> {
        let mut stack = self.stack.borrow_mut();
        if stack.current + 1 >= stack.entries.len() {
            return None;
        }
        stack.current += 1;
        Some(stack.entries[stack.current].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> HistoryEntry {
        HistoryEntry::new(Location::parse(path), HistoryState::default())
    }

    #[test]
    fn test_push_back_forward() {
        let history = MemoryHistory::new("/");
        history.push(entry("/events"));
        history.push(entry("/event/42"));
        assert_eq!(history.current().location.path(), "/event/42");

        assert_eq!(history.back().unwrap().location.path(), "/events");
        assert_eq!(history.forward().unwrap().location.path(), "/event/42");
        assert!(history.forward().is_none());
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let history = MemoryHistory::new("/");
        history.push(entry("/a"));
        history.push(entry("/b"));
        history.back();
        history.push(entry("/c"));

        let paths: Vec<String> = history
            .entries()
            .iter()
            .map(|e| e.location.path().to_string())
            .collect();
        assert_eq!(paths, vec!["/", "/a", "/c"]);
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_replace() {
        let history = MemoryHistory::new("/");
        history.push(entry("/event/7"));
        history.replace(HistoryEntry::new(
            Location::parse("/event/7#media"),
            HistoryState::with_tab("media"),
        ));

        let current = history.current();
        assert_eq!(current.location.fragment(), Some("media"));
        assert_eq!(current.state.tab.as_deref(), Some("media"));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_back_at_start() {
        let history = MemoryHistory::default();
        assert!(!history.can_go_back());
        assert!(history.back().is_none());
        assert_eq!(history.index(), 0);
    }
}
