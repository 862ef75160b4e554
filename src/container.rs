//! The content container and generation-scoped access to it.
//!
//! The application owns one content container; every dispatch takes it over
//! by clearing it. Loaders never touch the container directly. They get a
//! [`Mount`], which remembers the dispatch generation it was created for and
//! rejects writes with [`ViewError::Stale`] once a newer dispatch has begun.
//! A slow response from an abandoned view therefore cannot land in the page
//! that replaced it.

use crate::error::ViewError;
use crate::lifecycle::DispatchToken;
use crate::{trace_log, warn_log};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// The surface views render into (a DOM element in a browser host).
///
/// Implementations use interior mutability; the router is single-threaded.
pub trait Container: 'static {
    /// A renderable piece of view (element, markup, widget handle).
    type Node;

    /// Remove everything rendered so far.
    fn clear(&self);

    /// Append a node after the existing content.
    fn append(&self, node: Self::Node);

    /// Append a plain text message. Used for the built-in 404, error and
    /// per-section fallback messages.
    fn append_text(&self, text: &str);
}

/// Generation-checked handle to the content container.
pub struct Mount<C: Container> {
    container: Rc<C>,
    token: DispatchToken,
}

impl<C: Container> Mount<C> {
    pub(crate) fn new(container: Rc<C>, token: DispatchToken) -> Self {
        Self { container, token }
    }

    /// Generation of the dispatch this mount belongs to.
    pub fn generation(&self) -> u64 {
        self.token.generation()
    }

    /// `true` while no newer dispatch has started.
    pub fn is_current(&self) -> bool {
        self.token.is_current()
    }

    fn check(&self, op: &str) -> Result<(), ViewError> {
        if self.token.is_current() {
            trace_log!("Mount {} at generation {}", op, self.generation());
            Ok(())
        } else {
            warn_log!(
                "Dropped stale {} from generation {}",
                op,
                self.generation()
            );
            Err(ViewError::Stale)
        }
    }

    pub fn clear(&self) -> Result<(), ViewError> {
        self.check("clear")?;
        self.container.clear();
        Ok(())
    }

    pub fn append(&self, node: C::Node) -> Result<(), ViewError> {
        self.check("append")?;
        self.container.append(node);
        Ok(())
    }

    pub fn append_text(&self, text: &str) -> Result<(), ViewError> {
        self.check("append_text")?;
        self.container.append_text(text);
        Ok(())
    }
}

impl<C: Container> Clone for Mount<C> {
    fn clone(&self) -> Self {
        Self {
            container: Rc::clone(&self.container),
            token: self.token.clone(),
        }
    }
}

impl<C: Container> fmt::Debug for Mount<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mount")
            .field("generation", &self.generation())
            .field("current", &self.is_current())
            .finish()
    }
}

/// In-memory container holding rendered nodes as strings.
///
/// Useful for headless hosts and tests.
///
/// ```
/// use spa_navigator::{Container, MemoryContainer};
///
/// let container = MemoryContainer::new();
/// container.append("<h1>Events</h1>".to_string());
/// container.append_text("No events yet");
/// assert_eq!(container.nodes(), vec!["<h1>Events</h1>", "No events yet"]);
/// ```
#[derive(Debug, Default)]
pub struct MemoryContainer {
    nodes: RefCell<Vec<String>>,
    clears: Cell<usize>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the rendered nodes.
    pub fn nodes(&self) -> Vec<String> {
        self.nodes.borrow().clone()
    }

    /// All nodes joined with newlines.
    pub fn text(&self) -> String {
        self.nodes.borrow().join("\n")
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.nodes.borrow().iter().any(|n| n.contains(needle))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    /// How many times the container was cleared.
    pub fn clear_count(&self) -> usize {
        self.clears.get()
    }
}

impl Container for MemoryContainer {
    type Node = String;

    fn clear(&self) {
        self.nodes.borrow_mut().clear();
        self.clears.set(self.clears.get() + 1);
    }

    fn append(&self, node: String) {
        self.nodes.borrow_mut().push(node);
    }

    fn append_text(&self, text: &str) {
        self.nodes.borrow_mut().push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::GenerationCounter;

    #[test]
    fn test_mount_writes_while_current() {
        let container = Rc::new(MemoryContainer::new());
        let counter = GenerationCounter::new();
        let mount = Mount::new(Rc::clone(&container), counter.advance());

        mount.append("<h1>Event</h1>".to_string()).unwrap();
        mount.append_text("Tickets").unwrap();
        assert_eq!(container.nodes(), vec!["<h1>Event</h1>", "Tickets"]);
    }

    #[test]
    fn test_mount_rejects_stale_writes() {
        let container = Rc::new(MemoryContainer::new());
        let counter = GenerationCounter::new();
        let old = Mount::new(Rc::clone(&container), counter.advance());
        let new = Mount::new(Rc::clone(&container), counter.advance());

        assert!(!old.is_current());
        assert_eq!(old.append("late".to_string()), Err(ViewError::Stale));
        assert_eq!(old.clear(), Err(ViewError::Stale));
        new.append("fresh".to_string()).unwrap();
        assert_eq!(container.nodes(), vec!["fresh"]);
    }

    #[test]
    fn test_clone_shares_generation() {
        let container = Rc::new(MemoryContainer::new());
        let counter = GenerationCounter::new();
        let mount = Mount::new(container, counter.advance());
        let copy = mount.clone();
        assert_eq!(mount.generation(), copy.generation());

        counter.advance();
        assert!(!copy.is_current());
    }

    #[test]
    fn test_memory_container_clear_count() {
        let container = MemoryContainer::new();
        container.append_text("a");
        container.clear();
        container.clear();
        assert!(container.is_empty());
        assert_eq!(container.clear_count(), 2);
    }
}
