//! Cooperative cancellation.
//!
//! An [`AbortController`] owns a cancellation flag; [`AbortSignal`]s are cheap
//! clones of it handed to whoever does the work. Aborting a controller:
//!
//! - flips the flag seen by [`AbortSignal::is_aborted`],
//! - resolves every future wrapped with [`AbortSignal::guard`] to
//!   `Err(Aborted)` on its next poll (the wrapped future is dropped),
//! - aborts every child controller created from the signal.
//!
//! The router gives each dispatch its own controller and every fetch made
//! from a view gets a child of it, so superseding a navigation cancels all
//! of its outstanding requests in one step.

use futures::future::{AbortHandle, Abortable};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};

pub use futures::future::Aborted;

#[derive(Default)]
struct SignalState {
    aborted: Cell<bool>,
    handles: RefCell<Vec<AbortHandle>>,
    children: RefCell<Vec<Weak<SignalState>>>,
}

impl SignalState {
    fn abort(&self) {
        if self.aborted.replace(true) {
            return;
        }
        for handle in self.handles.take() {
            handle.abort();
        }
        for child in self.children.take() {
            if let Some(child) = child.upgrade() {
                child.abort();
            }
        }
    }
}

/// Owner side of a cancellation flag.
///
/// ```
/// use spa_navigator::AbortController;
///
/// let controller = AbortController::new();
/// let signal = controller.signal();
/// let child = signal.child();
///
/// controller.abort();
/// assert!(signal.is_aborted());
/// assert!(child.is_aborted());
/// ```
#[derive(Default)]
pub struct AbortController {
    signal: AbortSignal,
}

impl AbortController {
    pub fn new() -> Self {
        Self::default()
    }

    /// A signal observing this controller.
    pub fn signal(&self) -> AbortSignal {
        self.signal.clone()
    }

    /// Abort the controller and everything derived from it. Idempotent.
    pub fn abort(&self) {
        self.signal.state.abort();
    }

    pub fn is_aborted(&self) -> bool {
        self.signal.is_aborted()
    }
}

impl fmt::Debug for AbortController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbortController")
            .field("aborted", &self.is_aborted())
            .finish()
    }
}

/// Observer side of a cancellation flag.
#[derive(Clone, Default)]
pub struct AbortSignal {
    state: Rc<SignalState>,
}

impl AbortSignal {
    /// A signal nobody can abort.
    pub fn never() -> Self {
        Self::default()
    }

    pub fn is_aborted(&self) -> bool {
        self.state.aborted.get()
    }

    /// Create a controller that is aborted together with this signal.
    ///
    /// Aborting the child does not affect the parent.
    pub fn child(&self) -> AbortController {
        let child = AbortController::new();
        if self.is_aborted() {
            child.abort();
        } else {
            let mut children = self.state.children.borrow_mut();
            children.retain(|c| c.strong_count() > 0);
            children.push(Rc::downgrade(&child.signal.state));
        }
        child
    }

    /// Wrap a future so it resolves to `Err(Aborted)` once this signal fires.
    ///
    /// ```
    /// use spa_navigator::AbortController;
    ///
    /// let controller = AbortController::new();
    /// let guarded = controller.signal().guard(async { 42 });
    /// controller.abort();
    /// assert!(futures::executor::block_on(guarded).is_err());
    /// ```
    pub fn guard<F: Future>(&self, future: F) -> Abortable<F> {
        let (handle, registration) = AbortHandle::new_pair();
        if self.is_aborted() {
            handle.abort();
        } else {
            let mut handles = self.state.handles.borrow_mut();
            handles.retain(|h| !h.is_aborted());
            handles.push(handle);
        }
        Abortable::new(future, registration)
    }
}

impl fmt::Debug for AbortSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbortSignal")
            .field("aborted", &self.is_aborted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;
    use futures::executor::block_on;

    #[test]
    fn test_guard_completes_when_not_aborted() {
        let controller = AbortController::new();
        let result = block_on(controller.signal().guard(async { "events" }));
        assert_eq!(result, Ok("events"));
    }

    #[test]
    fn test_abort_before_poll() {
        let controller = AbortController::new();
        let guarded = controller.signal().guard(async { 1 });
        controller.abort();
        assert_eq!(block_on(guarded), Err(Aborted));
    }

    #[test]
    fn test_guard_on_aborted_signal() {
        let controller = AbortController::new();
        controller.abort();
        assert_eq!(block_on(controller.signal().guard(async { 1 })), Err(Aborted));
    }

    #[test]
    fn test_abort_pending_future() {
        let controller = AbortController::new();
        let (_tx, rx) = oneshot::channel::<u32>();
        let signal = controller.signal();

        let result = block_on(async {
            let pending = signal.guard(rx);
            futures::pin_mut!(pending);
            assert!(futures::poll!(pending.as_mut()).is_pending());
            controller.abort();
            pending.await
        });
        assert_eq!(result, Err(Aborted));
    }

    #[test]
    fn test_child_abort_does_not_reach_parent() {
        let parent = AbortController::new();
        let child = parent.signal().child();
        child.abort();
        assert!(child.is_aborted());
        assert!(!parent.is_aborted());
    }

    #[test]
    fn test_dropped_children_are_pruned() {
        let parent = AbortController::new();
        let signal = parent.signal();
        for _ in 0..1000 {
            let child = signal.child();
            drop(child);
        }
        let live = signal.child();
        assert_eq!(signal.state.children.borrow().len(), 1);

        parent.abort();
        assert!(live.is_aborted());
    }

    #[test]
    fn test_grandchildren_abort() {
        let root = AbortController::new();
        let child = root.signal().child();
        let grandchild = child.signal().child();
        root.abort();
        assert!(grandchild.is_aborted());
    }

    #[test]
    fn test_child_of_aborted_signal_starts_aborted() {
        let root = AbortController::new();
        root.abort();
        assert!(root.signal().child().is_aborted());
    }

    #[test]
    fn test_never_signal() {
        let signal = AbortSignal::never();
        assert!(!signal.is_aborted());
        assert_eq!(block_on(signal.guard(async { 3 })), Ok(3));
    }
}
