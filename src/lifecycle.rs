//! Navigation lifecycle: requests, generations and the state machine.
//!
//! Every dispatch advances a [`GenerationCounter`] and receives a
//! [`DispatchToken`]. Anything that outlives a suspension point (container
//! writes, teardown registration, late responses) checks the token before
//! acting, so only the newest dispatch can touch the container.
//!
//! The router walks each dispatch through [`NavigationState`]:
//!
//! ```text
//! Idle ──► Dispatching ──► Loading ──► Rendered
//!               │             └──────► Failed
//!               └────────────────────► NotFound
//! ```
//!
//! `Rendered`, `Failed` and `NotFound` are settled: they last until the next
//! dispatch and, like `Idle`, accept a new navigation. A dispatch that is
//! blocked by a guard, or whose loader was cancelled without being
//! superseded, falls back to `Idle`.

use crate::location::Location;
use crate::params::RouteParams;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Monotonic dispatch counter shared by the router and every token it hands
/// out.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    active: Rc<Cell<u64>>,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The generation of the newest dispatch.
    pub fn current(&self) -> u64 {
        self.active.get()
    }

    /// Start a new generation. Tokens from earlier generations become stale.
    pub fn advance(&self) -> DispatchToken {
        let next = self.active.get() + 1;
        self.active.set(next);
        DispatchToken {
            generation: next,
            active: Rc::clone(&self.active),
        }
    }
}

/// Identity of one dispatch.
#[derive(Clone)]
pub struct DispatchToken {
    generation: u64,
    active: Rc<Cell<u64>>,
}

impl DispatchToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `true` until a newer dispatch starts.
    pub fn is_current(&self) -> bool {
        self.active.get() == self.generation
    }
}

impl fmt::Debug for DispatchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchToken")
            .field("generation", &self.generation)
            .field("current", &self.is_current())
            .finish()
    }
}

/// Where the newest dispatch is in its lifecycle.
///
/// The core machine is `Idle → Dispatching → Loading → Rendered | Failed`.
/// `NotFound` extends it: a dispatch whose path matches no route goes
/// straight from `Dispatching` to `NotFound` once the 404 view is rendered.
/// It is settled like `Rendered` and `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationState {
    Idle,
    Dispatching,
    Loading,
    Rendered,
    Failed,
    NotFound,
}

impl NavigationState {
    /// `true` when no dispatch is in progress.
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            NavigationState::Idle
                | NavigationState::Rendered
                | NavigationState::Failed
                | NavigationState::NotFound
        )
    }

    /// Whether moving from `self` to `next` is a legal step.
    ///
    /// A new dispatch may begin from any state: a navigation that starts
    /// while another is loading supersedes it.
    pub fn can_transition_to(self, next: NavigationState) -> bool {
        use NavigationState::*;
        match (self, next) {
            (_, Dispatching) => true,
            (Dispatching, Loading | NotFound | Idle) => true,
            (Loading, Rendered | Failed | Idle) => true,
            _ => false,
        }
    }
}

/// What started a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A same-origin link was intercepted.
    LinkClick,
    /// Application code called [`Router::navigate`](crate::Router::navigate).
    Programmatic,
    /// The user pressed back or forward.
    HistoryPop,
    /// First render or reload.
    Initial,
    /// A guard, loader or login flow redirected here.
    Redirect,
}

impl Trigger {
    /// Whether a navigation with this trigger adds a history entry.
    pub fn pushes_history(self) -> bool {
        matches!(
            self,
            Trigger::LinkClick | Trigger::Programmatic | Trigger::Redirect
        )
    }
}

/// A single navigation attempt, handed to guards.
///
/// ```
/// use spa_navigator::{Location, NavigationRequest, Trigger};
///
/// let request = NavigationRequest::new(Location::parse("/event/42"), Trigger::LinkClick);
/// assert_eq!(request.to.path(), "/event/42");
/// assert!(request.from.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct NavigationRequest {
    /// Where the navigation comes from, if anything was rendered before.
    pub from: Option<Location>,
    /// Where the navigation goes.
    pub to: Location,
    pub trigger: Trigger,
    /// Parameters captured by the matched route (empty until resolved).
    pub params: RouteParams,
}

impl NavigationRequest {
    pub fn new(to: Location, trigger: Trigger) -> Self {
        Self {
            from: None,
            to,
            trigger,
            params: RouteParams::new(),
        }
    }

    #[must_use]
    pub fn with_from(mut self, from: Option<Location>) -> Self {
        self.from = from;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: RouteParams) -> Self {
        self.params = params;
        self
    }
}

/// Verdict of a guard.
///
/// ```
/// use spa_navigator::NavigationAction;
///
/// let action = NavigationAction::redirect("/login");
/// assert_eq!(action.redirect_path(), Some("/login"));
/// assert!(NavigationAction::deny("nope").is_deny());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationAction {
    Continue,
    Deny { reason: String },
    Redirect { to: String, reason: Option<String> },
}

impl NavigationAction {
    pub fn deny(reason: impl Into<String>) -> Self {
        Self::Deny {
            reason: reason.into(),
        }
    }

    pub fn redirect(to: impl Into<String>) -> Self {
        Self::Redirect {
            to: to.into(),
            reason: None,
        }
    }

    pub fn redirect_with_reason(to: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Redirect {
            to: to.into(),
            reason: Some(reason.into()),
        }
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    pub fn is_deny(&self) -> bool {
        matches!(self, Self::Deny { .. })
    }

    pub fn redirect_path(&self) -> Option<&str> {
        match self {
            Self::Redirect { to, .. } => Some(to),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_counter() {
        let counter = GenerationCounter::new();
        assert_eq!(counter.current(), 0);

        let first = counter.advance();
        assert!(first.is_current());
        assert_eq!(first.generation(), 1);

        let second = counter.advance();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(counter.current(), 2);
    }

    #[test]
    fn test_counter_clones_share_state() {
        let counter = GenerationCounter::new();
        let shared = counter.clone();
        let token = counter.advance();
        shared.advance();
        assert!(!token.is_current());
    }

    #[test]
    fn test_settled_states() {
        assert!(NavigationState::Idle.is_settled());
        assert!(NavigationState::Rendered.is_settled());
        assert!(NavigationState::Failed.is_settled());
        assert!(NavigationState::NotFound.is_settled());
        assert!(!NavigationState::Dispatching.is_settled());
        assert!(!NavigationState::Loading.is_settled());
    }

    #[test]
    fn test_transitions() {
        use NavigationState::*;
        assert!(Idle.can_transition_to(Dispatching));
        assert!(Loading.can_transition_to(Dispatching));
        assert!(Dispatching.can_transition_to(Loading));
        assert!(Dispatching.can_transition_to(NotFound));
        assert!(Loading.can_transition_to(Rendered));
        assert!(Loading.can_transition_to(Failed));
        assert!(Loading.can_transition_to(Idle));
        assert!(!Loading.can_transition_to(NotFound));
        assert!(!Idle.can_transition_to(Rendered));
        assert!(!Dispatching.can_transition_to(Rendered));
        assert!(!Rendered.can_transition_to(Failed));
    }

    #[test]
    fn test_trigger_history_policy() {
        assert!(Trigger::Programmatic.pushes_history());
        assert!(Trigger::LinkClick.pushes_history());
        assert!(!Trigger::HistoryPop.pushes_history());
        assert!(!Trigger::Initial.pushes_history());
    }

    #[test]
    fn test_navigation_action() {
        assert!(NavigationAction::Continue.is_continue());
        let action = NavigationAction::redirect_with_reason("/login", "Authentication required");
        assert_eq!(action.redirect_path(), Some("/login"));
        assert!(!action.is_deny());
    }
}
