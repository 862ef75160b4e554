//! Route guards.
//!
//! Guards run **after** a path has been resolved to a route and **before**
//! the container is cleared or history is touched. They decide whether the
//! navigation continues, is denied, or is redirected elsewhere.
//!
//! Guards are synchronous and see the explicit [`SessionContext`], never a
//! global. Every guard attached to the matched route runs in **priority
//! order** (higher first); the first non-[`Continue`](NavigationAction::Continue)
//! verdict wins.
//!
//! | Guard | Purpose | Priority |
//! |-------|---------|----------|
//! | [`AuthGuard`] | Requires a logged-in session | 100 |
//! | [`guard_fn`] | Any closure | 0 |
//!
//! ```
//! use spa_navigator::{
//!     guard_fn, AuthGuard, Location, NavigationAction, NavigationRequest, RouteGuard,
//!     SessionContext, Trigger,
//! };
//!
//! let session = SessionContext::new();
//! let request = NavigationRequest::new(Location::parse("/create-event"), Trigger::LinkClick);
//!
//! let guard = AuthGuard::new("/login");
//! assert_eq!(guard.check(&session, &request).redirect_path(), Some("/login"));
//!
//! let closed = guard_fn(|_session, _request| NavigationAction::deny("maintenance"));
//! assert!(closed.check(&session, &request).is_deny());
//! ```

use crate::lifecycle::{NavigationAction, NavigationRequest};
use crate::location::normalize_path;
use crate::session::SessionContext;
use crate::{debug_log, trace_log};
use std::rc::Rc;

/// Decides whether a navigation to a route may proceed.
pub trait RouteGuard: 'static {
    fn check(&self, session: &SessionContext, request: &NavigationRequest) -> NavigationAction;

    /// Name used in log lines.
    fn name(&self) -> &'static str {
        "RouteGuard"
    }

    /// Higher runs first.
    fn priority(&self) -> i32 {
        0
    }
}

/// Create a guard from a closure.
pub const fn guard_fn<F>(f: F) -> FnGuard<F>
where
    F: Fn(&SessionContext, &NavigationRequest) -> NavigationAction + 'static,
{
    FnGuard { f }
}

/// Guard created by [`guard_fn`].
pub struct FnGuard<F> {
    f: F,
}

impl<F> RouteGuard for FnGuard<F>
where
    F: Fn(&SessionContext, &NavigationRequest) -> NavigationAction + 'static,
{
    fn check(&self, session: &SessionContext, request: &NavigationRequest) -> NavigationAction {
        (self.f)(session, request)
    }
}

/// Redirects anonymous users to the login page.
///
/// The blocked destination is stored in the session so that
/// [`Router::complete_login`](crate::Router::complete_login) can resume it.
#[derive(Debug, Clone)]
pub struct AuthGuard {
    login_path: String,
}

impl AuthGuard {
    pub fn new(login_path: impl AsRef<str>) -> Self {
        Self {
            login_path: normalize_path(login_path.as_ref()).into_owned(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }
}

impl RouteGuard for AuthGuard {
    fn check(&self, session: &SessionContext, request: &NavigationRequest) -> NavigationAction {
        if session.is_logged_in() {
            return NavigationAction::Continue;
        }
        if request.to.path() != self.login_path {
            session.set_intended_destination(request.to.to_string());
        }
        NavigationAction::redirect_with_reason(&self.login_path, "Authentication required")
    }

    fn name(&self) -> &'static str {
        "AuthGuard"
    }

    fn priority(&self) -> i32 {
        100
    }
}

/// Run `guards` in priority order and return the first verdict that is not
/// `Continue`.
pub(crate) fn run_guards(
    guards: &[Rc<dyn RouteGuard>],
    session: &SessionContext,
    request: &NavigationRequest,
) -> NavigationAction {
    let mut sorted: Vec<&Rc<dyn RouteGuard>> = guards.iter().collect();
    sorted.sort_by_key(|g| std::cmp::Reverse(g.priority()));

    for guard in sorted {
        let verdict = guard.check(session, request);
        trace_log!(
            "Guard '{}' (priority {}) → {:?}",
            guard.name(),
            guard.priority(),
            verdict
        );
        if !verdict.is_continue() {
            debug_log!(
                "Guard '{}' stopped navigation to '{}'",
                guard.name(),
                request.to
            );
            return verdict;
        }
    }
    NavigationAction::Continue
}
