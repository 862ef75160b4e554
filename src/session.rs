//! Explicit session context.
//!
//! Login state lives in a [`SessionContext`] handed to the router and to
//! every loader, never in a global. The context has a small lifecycle:
//!
//! - [`login`](SessionContext::login) stores the token and the user id,
//! - [`update_profile`](SessionContext::update_profile) caches the profile
//!   payload fetched after login,
//! - [`logout`](SessionContext::logout) clears everything.
//!
//! It also remembers where the user was heading when authentication was
//! required, so the login flow can resume there.

use crate::debug_log;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct SessionData {
    token: Option<String>,
    user_id: Option<String>,
    profile: Option<Value>,
    intended: Option<String>,
}

/// Shared handle to the current session. Clones see the same session.
///
/// ```
/// use spa_navigator::SessionContext;
///
/// let session = SessionContext::new();
/// assert!(!session.is_logged_in());
///
/// session.login("token-abc", "user-7");
/// assert!(session.is_owner("user-7"));
/// assert!(!session.is_owner("user-8"));
///
/// session.logout();
/// assert!(!session.is_owner("user-7"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    data: Rc<RefCell<SessionData>>,
}

impl SessionContext {
    /// An anonymous session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful login.
    pub fn login(&self, token: impl Into<String>, user_id: impl Into<String>) {
        let mut data = self.data.borrow_mut();
        data.token = Some(token.into());
        data.user_id = Some(user_id.into());
        data.profile = None;
        debug_log!("Session logged in as '{}'", data.user_id.as_deref().unwrap_or(""));
    }

    /// Cache the profile of the logged-in user.
    pub fn update_profile(&self, profile: Value) {
        self.data.borrow_mut().profile = Some(profile);
    }

    /// Forget the token, the user and the cached profile.
    ///
    /// A stored post-login destination is dropped too.
    pub fn logout(&self) {
        *self.data.borrow_mut() = SessionData::default();
        debug_log!("Session cleared");
    }

    pub fn is_logged_in(&self) -> bool {
        self.data.borrow().token.is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.data.borrow().token.clone()
    }

    pub fn user_id(&self) -> Option<String> {
        self.data.borrow().user_id.clone()
    }

    pub fn profile(&self) -> Option<Value> {
        self.data.borrow().profile.clone()
    }

    /// `true` when a user is logged in and owns the resource.
    ///
    /// Display only: the backend enforces ownership on mutations.
    pub fn is_owner(&self, owner_id: &str) -> bool {
        let data = self.data.borrow();
        data.token.is_some() && data.user_id.as_deref() == Some(owner_id)
    }

    /// Remember where to go once the user has logged in.
    pub fn set_intended_destination(&self, href: impl Into<String>) {
        self.data.borrow_mut().intended = Some(href.into());
    }

    /// Take the stored post-login destination, if any.
    pub fn take_intended_destination(&self) -> Option<String> {
        self.data.borrow_mut().intended.take()
    }
}
