//! Error and outcome types.
//!
//! - [`NavigationResult`]: the top-level outcome of every navigation. The
//!   router never lets a loader failure escape; it always settles into one
//!   of these variants.
//! - [`ViewError`]: what a loader can fail with. [`ViewError::Aborted`] and
//!   [`ViewError::Stale`] are silent: they mean a newer navigation or fetch
//!   took over, not that something went wrong.
//! - [`TransportError`]: what the HTTP layer reports. A cancelled request is
//!   [`TransportError::Aborted`], never a generic failure.
//! - [`RouteTableError`]: problems found while building the route table.
//! - [`ErrorHandlers`]: custom 404 and error-view renderers.
//!
//! # Examples
//!
//! ```
//! use spa_navigator::{NavigationResult, TransportError, ViewError};
//!
//! let result = NavigationResult::Rendered { path: "/events".into() };
//! assert!(result.is_rendered());
//!
//! let err: ViewError = TransportError::Aborted.into();
//! assert!(err.is_silent());
//!
//! let err: ViewError = TransportError::Http { status: 500, message: "boom".into() }.into();
//! assert!(!err.is_silent());
//! ```

use crate::container::{Container, Mount};
use crate::location::Location;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationResult {
    /// The loader settled successfully.
    Rendered { path: String },
    /// No route matched; the 404 view was rendered.
    NotFound { path: String },
    /// The loader failed; the error view was rendered.
    Failed { path: String, error: ViewError },
    /// A newer navigation started before this one settled. Nothing from this
    /// navigation is left in the container.
    Superseded { path: String },
    /// A guard denied the navigation, or the redirect limit was hit.
    Blocked { reason: String },
}

impl NavigationResult {
    pub fn is_rendered(&self) -> bool {
        matches!(self, NavigationResult::Rendered { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, NavigationResult::NotFound { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, NavigationResult::Failed { .. })
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, NavigationResult::Superseded { .. })
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, NavigationResult::Blocked { .. })
    }

    /// The path this result refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            NavigationResult::Rendered { path }
            | NavigationResult::NotFound { path }
            | NavigationResult::Failed { path, .. }
            | NavigationResult::Superseded { path } => Some(path),
            NavigationResult::Blocked { .. } => None,
        }
    }
}

/// Failure reported by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request was cancelled. Callers drop the result silently.
    #[error("request aborted")]
    Aborted,

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The response body was not the expected JSON.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn is_aborted(&self) -> bool {
        matches!(self, TransportError::Aborted)
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Decode(err.to_string())
    }
}

/// Failure of a view loader or one of its sections.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    /// A fetch was superseded or the navigation was cancelled.
    #[error("aborted")]
    Aborted,

    /// The view tried to write after a newer dispatch took the container.
    #[error("view superseded by a newer navigation")]
    Stale,

    /// Fetching or decoding data failed.
    #[error("failed to load data: {0}")]
    DataFetch(TransportError),

    /// The requested resource does not exist.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Client-side validation rejected a mutation before any request.
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// A mutation was attempted without a logged-in session.
    #[error("authentication required")]
    AuthRequired,

    #[error("{0}")]
    Message(String),
}

impl ViewError {
    /// Build a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ViewError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        ViewError::NotFound {
            resource: resource.into(),
        }
    }

    /// `true` for outcomes that must never reach the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, ViewError::Aborted | ViewError::Stale)
    }
}

impl From<TransportError> for ViewError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Aborted => ViewError::Aborted,
            other => ViewError::DataFetch(other),
        }
    }
}

impl From<serde_json::Error> for ViewError {
    fn from(err: serde_json::Error) -> Self {
        ViewError::DataFetch(err.into())
    }
}

/// Problems detected while building the route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    #[error("static route '{path}' registered twice")]
    DuplicateStatic { path: String },

    #[error("route name '{name}' registered twice")]
    DuplicateName { name: String },

    #[error("invalid route pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Every path the route accepts is already taken by an earlier route.
    #[error("route '{pattern}' can never match: shadowed by '{shadowed_by}'")]
    Unreachable {
        pattern: String,
        shadowed_by: String,
    },
}

/// Renders the 404 view.
pub type NotFoundHandler<C> = Rc<dyn Fn(&Mount<C>, &Location)>;

/// Renders the generic error view.
pub type ErrorHandler<C> = Rc<dyn Fn(&Mount<C>, &ViewError)>;

/// Custom renderers for the 404 and error views.
///
/// When a handler is missing the router writes a plain text message
/// configured in [`RouterConfig`](crate::RouterConfig).
///
/// ```
/// use spa_navigator::{Container, ErrorHandlers, MemoryContainer};
///
/// let handlers = ErrorHandlers::<MemoryContainer>::new()
///     .on_not_found(|mount, location| {
///         let _ = mount.append(format!("<h1>Nothing at {}</h1>", location.path()));
///     })
///     .on_error(|mount, err| {
///         let _ = mount.append(format!("<h1>Error: {err}</h1>"));
///     });
/// assert!(handlers.has_not_found());
/// ```
pub struct ErrorHandlers<C: Container> {
    not_found: Option<NotFoundHandler<C>>,
    error: Option<ErrorHandler<C>>,
}

impl<C: Container> ErrorHandlers<C> {
    pub fn new() -> Self {
        Self {
            not_found: None,
            error: None,
        }
    }

    /// Set the 404 renderer.
    pub fn on_not_found<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Mount<C>, &Location) + 'static,
    {
        self.not_found = Some(Rc::new(handler));
        self
    }

    /// Set the error-view renderer.
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Mount<C>, &ViewError) + 'static,
    {
        self.error = Some(Rc::new(handler));
        self
    }

    pub fn has_not_found(&self) -> bool {
        self.not_found.is_some()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Run the 404 renderer. Returns `false` when none is set.
    pub fn render_not_found(&self, mount: &Mount<C>, location: &Location) -> bool {
        self.not_found.as_ref().map_or(false, |handler| {
            handler(mount, location);
            true
        })
    }

    /// Run the error renderer. Returns `false` when none is set.
    pub fn render_error(&self, mount: &Mount<C>, error: &ViewError) -> bool {
        self.error.as_ref().map_or(false, |handler| {
            handler(mount, error);
            true
        })
    }
}

impl<C: Container> Default for ErrorHandlers<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Container> Clone for ErrorHandlers<C> {
    fn clone(&self) -> Self {
        Self {
            not_found: self.not_found.clone(),
            error: self.error.clone(),
        }
    }
}

impl<C: Container> fmt::Debug for ErrorHandlers<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandlers")
            .field("not_found", &self.not_found.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}
