//! Route definitions.
//!
//! A [`Route`] binds a [`RoutePattern`] to a [`ViewLoader`]: the async
//! function that fetches a view's data and renders it through the
//! [`ViewContext`]. Routes are plain values assembled with a builder API and
//! handed to a [`RouteTableBuilder`](crate::RouteTableBuilder):
//!
//! ```
//! use spa_navigator::{MemoryContainer, Route, ViewContext, ViewError};
//!
//! async fn event_page(ctx: ViewContext<MemoryContainer>) -> Result<(), ViewError> {
//!     let id = ctx.param("id").unwrap_or_default().to_string();
//!     ctx.render(format!("<h1>Event {id}</h1>"))
//! }
//!
//! let route = Route::new("/event/:id", event_page).name("event");
//! assert_eq!(route.name_str(), Some("event"));
//! ```
//!
//! Pattern errors are kept on the route and reported when the table is
//! built, so route definitions stay chainable.

use crate::container::Container;
use crate::error::{RouteTableError, ViewError};
#[cfg(feature = "guard")]
use crate::guards::RouteGuard;
use crate::pattern::RoutePattern;
use crate::view::ViewContext;
use futures::future::{FutureExt, LocalBoxFuture};
use std::fmt;
use std::future::Future;
use std::rc::Rc;

/// Future returned by a loader.
pub type LoaderFuture = LocalBoxFuture<'static, Result<(), ViewError>>;

/// Fetches a view's data and renders it.
///
/// Implemented for every `Fn(ViewContext<C>) -> impl Future<Output =
/// Result<(), ViewError>>`, so plain `async fn`s work as loaders.
pub trait ViewLoader<C: Container>: 'static {
    fn load(&self, ctx: ViewContext<C>) -> LoaderFuture;
}

impl<C, F, Fut> ViewLoader<C> for F
where
    C: Container,
    F: Fn(ViewContext<C>) -> Fut + 'static,
    Fut: Future<Output = Result<(), ViewError>> + 'static,
{
    fn load(&self, ctx: ViewContext<C>) -> LoaderFuture {
        self(ctx).boxed_local()
    }
}

/// A pattern bound to a loader.
pub struct Route<C: Container> {
    pattern: Result<RoutePattern, RouteTableError>,
    name: Option<String>,
    loader: Rc<dyn ViewLoader<C>>,
    #[cfg(feature = "guard")]
    guards: Vec<Rc<dyn RouteGuard>>,
}

impl<C: Container> Route<C> {
    /// Route for a static path or a `:name` template.
    pub fn new(pattern: &str, loader: impl ViewLoader<C>) -> Self {
        Self::from_pattern(RoutePattern::parse(pattern), loader)
    }

    /// Route for a regex whose positional captures are stored under `names`.
    ///
    /// ```
    /// use spa_navigator::{MemoryContainer, Route, ViewContext, ViewError};
    ///
    /// let route = Route::regex(r"/media/(\d+)/(thumb|full)", ["id", "size"], |_ctx: ViewContext<MemoryContainer>| async {
    ///     Ok::<(), ViewError>(())
    /// });
    /// assert_eq!(route.pattern().unwrap().param_names(), vec!["id", "size"]);
    /// ```
    pub fn regex<S: Into<String>>(
        pattern: &str,
        names: impl IntoIterator<Item = S>,
        loader: impl ViewLoader<C>,
    ) -> Self {
        Self::from_pattern(RoutePattern::regex(pattern, names), loader)
    }

    fn from_pattern(
        pattern: Result<RoutePattern, RouteTableError>,
        loader: impl ViewLoader<C>,
    ) -> Self {
        Self {
            pattern,
            name: None,
            loader: Rc::new(loader),
            #[cfg(feature = "guard")]
            guards: Vec::new(),
        }
    }

    /// Name the route for [`ViewRegistry::url_for`](crate::ViewRegistry::url_for).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a guard.
    #[cfg(feature = "guard")]
    pub fn guard(mut self, guard: impl RouteGuard) -> Self {
        self.guards.push(Rc::new(guard));
        self
    }

    pub fn name_str(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The parsed pattern, or the error found while parsing it.
    pub fn pattern(&self) -> Result<&RoutePattern, &RouteTableError> {
        self.pattern.as_ref()
    }

    #[cfg(feature = "guard")]
    pub fn guards(&self) -> &[Rc<dyn RouteGuard>] {
        &self.guards
    }

    pub(crate) fn loader(&self) -> Rc<dyn ViewLoader<C>> {
        Rc::clone(&self.loader)
    }
}

impl<C: Container> fmt::Debug for Route<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Route");
        match &self.pattern {
            Ok(pattern) => s.field("pattern", &pattern.to_string()),
            Err(err) => s.field("pattern", err),
        };
        s.field("name", &self.name);
        #[cfg(feature = "guard")]
        s.field("guards", &self.guards.len());
        s.finish_non_exhaustive()
    }
}
