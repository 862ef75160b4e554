//! # spa-navigator
//!
//! Client-side router and view-lifecycle controller for single-page
//! applications.
//!
//! The crate maps a URL to a rendered view. It resolves static and
//! parameterized routes, hands each view an explicit [`ViewContext`] to
//! fetch data and render into the content container, and makes sure a slow
//! response from an abandoned view can never land in the page that replaced
//! it:
//!
//! - every dispatch has a **generation**; container writes through a stale
//!   [`Mount`] fail with [`ViewError::Stale`],
//! - every dispatch owns an [`AbortController`]; superseding a navigation
//!   cancels its loader and all of its fetches,
//! - the [`FetchCoordinator`] keeps **at most one in-flight request per
//!   resource key** and discards late responses.
//!
//! The HTTP layer ([`Transport`]), the history API ([`History`]), the
//! content container ([`Container`]) and user notifications ([`Notifier`])
//! are collaborators behind traits, with in-memory implementations for
//! headless hosts and tests.
//!
//! # Quick start
//!
//! ```
//! use spa_navigator::*;
//! use futures::future::{FutureExt, LocalBoxFuture};
//! use serde_json::{json, Value};
//! use std::rc::Rc;
//!
//! struct Api;
//!
//! impl Transport for Api {
//!     fn request(&self, request: Request, _signal: AbortSignal) -> LocalBoxFuture<'_, Result<Value, TransportError>> {
//!         async move { Ok(json!({ "title": format!("Event at {}", request.path) })) }.boxed_local()
//!     }
//! }
//!
//! async fn event_page(ctx: ViewContext<MemoryContainer>) -> Result<(), ViewError> {
//!     let id = ctx.param("id").unwrap_or_default().to_string();
//!     let event = ctx.fetch("event", Request::get(format!("/events/{id}"))).await?;
//!     ctx.render(format!("<h1>{}</h1>", event["title"].as_str().unwrap_or_default()))
//! }
//!
//! let registry = RouteTableBuilder::new()
//!     .register("/event/:id", event_page)
//!     .build()
//!     .unwrap();
//! let container = Rc::new(MemoryContainer::new());
//! let router = Router::builder(registry, Rc::clone(&container), Rc::new(Api)).build();
//!
//! let result = futures::executor::block_on(router.navigate("/event/42"));
//! assert!(result.is_rendered());
//! assert!(container.contains("Event at /events/42"));
//! ```
//!
//! # Feature flags
//!
//! | Feature   | Default | Description |
//! |-----------|---------|-------------|
//! | `log`     | yes     | Log through the `log` crate |
//! | `tracing` | no      | Log through the `tracing` crate |
//! | `guard`   | yes     | Route guards ([`RouteGuard`], [`AuthGuard`]) |
//! | `cache`   | yes     | LRU cache for dynamic route resolution |
//! | `serde`   | no      | (De)serializable [`RouterConfig`] and [`HistoryState`] |

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod logging;

pub mod abort;
#[cfg(feature = "cache")]
pub mod cache;
pub mod config;
pub mod container;
pub mod error;
pub mod fetch;
#[cfg(feature = "guard")]
pub mod guards;
pub mod history;
pub mod lifecycle;
pub mod location;
pub mod notify;
pub mod params;
pub mod pattern;
pub mod registry;
pub mod route;
pub mod router;
pub mod session;
pub mod view;

pub use abort::{AbortController, AbortSignal, Aborted};
#[cfg(feature = "cache")]
pub use cache::{CacheStats, ResolveCache};
pub use config::RouterConfig;
pub use container::{Container, MemoryContainer, Mount};
pub use error::{
    ErrorHandler, ErrorHandlers, NavigationResult, NotFoundHandler, RouteTableError,
    TransportError, ViewError,
};
pub use fetch::{FetchCoordinator, Method, Request, ResourceKey, Transport};
#[cfg(feature = "guard")]
pub use guards::{guard_fn, AuthGuard, FnGuard, RouteGuard};
pub use history::{History, HistoryEntry, HistoryState, MemoryHistory};
pub use lifecycle::{
    DispatchToken, GenerationCounter, NavigationAction, NavigationRequest, NavigationState,
    Trigger,
};
pub use location::{normalize_path, Location};
pub use notify::{LogNotifier, Notifier, RecordingNotifier};
pub use params::{QueryParams, RouteParams};
pub use pattern::{Overlap, RegexPattern, RoutePattern, Segment, Template};
pub use registry::{Resolution, RouteOverlap, RouteTableBuilder, ViewRegistry};
pub use route::{LoaderFuture, Route, ViewLoader};
pub use router::{Router, RouterBuilder};
pub use session::SessionContext;
pub use view::ViewContext;
