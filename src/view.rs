//! The per-view context handed to loaders.
//!
//! A [`ViewContext`] is everything a loader may touch:
//!
//! - the matched [`RouteParams`] and the full [`Location`] (query and
//!   fragment included, so a view can restore its selected tab),
//! - a [`Mount`] scoped to this dispatch,
//! - the explicit [`SessionContext`],
//! - fetches that go through the shared [`FetchCoordinator`] and are
//!   cancelled when the navigation is superseded,
//! - teardown registration, per-section degradation, the mutation gate and
//!   post-load redirects.
//!
//! Loaders never reach for globals; cloning a context is cheap and every
//! clone belongs to the same dispatch.

use crate::abort::AbortSignal;
use crate::container::{Container, Mount};
use crate::error::ViewError;
use crate::fetch::{FetchCoordinator, Request, ResourceKey, Transport};
use crate::location::Location;
use crate::params::{QueryParams, RouteParams};
use crate::session::SessionContext;
use crate::{debug_log, trace_log, warn_log};
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

/// Cleanup callbacks registered by the active view.
///
/// Owned by the router and drained at the start of every dispatch.
#[derive(Clone, Default)]
pub(crate) struct TeardownRegistry {
    callbacks: Rc<RefCell<Vec<Box<dyn FnOnce()>>>>,
}

impl TeardownRegistry {
    pub(crate) fn register(&self, callback: Box<dyn FnOnce()>) {
        self.callbacks.borrow_mut().push(callback);
    }

    /// Run every registered callback, oldest first. Returns how many ran.
    pub(crate) fn run_all(&self) -> usize {
        let callbacks = self.callbacks.take();
        let count = callbacks.len();
        for callback in callbacks {
            callback();
        }
        count
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }
}

/// Context passed to a [`ViewLoader`](crate::ViewLoader).
pub struct ViewContext<C: Container> {
    params: RouteParams,
    location: Location,
    mount: Mount<C>,
    session: SessionContext,
    signal: AbortSignal,
    fetcher: FetchCoordinator,
    transport: Rc<dyn Transport>,
    teardowns: TeardownRegistry,
    redirect: Rc<RefCell<Option<String>>>,
}

/// Collaborators a router hands to every view.
pub(crate) struct ViewServices {
    pub(crate) session: SessionContext,
    pub(crate) fetcher: FetchCoordinator,
    pub(crate) transport: Rc<dyn Transport>,
    pub(crate) teardowns: TeardownRegistry,
}

impl<C: Container> ViewContext<C> {
    pub(crate) fn new(
        params: RouteParams,
        location: Location,
        mount: Mount<C>,
        signal: AbortSignal,
        services: ViewServices,
    ) -> Self {
        Self {
            params,
            location,
            mount,
            session: services.session,
            signal,
            fetcher: services.fetcher,
            transport: services.transport,
            teardowns: services.teardowns,
            redirect: Rc::new(RefCell::new(None)),
        }
    }

    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    /// Shorthand for `params().get(name)`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn query(&self) -> &QueryParams {
        self.location.query()
    }

    /// The URL fragment, which event pages use for their selected tab.
    pub fn fragment(&self) -> Option<&str> {
        self.location.fragment()
    }

    pub fn mount(&self) -> &Mount<C> {
        &self.mount
    }

    /// Append a node to the container. Fails with [`ViewError::Stale`] once
    /// a newer navigation has started.
    pub fn render(&self, node: C::Node) -> Result<(), ViewError> {
        self.mount.append(node)
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Signal fired when this navigation is superseded.
    pub fn signal(&self) -> &AbortSignal {
        &self.signal
    }

    pub fn fetcher(&self) -> &FetchCoordinator {
        &self.fetcher
    }

    /// `true` while no newer navigation has started.
    pub fn is_current(&self) -> bool {
        self.mount.is_current()
    }

    /// `true` when the logged-in user owns the resource. Display only.
    pub fn is_owner(&self, owner_id: &str) -> bool {
        self.session.is_owner(owner_id)
    }

    /// Fetch through the coordinator under `key`.
    ///
    /// A newer fetch for the same key, or a newer navigation, turns this one
    /// into [`ViewError::Aborted`].
    pub async fn fetch(
        &self,
        key: impl Into<ResourceKey>,
        request: Request,
    ) -> Result<Value, ViewError> {
        let transport = &self.transport;
        self.fetcher
            .fetch(key, Some(&self.signal), |signal| {
                transport.request(request, signal)
            })
            .await
            .map_err(ViewError::from)
    }

    /// Send a state-changing request.
    ///
    /// Requires a logged-in session, then runs `validate` before anything
    /// goes over the network; a failed validation never reaches the
    /// transport.
    pub async fn mutate<V>(&self, validate: V, request: Request) -> Result<Value, ViewError>
    where
        V: FnOnce() -> Result<(), ViewError>,
    {
        if !self.session.is_logged_in() {
            debug_log!("{} {} refused: not logged in", request.method, request.path);
            return Err(ViewError::AuthRequired);
        }
        validate()?;

        trace_log!("{} {}", request.method, request.path);
        let controller = self.signal.child();
        let signal = controller.signal();
        match signal
            .guard(self.transport.request(request, controller.signal()))
            .await
        {
            Ok(result) => result.map_err(ViewError::from),
            Err(_aborted) => Err(ViewError::Aborted),
        }
    }

    /// Run one independent section of the page.
    ///
    /// On failure the section renders an inline message and yields `None`
    /// instead of failing the whole view. Cancellation is silent.
    ///
    /// ```ignore
    /// let (event, media) = futures::join!(
    ///     ctx.section("event", load_event(&ctx)),
    ///     ctx.section("media", load_media(&ctx)),
    /// );
    /// ```
    pub async fn section<T, Fut>(&self, name: &str, future: Fut) -> Option<T>
    where
        Fut: Future<Output = Result<T, ViewError>>,
    {
        match future.await {
            Ok(value) => Some(value),
            Err(err) if err.is_silent() => {
                debug_log!("Section '{}' cancelled", name);
                None
            }
            Err(err) => {
                warn_log!("Section '{}' failed: {}", name, err);
                let _ = self
                    .mount
                    .append_text(&format!("Error loading {name}: {err}"));
                None
            }
        }
    }

    /// Register cleanup for the next navigation.
    ///
    /// If this view has already been superseded the callback runs at once.
    pub fn on_teardown(&self, callback: impl FnOnce() + 'static) {
        if self.mount.is_current() {
            self.teardowns.register(Box::new(callback));
        } else {
            debug_log!(
                "Teardown registered by stale view (generation {}), running now",
                self.mount.generation()
            );
            callback();
        }
    }

    /// Ask the router to navigate to `href` once this loader returns `Ok`.
    ///
    /// Used after mutations, e.g. back to `/events` after deleting an event.
    /// The last request wins.
    pub fn redirect(&self, href: impl Into<String>) {
        *self.redirect.borrow_mut() = Some(href.into());
    }

    pub(crate) fn redirect_slot(&self) -> Rc<RefCell<Option<String>>> {
        Rc::clone(&self.redirect)
    }
}

impl<C: Container> Clone for ViewContext<C> {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
            location: self.location.clone(),
            mount: self.mount.clone(),
            session: self.session.clone(),
            signal: self.signal.clone(),
            fetcher: self.fetcher.clone(),
            transport: Rc::clone(&self.transport),
            teardowns: self.teardowns.clone(),
            redirect: Rc::clone(&self.redirect),
        }
    }
}

impl<C: Container> fmt::Debug for ViewContext<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewContext")
            .field("location", &self.location.to_string())
            .field("params", &self.params)
            .field("generation", &self.mount.generation())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abort::AbortController;
    use crate::container::MemoryContainer;
    use crate::error::TransportError;
    use crate::lifecycle::GenerationCounter;
    use futures::executor::block_on;
    use futures::future::LocalBoxFuture;
    use futures::FutureExt;
    use serde_json::json;
    use std::cell::Cell;

    #[derive(Default)]
    struct EchoTransport {
        calls: Cell<usize>,
    }

    impl Transport for EchoTransport {
        fn request(
            &self,
            request: Request,
            _signal: AbortSignal,
        ) -> LocalBoxFuture<'_, Result<Value, TransportError>> {
            self.calls.set(self.calls.get() + 1);
            async move { Ok(json!({ "path": request.path })) }.boxed_local()
        }
    }

    struct Fixture {
        container: Rc<MemoryContainer>,
        counter: GenerationCounter,
        transport: Rc<EchoTransport>,
        teardowns: TeardownRegistry,
        session: SessionContext,
        controller: AbortController,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                container: Rc::new(MemoryContainer::new()),
                counter: GenerationCounter::new(),
                transport: Rc::new(EchoTransport::default()),
                teardowns: TeardownRegistry::default(),
                session: SessionContext::new(),
                controller: AbortController::new(),
            }
        }

        fn context(&self, href: &str) -> ViewContext<MemoryContainer> {
            let mount = Mount::new(Rc::clone(&self.container), self.counter.advance());
            ViewContext::new(
                RouteParams::from_pairs([("id", "42")]),
                Location::parse(href),
                mount,
                self.controller.signal(),
                ViewServices {
                    session: self.session.clone(),
                    fetcher: FetchCoordinator::new(),
                    transport: self.transport.clone(),
                    teardowns: self.teardowns.clone(),
                },
            )
        }
    }

    #[test]
    fn test_accessors() {
        let fixture = Fixture::new();
        let ctx = fixture.context("/event/42?ref=feed#media");
        assert_eq!(ctx.param("id"), Some("42"));
        assert_eq!(ctx.query().get("ref"), Some("feed"));
        assert_eq!(ctx.fragment(), Some("media"));
        assert!(ctx.is_current());
    }

    #[test]
    fn test_fetch_goes_through_transport() {
        let fixture = Fixture::new();
        let ctx = fixture.context("/event/42");
        let value = block_on(ctx.fetch("event", Request::get("/events/42"))).unwrap();
        assert_eq!(value["path"], "/events/42");
        assert_eq!(fixture.transport.calls.get(), 1);
    }

    #[test]
    fn test_fetch_after_navigation_abort_is_silent() {
        let fixture = Fixture::new();
        let ctx = fixture.context("/event/42");
        fixture.controller.abort();
        let err = block_on(ctx.fetch("event", Request::get("/events/42"))).unwrap_err();
        assert!(err.is_silent());
    }

    #[test]
    fn test_mutate_requires_login() {
        let fixture = Fixture::new();
        let ctx = fixture.context("/event/42");
        let result = block_on(ctx.mutate(|| Ok(()), Request::delete("/events/42")));
        assert_eq!(result, Err(ViewError::AuthRequired));
        assert_eq!(fixture.transport.calls.get(), 0);
    }

    #[test]
    fn test_mutate_validates_before_network() {
        let fixture = Fixture::new();
        fixture.session.login("t", "u");
        let ctx = fixture.context("/create-event");

        let result = block_on(ctx.mutate(
            || Err(ViewError::validation("title", "must not be empty")),
            Request::post("/events", json!({ "title": "" })),
        ));
        assert!(matches!(result, Err(ViewError::Validation { .. })));
        assert_eq!(fixture.transport.calls.get(), 0);

        let ok = block_on(ctx.mutate(
            || Ok(()),
            Request::post("/events", json!({ "title": "Gig" })),
        ));
        assert!(ok.is_ok());
        assert_eq!(fixture.transport.calls.get(), 1);
    }

    #[test]
    fn test_section_failure_renders_inline() {
        let fixture = Fixture::new();
        let ctx = fixture.context("/event/42");

        let media: Option<()> = block_on(ctx.section("media", async {
            Err(ViewError::DataFetch(TransportError::Network("offline".into())))
        }));
        let title = block_on(ctx.section("event", async { Ok::<_, ViewError>("Gig") }));

        assert!(media.is_none());
        assert_eq!(title, Some("Gig"));
        assert!(fixture.container.contains("Error loading media"));
    }

    #[test]
    fn test_section_abort_is_silent() {
        let fixture = Fixture::new();
        let ctx = fixture.context("/event/42");
        let out: Option<()> = block_on(ctx.section("media", async { Err(ViewError::Aborted) }));
        assert!(out.is_none());
        assert!(fixture.container.is_empty());
    }

    #[test]
    fn test_teardown_registration() {
        let fixture = Fixture::new();
        let ctx = fixture.context("/event/42");
        let ran = Rc::new(Cell::new(0));

        let counter = Rc::clone(&ran);
        ctx.on_teardown(move || counter.set(counter.get() + 1));
        assert_eq!(fixture.teardowns.len(), 1);
        assert_eq!(ran.get(), 0);

        assert_eq!(fixture.teardowns.run_all(), 1);
        assert_eq!(ran.get(), 1);
        assert_eq!(fixture.teardowns.len(), 0);
    }

    #[test]
    fn test_stale_view_teardown_runs_immediately() {
        let fixture = Fixture::new();
        let ctx = fixture.context("/event/42");
        fixture.counter.advance();

        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        ctx.on_teardown(move || flag.set(true));
        assert!(ran.get());
        assert_eq!(fixture.teardowns.len(), 0);
        assert_eq!(ctx.render("late".to_string()), Err(ViewError::Stale));
    }

    #[test]
    fn test_redirect_request() {
        let fixture = Fixture::new();
        let ctx = fixture.context("/event/42");
        ctx.clone().redirect("/events");
        assert_eq!(ctx.redirect_slot().borrow().as_deref(), Some("/events"));
    }
}
