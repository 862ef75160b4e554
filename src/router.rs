//! The router: navigation entry points and the dispatch pipeline.
//!
//! [`Router`] owns the current-URL state and drives every navigation through
//! one pipeline:
//!
//! 1. **Resolve.** Static table first, then dynamic patterns.
//! 2. **Guard.** The matched route's guards may deny or redirect. Up to
//!    here nothing has happened to the page on screen: a denied or
//!    redirected navigation leaves the live view, its pending loads and its
//!    teardowns alone.
//! 3. **Begin.** Advance the dispatch generation, abort the previous
//!    dispatch's signal (cancelling its fetches) and run the previous view's
//!    teardown callbacks. Unknown paths render the 404 view here and stop,
//!    leaving history alone.
//! 4. **Clear** the container.
//! 5. **Commit history** for triggers that push entries, before the loader
//!    is awaited.
//! 6. **Load.** Await the loader; a newer dispatch drops it.
//! 7. **Settle** into a [`NavigationResult`]. Loader failures are caught here:
//!    error view, transient notification, state `Failed`. Nothing escapes.
//!
//! All entry points (`navigate`, `follow_link`, `on_pop`, `render_initial`,
//! ...) end up in the same pipeline and differ only by [`Trigger`].

use crate::abort::{AbortController, AbortSignal};
use crate::config::RouterConfig;
use crate::container::{Container, Mount};
use crate::error::{ErrorHandlers, NavigationResult, ViewError};
use crate::fetch::{FetchCoordinator, Transport};
#[cfg(feature = "guard")]
use crate::guards::run_guards;
use crate::history::{History, HistoryEntry, HistoryState, MemoryHistory};
#[cfg(feature = "guard")]
use crate::lifecycle::{NavigationAction, NavigationRequest};
use crate::lifecycle::{DispatchToken, GenerationCounter, NavigationState, Trigger};
use crate::location::Location;
use crate::notify::{LogNotifier, Notifier};
use crate::params::RouteParams;
use crate::registry::{Resolution, ViewRegistry};
use crate::session::SessionContext;
use crate::view::{TeardownRegistry, ViewContext, ViewServices};
use crate::{debug_log, error_log, info_log, trace_log, warn_log};
use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

struct RouterInner<C: Container> {
    registry: ViewRegistry<C>,
    container: Rc<C>,
    history: Rc<dyn History>,
    transport: Rc<dyn Transport>,
    notifier: Rc<dyn Notifier>,
    session: SessionContext,
    fetcher: FetchCoordinator,
    config: RouterConfig,
    handlers: ErrorHandlers<C>,
    generations: GenerationCounter,
    state: Cell<NavigationState>,
    dispatch_controller: RefCell<Option<AbortController>>,
    teardowns: TeardownRegistry,
    current: RefCell<Option<Location>>,
}

/// Client-side router.
///
/// Cheap to clone; clones drive the same router. Single-threaded: loaders
/// and the futures returned by navigation methods are not `Send`.
pub struct Router<C: Container> {
    inner: Rc<RouterInner<C>>,
}

impl<C: Container> Clone for Router<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Builder for [`Router`].
pub struct RouterBuilder<C: Container> {
    registry: ViewRegistry<C>,
    container: Rc<C>,
    transport: Rc<dyn Transport>,
    history: Option<Rc<dyn History>>,
    notifier: Option<Rc<dyn Notifier>>,
    session: Option<SessionContext>,
    fetcher: Option<FetchCoordinator>,
    config: RouterConfig,
    handlers: ErrorHandlers<C>,
}

impl<C: Container> RouterBuilder<C> {
    /// Use a history other than an in-memory stack starting at `/`.
    pub fn history(mut self, history: Rc<dyn History>) -> Self {
        self.history = Some(history);
        self
    }

    /// Use a notifier other than [`LogNotifier`].
    pub fn notifier(mut self, notifier: Rc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Share an existing session.
    pub fn session(mut self, session: SessionContext) -> Self {
        self.session = Some(session);
        self
    }

    /// Share an existing fetch coordinator.
    pub fn fetcher(mut self, fetcher: FetchCoordinator) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn error_handlers(mut self, handlers: ErrorHandlers<C>) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn build(self) -> Router<C> {
        #[cfg(feature = "cache")]
        self.registry.set_cache_capacity(self.config.cache_capacity);

        info_log!(
            "Router ready with {} route(s) (login '{}', home '{}')",
            self.registry.len(),
            self.config.login_path,
            self.config.home_path
        );

        Router {
            inner: Rc::new(RouterInner {
                registry: self.registry,
                container: self.container,
                history: self
                    .history
                    .unwrap_or_else(|| Rc::new(MemoryHistory::default())),
                transport: self.transport,
                notifier: self.notifier.unwrap_or_else(|| Rc::new(LogNotifier)),
                session: self.session.unwrap_or_default(),
                fetcher: self.fetcher.unwrap_or_default(),
                config: self.config,
                handlers: self.handlers,
                generations: GenerationCounter::new(),
                state: Cell::new(NavigationState::Idle),
                dispatch_controller: RefCell::new(None),
                teardowns: TeardownRegistry::default(),
                current: RefCell::new(None),
            }),
        }
    }
}

/// What a dispatch is asked to do.
struct DispatchRequest {
    location: Location,
    trigger: Trigger,
    state: HistoryState,
    redirects: usize,
    /// Dispatch whose loader asked for this redirect, if any.
    origin: Option<DispatchToken>,
    /// Replace the current history entry instead of pushing.
    replace_entry: bool,
}

impl DispatchRequest {
    fn new(location: Location, trigger: Trigger, state: HistoryState) -> Self {
        Self {
            location,
            trigger,
            state,
            redirects: 0,
            origin: None,
            replace_entry: false,
        }
    }

    /// Follow-up dispatch for a redirect to `to`.
    fn redirect(&self, to: &str, origin: Option<DispatchToken>) -> Self {
        Self {
            location: Location::parse(to),
            trigger: Trigger::Redirect,
            state: HistoryState::default(),
            redirects: self.redirects + 1,
            origin,
            replace_entry: false,
        }
    }
}

impl<C: Container> Router<C> {
    /// Start building a router over a validated route table, the content
    /// container and the HTTP layer.
    pub fn builder(
        registry: ViewRegistry<C>,
        container: Rc<C>,
        transport: Rc<dyn Transport>,
    ) -> RouterBuilder<C> {
        RouterBuilder {
            registry,
            container,
            transport,
            history: None,
            notifier: None,
            session: None,
            fetcher: None,
            config: RouterConfig::default(),
            handlers: ErrorHandlers::new(),
        }
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// Navigate to `href` programmatically.
    ///
    /// A history entry is pushed unless the target has the same path and
    /// query as the current entry, in which case the entry is replaced.
    pub async fn navigate(&self, href: &str) -> NavigationResult {
        self.run(Location::parse(href), Trigger::Programmatic, HistoryState::default())
            .await
    }

    /// Handle a click on a link.
    ///
    /// Same-origin relative hrefs (`/…`) are routed and `Some` result is
    /// returned; anything else yields `None` and the host should let the
    /// browser follow the link.
    pub async fn follow_link(&self, href: &str) -> Option<NavigationResult> {
        if !is_internal_href(href) {
            debug_log!("Not intercepting external link '{}'", href);
            return None;
        }
        Some(
            self.run(Location::parse(href), Trigger::LinkClick, HistoryState::default())
                .await,
        )
    }

    /// Navigate to a named route. `None` if the name is unknown or a
    /// parameter is missing.
    pub async fn navigate_named(
        &self,
        name: &str,
        params: &RouteParams,
    ) -> Option<NavigationResult> {
        let Some(url) = self.inner.registry.url_for(name, params) else {
            warn_log!("Named route '{}' could not be built", name);
            return None;
        };
        debug_log!("Named route '{}' resolved to '{}'", name, url);
        Some(self.navigate(&url).await)
    }

    /// Render whatever the history currently points at, without pushing.
    pub async fn render_initial(&self) -> NavigationResult {
        let entry = self.inner.history.current();
        self.run(entry.location, Trigger::Initial, entry.state).await
    }

    /// Dispatch `location` with an explicit trigger.
    pub async fn dispatch(
        &self,
        location: impl Into<Location>,
        trigger: Trigger,
    ) -> NavigationResult {
        self.run(location.into(), trigger, HistoryState::default())
            .await
    }

    /// Re-dispatch an entry the user moved to with back or forward. Never
    /// pushes.
    pub async fn on_pop(&self, entry: HistoryEntry) -> NavigationResult {
        self.run(entry.location, Trigger::HistoryPop, entry.state)
            .await
    }

    /// Step back. `None` when there is nothing to go back to, or when the
    /// history reports the move later through [`on_pop`](Self::on_pop).
    pub async fn back(&self) -> Option<NavigationResult> {
        let entry = self.inner.history.back()?;
        Some(self.on_pop(entry).await)
    }

    /// Step forward. Same contract as [`back`](Self::back).
    pub async fn forward(&self) -> Option<NavigationResult> {
        let entry = self.inner.history.forward()?;
        Some(self.on_pop(entry).await)
    }

    /// Select a tab on the current page.
    ///
    /// Writes `#tab` into the URL and the tab into the entry state by pushing
    /// a new entry. Returns `false` if the tab is already active. The view is
    /// not reloaded; loaders read the tab back from
    /// [`ViewContext::fragment`] on their next load.
    pub fn activate_tab(&self, tab: &str) -> bool {
        let entry = self.inner.history.current();
        if entry.state.tab.as_deref() == Some(tab) && entry.location.fragment() == Some(tab) {
            trace_log!("Tab '{}' already active", tab);
            return false;
        }

        let location = entry.location.with_fragment(Some(tab));
        debug_log!("Activating tab '{}' at '{}'", tab, location);
        self.inner
            .history
            .push(HistoryEntry::new(location.clone(), HistoryState::with_tab(tab)));
        *self.inner.current.borrow_mut() = Some(location);
        true
    }

    /// Record a successful login and resume where the user was heading, or
    /// go home.
    pub async fn complete_login(
        &self,
        token: impl Into<String>,
        user_id: impl Into<String>,
    ) -> NavigationResult {
        self.inner.session.login(token, user_id);
        let destination = self
            .inner
            .session
            .take_intended_destination()
            .unwrap_or_else(|| self.inner.config.home_path.clone());
        info_log!("Login complete, resuming '{}'", destination);
        self.run(Location::parse(&destination), Trigger::Redirect, HistoryState::default())
            .await
    }

    /// Clear the session, cancel outstanding fetches and go home.
    pub async fn logout(&self) -> NavigationResult {
        self.inner.session.logout();
        self.inner.fetcher.cancel_all();
        let home = self.inner.config.home_path.clone();
        self.run(Location::parse(&home), Trigger::Programmatic, HistoryState::default())
            .await
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> NavigationState {
        self.inner.state.get()
    }

    /// Generation of the newest dispatch.
    pub fn generation(&self) -> u64 {
        self.inner.generations.current()
    }

    /// Location of the newest dispatch that got past its guards.
    pub fn current_location(&self) -> Option<Location> {
        self.inner.current.borrow().clone()
    }

    pub fn session(&self) -> &SessionContext {
        &self.inner.session
    }

    pub fn fetcher(&self) -> &FetchCoordinator {
        &self.inner.fetcher
    }

    pub fn registry(&self) -> &ViewRegistry<C> {
        &self.inner.registry
    }

    pub fn history(&self) -> Rc<dyn History> {
        Rc::clone(&self.inner.history)
    }

    pub fn config(&self) -> &RouterConfig {
        &self.inner.config
    }

    /// Build a URL for a named route.
    pub fn url_for(&self, name: &str, params: &RouteParams) -> Option<String> {
        self.inner.registry.url_for(name, params)
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    async fn run(&self, location: Location, trigger: Trigger, state: HistoryState) -> NavigationResult {
        self.clone()
            .pipeline(DispatchRequest::new(location, trigger, state))
            .await
    }

    fn pipeline(self, request: DispatchRequest) -> LocalBoxFuture<'static, NavigationResult> {
        async move {
            let location = request.location.clone();

            if request.redirects > self.inner.config.max_redirects {
                error_log!(
                    "Redirect loop detected (depth {}) navigating to '{}'",
                    request.redirects,
                    location
                );
                self.release_origin(&request);
                return NavigationResult::Blocked {
                    reason: format!(
                        "Redirect loop detected (depth {}): target '{}'",
                        request.redirects, location
                    ),
                };
            }

            let from = self.current_location();
            info_log!(
                "Navigation {:?}: '{}' → '{}'",
                request.trigger,
                from.as_ref().map(ToString::to_string).unwrap_or_default(),
                location
            );

            let path = location.path().to_string();
            let (route, params) = match self.inner.registry.resolve(&path) {
                Resolution::Matched { route, params } => (route, params),
                Resolution::NotFound => {
                    let (token, _signal) = self.begin();
                    return self.render_not_found(&token, location);
                }
            };

            // The live view stays untouched until the guards let this through.
            #[cfg(feature = "guard")]
            {
                let guard_request = NavigationRequest::new(location.clone(), request.trigger)
                    .with_from(from)
                    .with_params(params.clone());
                match run_guards(route.guards(), &self.inner.session, &guard_request) {
                    NavigationAction::Continue => {}
                    NavigationAction::Deny { reason } => {
                        warn_log!("Navigation to '{}' blocked: {}", location, reason);
                        self.release_origin(&request);
                        return NavigationResult::Blocked { reason };
                    }
                    NavigationAction::Redirect { to, reason } => {
                        debug_log!(
                            "Guard redirecting from '{}' to '{}': {:?}",
                            location,
                            to,
                            reason
                        );
                        let next = request.redirect(&to, request.origin.clone());
                        return self.clone().pipeline(next).await;
                    }
                }
            }

            let (token, signal) = self.begin();
            let mount = Mount::new(Rc::clone(&self.inner.container), token.clone());
            let _ = mount.clear();

            self.commit_history(&request);
            *self.inner.current.borrow_mut() = Some(location.clone());
            self.transition(NavigationState::Loading);

            let ctx = ViewContext::new(
                params,
                location.clone(),
                mount.clone(),
                signal.clone(),
                ViewServices {
                    session: self.inner.session.clone(),
                    fetcher: self.inner.fetcher.clone(),
                    transport: Rc::clone(&self.inner.transport),
                    teardowns: self.inner.teardowns.clone(),
                },
            );
            let redirect = ctx.redirect_slot();
            let loader = route.loader();
            drop(route);

            let outcome = signal.guard(loader.load(ctx)).await;

            if !token.is_current() {
                debug_log!("Dispatch to '{}' superseded", location);
                return NavigationResult::Superseded { path };
            }

            match outcome {
                Err(_aborted) => {
                    debug_log!("Dispatch to '{}' aborted", location);
                    self.transition(NavigationState::Idle);
                    NavigationResult::Superseded { path }
                }
                Ok(Ok(())) => {
                    let requested = redirect.borrow_mut().take();
                    if let Some(to) = requested {
                        debug_log!("View at '{}' redirecting to '{}'", location, to);
                        let next = request.redirect(&to, Some(token));
                        return self.clone().pipeline(next).await;
                    }
                    self.transition(NavigationState::Rendered);
                    info_log!("Navigation complete: '{}'", location);
                    NavigationResult::Rendered { path }
                }
                Ok(Err(error)) => self.fail(&mount, &request, token, error).await,
            }
        }
        .boxed_local()
    }

    /// A redirect chain stopped before dispatching. If a loader started the
    /// chain and is still the newest dispatch, settle its state.
    fn release_origin(&self, request: &DispatchRequest) {
        let owns_state = request.origin.as_ref().is_some_and(DispatchToken::is_current);
        if owns_state && !self.state().is_settled() {
            self.transition(NavigationState::Idle);
        }
    }

    /// Start a new generation: supersede, cancel and tear down the previous
    /// dispatch.
    fn begin(&self) -> (DispatchToken, AbortSignal) {
        let token = self.inner.generations.advance();
        let controller = AbortController::new();
        let signal = controller.signal();

        let previous = self.inner.dispatch_controller.borrow_mut().replace(controller);
        if let Some(previous) = previous {
            previous.abort();
        }
        let torn_down = self.inner.teardowns.run_all();
        if torn_down > 0 {
            debug_log!("Ran {} teardown callback(s)", torn_down);
        }

        self.transition(NavigationState::Dispatching);
        trace_log!("Dispatch generation {} started", token.generation());
        (token, signal)
    }

    fn transition(&self, next: NavigationState) {
        let current = self.inner.state.get();
        if !current.can_transition_to(next) {
            warn_log!("Unexpected navigation state change {:?} → {:?}", current, next);
        }
        trace_log!("Navigation state {:?} → {:?}", current, next);
        self.inner.state.set(next);
    }

    fn commit_history(&self, request: &DispatchRequest) {
        if !request.trigger.pushes_history() {
            return;
        }
        let history = &self.inner.history;
        let entry = HistoryEntry::new(request.location.clone(), request.state.clone());
        let same_document = self.inner.config.dedupe_same_path
            && history.current().location.same_document(&request.location);
        if request.replace_entry || same_document {
            history.replace(entry);
        } else {
            history.push(entry);
        }
    }

    fn render_not_found(&self, token: &DispatchToken, location: Location) -> NavigationResult {
        info_log!("No route for '{}', rendering 404", location);
        let mount = Mount::new(Rc::clone(&self.inner.container), token.clone());
        let _ = mount.clear();
        if !self.inner.handlers.render_not_found(&mount, &location) {
            let _ = mount.append_text(&self.inner.config.not_found_message);
        }
        *self.inner.current.borrow_mut() = Some(location.clone());
        self.transition(NavigationState::NotFound);
        NavigationResult::NotFound {
            path: location.path().to_string(),
        }
    }

    async fn fail(
        &self,
        mount: &Mount<C>,
        request: &DispatchRequest,
        token: DispatchToken,
        error: ViewError,
    ) -> NavigationResult {
        let location = &request.location;
        let path = location.path().to_string();

        match &error {
            e if e.is_silent() => {
                debug_log!("Dispatch to '{}' cancelled: {}", location, e);
                self.transition(NavigationState::Idle);
                return NavigationResult::Superseded { path };
            }
            ViewError::AuthRequired => {
                info_log!("'{}' requires login", location);
                self.inner
                    .session
                    .set_intended_destination(location.to_string());
                // The protected entry is swapped for the login page so that
                // going back does not bounce through it again.
                let mut next = request.redirect(&self.inner.config.login_path, Some(token));
                next.replace_entry = true;
                return self.clone().pipeline(next).await;
            }
            ViewError::NotFound { resource } => {
                info_log!("{} not found while loading '{}'", resource, location);
            }
            other => {
                error_log!("Failed to load '{}': {}", location, other);
                self.inner.notifier.notify(
                    &self.inner.config.error_notification,
                    self.inner.config.notification_duration,
                );
            }
        }

        let _ = mount.clear();
        if !self.inner.handlers.render_error(mount, &error) {
            let _ = mount.append_text(&error.to_string());
        }
        self.transition(NavigationState::Failed);
        NavigationResult::Failed { path, error }
    }
}

impl<C: Container> fmt::Debug for Router<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("state", &self.state())
            .field("generation", &self.generation())
            .field(
                "current",
                &self.current_location().map(|l| l.to_string()),
            )
            .field("registry", &self.inner.registry)
            .finish_non_exhaustive()
    }
}

/// `true` for same-origin relative hrefs the router should handle.
fn is_internal_href(href: &str) -> bool {
    href.starts_with('/') && !href.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_href_detection() {
        assert!(is_internal_href("/events"));
        assert!(is_internal_href("/event/42#media"));
        assert!(!is_internal_href("//cdn.example.com/app.js"));
        assert!(!is_internal_href("https://example.com/events"));
        assert!(!is_internal_href("mailto:someone@example.com"));
        assert!(!is_internal_href("#tickets"));
    }
}
