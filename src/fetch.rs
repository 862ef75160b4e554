//! Transport contract and the request-cancellation coordinator.
//!
//! The HTTP layer is an external collaborator reached through [`Transport`].
//! On top of it, [`FetchCoordinator`] guarantees **at most one outstanding
//! request per resource key**:
//!
//! 1. Starting a fetch for key `K` aborts the fetch currently registered for
//!    `K`, if any, and replaces its registration.
//! 2. Each registration carries a generation number. When a request settles,
//!    its result is accepted only if its generation is still the one
//!    registered for `K`.
//! 3. Anything else (an aborted request, or a response that arrived after
//!    being superseded) resolves to [`TransportError::Aborted`], which callers
//!    drop without telling the user.
//!
//! Keys are independent: paginating the event list never cancels a venue
//! fetch.

use crate::abort::{AbortController, AbortSignal, Aborted};
use crate::error::TransportError;
use crate::{debug_log, trace_log};
use futures::future::LocalBoxFuture;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

/// HTTP method of a [`Request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// `true` for methods that change server state.
    pub fn is_mutation(self) -> bool {
        !matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request for the transport layer. `path` is relative to the API base.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub path: String,
    pub method: Method,
    pub body: Option<Value>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// The HTTP layer.
///
/// Implementations must honour `signal`: once it is aborted the returned
/// future should settle with [`TransportError::Aborted`]. The coordinator
/// discards late results either way.
pub trait Transport {
    fn request(
        &self,
        request: Request,
        signal: AbortSignal,
    ) -> LocalBoxFuture<'_, Result<Value, TransportError>>;
}

/// Logical identifier correlating competing fetches, e.g. `"events"` for the
/// paginated event list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey(String);

impl ResourceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for ResourceKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

struct InFlightFetch {
    generation: u64,
    controller: AbortController,
}

#[derive(Default)]
struct Registry {
    next_generation: u64,
    in_flight: HashMap<ResourceKey, InFlightFetch>,
}

/// Per-resource-key registry of in-flight fetches.
///
/// Clones share the registry.
///
/// ```
/// use spa_navigator::{FetchCoordinator, TransportError};
///
/// let coordinator = FetchCoordinator::new();
/// let result = futures::executor::block_on(coordinator.fetch("events", None, |_signal| async {
///     Ok::<_, TransportError>(vec!["concert", "festival"])
/// }));
/// assert_eq!(result.unwrap().len(), 2);
/// assert!(!coordinator.is_in_flight("events"));
/// ```
#[derive(Clone, Default)]
pub struct FetchCoordinator {
    registry: Rc<RefCell<Registry>>,
}

impl FetchCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `request` as the only live fetch for `key`.
    ///
    /// The request receives a signal that fires when this fetch is superseded,
    /// cancelled, or when `parent` is aborted.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: impl Into<ResourceKey>,
        parent: Option<&AbortSignal>,
        request: F,
    ) -> Result<T, TransportError>
    where
        F: FnOnce(AbortSignal) -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let key = key.into();
        let (generation, signal) = self.begin(&key, parent);
        let registration = Registration {
            registry: &self.registry,
            key,
            generation,
        };
        let outcome = signal.guard(request(signal.clone())).await;
        registration.finish(outcome)
    }

    fn begin(&self, key: &ResourceKey, parent: Option<&AbortSignal>) -> (u64, AbortSignal) {
        let mut registry = self.registry.borrow_mut();
        registry.next_generation += 1;
        let generation = registry.next_generation;

        let controller = parent.map_or_else(AbortController::new, AbortSignal::child);
        let signal = controller.signal();

        if let Some(previous) = registry.in_flight.insert(
            key.clone(),
            InFlightFetch {
                generation,
                controller,
            },
        ) {
            debug_log!(
                "Superseding in-flight fetch for '{}' (generation {} → {})",
                key,
                previous.generation,
                generation
            );
            previous.controller.abort();
        } else {
            trace_log!("Fetch '{}' started (generation {})", key, generation);
        }

        (generation, signal)
    }

    /// Abort the fetch registered for `key`. Returns `false` if there was none.
    pub fn cancel(&self, key: impl Into<ResourceKey>) -> bool {
        let key = key.into();
        let removed = self.registry.borrow_mut().in_flight.remove(&key);
        removed.map_or(false, |fetch| {
            debug_log!("Cancelled fetch for '{}'", key);
            fetch.controller.abort();
            true
        })
    }

    /// Abort every registered fetch.
    pub fn cancel_all(&self) {
        let drained: Vec<InFlightFetch> = self
            .registry
            .borrow_mut()
            .in_flight
            .drain()
            .map(|(_, fetch)| fetch)
            .collect();
        for fetch in drained {
            fetch.controller.abort();
        }
    }

    pub fn is_in_flight(&self, key: impl Into<ResourceKey>) -> bool {
        self.registry
            .borrow()
            .in_flight
            .contains_key(&key.into())
    }

    /// Number of keys with a live fetch.
    pub fn in_flight_count(&self) -> usize {
        self.registry.borrow().in_flight.len()
    }
}

/// Registration of one fetch. Released when the fetch settles or its future
/// is dropped, so an abandoned fetch never stays in flight.
struct Registration<'a> {
    registry: &'a RefCell<Registry>,
    key: ResourceKey,
    generation: u64,
}

impl Registration<'_> {
    /// Unregister if still current. Returns whether it was.
    fn release(&self) -> bool {
        let mut registry = self.registry.borrow_mut();
        let current = registry
            .in_flight
            .get(&self.key)
            .is_some_and(|f| f.generation == self.generation);
        if current {
            registry.in_flight.remove(&self.key);
        }
        current
    }

    fn finish<T>(
        self,
        outcome: Result<Result<T, TransportError>, Aborted>,
    ) -> Result<T, TransportError> {
        let current = self.release();
        match outcome {
            Err(Aborted) => {
                debug_log!(
                    "Fetch '{}' (generation {}) aborted",
                    self.key,
                    self.generation
                );
                Err(TransportError::Aborted)
            }
            Ok(_) if !current => {
                debug_log!(
                    "Discarding late response for '{}' (generation {})",
                    self.key,
                    self.generation
                );
                Err(TransportError::Aborted)
            }
            Ok(result) => result,
        }
    }
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        if self.release() {
            trace_log!(
                "Fetch '{}' (generation {}) dropped before settling",
                self.key,
                self.generation
            );
        }
    }
}

impl fmt::Debug for FetchCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("FetchCoordinator")
            .field("in_flight", &registry.in_flight.keys().collect::<Vec<_>>())
            .finish()
    }
}
