//! Test utilities for router integration tests
//!
//! Provides a scripted transport, a ready-made router harness and assertion
//! helpers.

#![allow(dead_code)]

use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};
use serde_json::Value;
use spa_navigator::*;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

pub type Reply = Result<Value, TransportError>;

enum Scripted {
    Ready(Reply),
    Pending(oneshot::Receiver<Reply>),
}

/// Transport answering from a script keyed by request path.
///
/// Paths without a scripted reply fail with HTTP 404.
#[derive(Default)]
pub struct MockTransport {
    script: RefCell<HashMap<String, VecDeque<Scripted>>>,
    calls: RefCell<Vec<Request>>,
}

impl MockTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Answer the next request for `path` immediately.
    pub fn reply(&self, path: &str, reply: Reply) {
        self.push(path, Scripted::Ready(reply));
    }

    /// Answer the next request for `path` once the returned sender fires.
    pub fn pending(&self, path: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.push(path, Scripted::Pending(rx));
        tx
    }

    fn push(&self, path: &str, scripted: Scripted) {
        self.script
            .borrow_mut()
            .entry(path.to_string())
            .or_default()
            .push_back(scripted);
    }

    /// Paths requested so far, in order.
    pub fn requested_paths(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|r| r.path.clone()).collect()
    }

    pub fn calls(&self) -> Vec<Request> {
        self.calls.borrow().clone()
    }
}

impl Transport for MockTransport {
    fn request(
        &self,
        request: Request,
        _signal: AbortSignal,
    ) -> LocalBoxFuture<'_, Result<Value, TransportError>> {
        let scripted = self
            .script
            .borrow_mut()
            .get_mut(&request.path)
            .and_then(VecDeque::pop_front);
        self.calls.borrow_mut().push(request.clone());

        match scripted {
            Some(Scripted::Ready(reply)) => async move { reply }.boxed_local(),
            Some(Scripted::Pending(rx)) => async move {
                rx.await
                    .unwrap_or_else(|_| Err(TransportError::Network("reply dropped".into())))
            }
            .boxed_local(),
            None => async move {
                Err(TransportError::Http {
                    status: 404,
                    message: format!("no fixture for {}", request.path),
                })
            }
            .boxed_local(),
        }
    }
}

/// A router wired to in-memory collaborators.
pub struct TestApp {
    pub router: Router<MemoryContainer>,
    pub container: Rc<MemoryContainer>,
    pub history: Rc<MemoryHistory>,
    pub notifier: Rc<RecordingNotifier>,
    pub transport: Rc<MockTransport>,
}

impl TestApp {
    pub fn new(registry: ViewRegistry<MemoryContainer>, transport: Rc<MockTransport>) -> Self {
        Self::with_config(registry, transport, RouterConfig::default())
    }

    pub fn with_config(
        registry: ViewRegistry<MemoryContainer>,
        transport: Rc<MockTransport>,
        config: RouterConfig,
    ) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let container = Rc::new(MemoryContainer::new());
        let history = Rc::new(MemoryHistory::new("/"));
        let notifier = Rc::new(RecordingNotifier::new());
        let router = Router::builder(registry, Rc::clone(&container), transport.clone())
            .history(history.clone())
            .notifier(notifier.clone())
            .config(config)
            .build();

        Self {
            router,
            container,
            history,
            notifier,
            transport,
        }
    }

    /// Paths of every history entry, oldest first.
    pub fn history_paths(&self) -> Vec<String> {
        self.history
            .entries()
            .iter()
            .map(|e| e.location.to_string())
            .collect()
    }
}

/// Loader rendering a fixed heading.
pub fn static_page(
    heading: &'static str,
) -> impl Fn(ViewContext<MemoryContainer>) -> LocalBoxFuture<'static, Result<(), ViewError>> {
    move |ctx| async move { ctx.render(format!("<h1>{heading}</h1>")) }.boxed_local()
}

/// Loader fetching `GET {api}` under `key` and rendering `{label}: {body}`.
pub fn fetching_page(
    key: &'static str,
    api: &'static str,
    label: &'static str,
) -> impl Fn(ViewContext<MemoryContainer>) -> LocalBoxFuture<'static, Result<(), ViewError>> {
    move |ctx| {
        async move {
            let body = ctx.fetch(key, Request::get(api)).await?;
            ctx.render(format!("{label}: {body}"))
        }
        .boxed_local()
    }
}

/// Loader rendering the route parameters as `name=value` pairs.
pub fn params_page(
    label: &'static str,
) -> impl Fn(ViewContext<MemoryContainer>) -> LocalBoxFuture<'static, Result<(), ViewError>> {
    move |ctx| {
        async move {
            let mut pairs: Vec<String> = ctx
                .params()
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            pairs.sort();
            ctx.render(format!("{label} {}", pairs.join(",")))
        }
        .boxed_local()
    }
}

/// Assert that route parameters contain expected key-value pair
pub fn assert_param_equals(params: &RouteParams, key: &str, expected: &str) {
    let value = params.get(key);
    assert!(
        value.is_some(),
        "Parameter '{}' not found in RouteParams",
        key
    );
    assert_eq!(
        value.unwrap(),
        expected,
        "Parameter '{}' has wrong value",
        key
    );
}
