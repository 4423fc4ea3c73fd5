//! InMemoryApi - scripted ApiClient for testing and development.

use std::collections::{HashMap, VecDeque};
use std::future::{self, Future};
use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::{ApiClient, ApiRequest, HttpError, Method};

type Reply = Result<Value, HttpError>;

#[derive(Default)]
struct Route {
    queued: VecDeque<Reply>,
    sticky: Option<Reply>,
}

#[derive(Default)]
struct Inner {
    routes: HashMap<(Method, String), Route>,
    calls: Vec<ApiRequest>,
}

/// In-memory API answering from registered `(method, path)` replies.
///
/// One-shot replies are consumed first, then the sticky reply is repeated.
/// Unregistered routes answer 404. Every request is recorded. Clone-friendly
/// via Arc: clones share routes and the call log.
#[derive(Clone, Default)]
pub struct InMemoryApi {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every `(method, path)` request with `body`.
    pub fn respond(&self, method: Method, path: impl Into<String>, body: Value) {
        self.set_sticky(method, path.into(), Ok(body));
    }

    /// Fail every `(method, path)` request with `error`.
    pub fn fail(&self, method: Method, path: impl Into<String>, error: HttpError) {
        self.set_sticky(method, path.into(), Err(error));
    }

    /// Answer the next `(method, path)` request only.
    pub fn respond_once(&self, method: Method, path: impl Into<String>, reply: Reply) {
        if let Ok(mut inner) = self.inner.write() {
            inner
                .routes
                .entry((method, path.into()))
                .or_default()
                .queued
                .push_back(reply);
        }
    }

    /// All recorded requests, oldest first.
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.inner
            .read()
            .map(|inner| inner.calls.clone())
            .unwrap_or_default()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method && call.path == path)
            .collect()
    }

    pub fn clear_calls(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.calls.clear();
        }
    }

    fn set_sticky(&self, method: Method, path: String, reply: Reply) {
        if let Ok(mut inner) = self.inner.write() {
            inner.routes.entry((method, path)).or_default().sticky = Some(reply);
        }
    }

    fn dispatch(&self, request: ApiRequest) -> Reply {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| HttpError::network("in-memory api lock poisoned"))?;

        let key = (request.method, request.path.clone());
        inner.calls.push(request);

        match inner.routes.get_mut(&key) {
            Some(route) => match route.queued.pop_front() {
                Some(reply) => reply,
                None => route
                    .sticky
                    .clone()
                    .unwrap_or_else(|| Err(no_route(&key.0, &key.1))),
            },
            None => Err(no_route(&key.0, &key.1)),
        }
    }
}

fn no_route(method: &Method, path: &str) -> HttpError {
    HttpError::status(404, format!("no route for {} {}", method, path))
}

impl ApiClient for InMemoryApi {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<Value, HttpError>> + Send {
        future::ready(self.dispatch(request))
    }
}
