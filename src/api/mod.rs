//! Collaborator contracts the core is written against.
//!
//! The transport ([`ApiClient`]) and the session ([`CredentialProvider`]) are
//! both injected into controllers at construction. Nothing in this crate
//! keeps ambient auth state.
//!
//! ## Example
//!
//! ```ignore
//! use storefront_moderation::api::{ApiRequest, InMemoryApi, Method};
//! use serde_json::json;
//!
//! let api = InMemoryApi::new();
//! api.respond(Method::Get, "/admin/reports", json!([]));
//! let body = api.send(ApiRequest::get("/admin/reports")).await?;
//! ```

mod in_memory;
pub mod routes;

#[cfg(feature = "http")]
mod http;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::error::{ClientError, ClientResult};
use crate::ids::Id;

pub use in_memory::InMemoryApi;

#[cfg(feature = "http")]
pub use http::HttpApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// One call against the backend.
///
/// Query parameters are kept apart from the path so the transport can encode
/// them; routes are always matched on `path` alone.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub token: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            token: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a bearer credential when one is available.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Transport-level failure. `status` is `None` when no response arrived.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.status, .message))]
pub struct HttpError {
    pub status: Option<u16>,
    pub message: String,
}

impl HttpError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

fn describe(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("http {}: {}", status, message),
        None => format!("transport failure: {}", message),
    }
}

/// Remote API capability.
///
/// A 2xx response resolves to its decoded JSON body (`Value::Null` when the
/// body is empty, `Value::String` when it is not JSON).
pub trait ApiClient: Send + Sync {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<Value, HttpError>> + Send;
}

impl<T: ApiClient> ApiClient for Arc<T> {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<Value, HttpError>> + Send {
        (**self).send(request)
    }
}

/// Opaque session collaborator. The core reads the credential per call and
/// never stores or refreshes it.
pub trait CredentialProvider: Send + Sync {
    fn token(&self) -> Option<String>;

    fn user_id(&self) -> Option<Id>;

    fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

impl<T: CredentialProvider> CredentialProvider for Arc<T> {
    fn token(&self) -> Option<String> {
        (**self).token()
    }

    fn user_id(&self) -> Option<Id> {
        (**self).user_id()
    }

    fn is_authenticated(&self) -> bool {
        (**self).is_authenticated()
    }
}

/// Fixed credentials, for tests and hosts that resolve the session up front.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    token: Option<String>,
    user_id: Option<Id>,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>, user_id: Id) -> Self {
        Self {
            token: Some(token.into()),
            user_id: Some(user_id),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl CredentialProvider for StaticCredentials {
    fn token(&self) -> Option<String> {
        self.token.clone()
    }

    fn user_id(&self) -> Option<Id> {
        self.user_id
    }
}

/// Decode a JSON array response. `null` is an empty list.
pub(crate) fn decode_list<T: DeserializeOwned>(body: Value, what: &str) -> ClientResult<Vec<T>> {
    if body.is_null() {
        return Ok(Vec::new());
    }
    if !body.is_array() {
        return Err(ClientError::MalformedResponse(format!(
            "{}: expected an array, got {}",
            what, body
        )));
    }
    serde_json::from_value(body)
        .map_err(|e| ClientError::MalformedResponse(format!("{}: {}", what, e)))
}
