//! HTTP transport for the API capability.
//!
//! Requires the `http` feature. Uses reqwest.
//!
//! ## Example
//!
//! ```ignore
//! use storefront_moderation::{HttpApiClient, HttpConfig};
//!
//! let api = HttpApiClient::new(HttpConfig::from_env());
//! let screen = ModerationScreen::ProductReports;
//! let controller = ModerationListController::new(api, credentials, screen);
//! ```

use std::future::Future;

use serde_json::Value;
use tracing::debug;

use super::{ApiClient, ApiRequest, HttpError, Method};
use crate::config::HttpConfig;

#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    config: HttpConfig,
}

impl HttpApiClient {
    pub fn new(config: HttpConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: HttpConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    async fn execute(&self, request: ApiRequest) -> Result<Value, HttpError> {
        let url = self.config.url(&request.path);
        debug!(method = %request.method, %url, "api request");

        let mut builder = self.client.request(reqwest_method(request.method), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| HttpError::network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| HttpError::network(e.to_string()))?;

        if !status.is_success() {
            return Err(HttpError::status(status.as_u16(), text));
        }
        Ok(decode_body(&text))
    }
}

impl ApiClient for HttpApiClient {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<Value, HttpError>> + Send {
        self.execute(request)
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Empty bodies decode to `Null`, non-JSON bodies (e.g. `delete success`) to a string.
fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_decoding() {
        assert_eq!(decode_body(""), Value::Null);
        assert_eq!(decode_body("  "), Value::Null);
        assert_eq!(decode_body("[1,2]"), json!([1, 2]));
        assert_eq!(decode_body("delete success"), json!("delete success"));
    }
}
