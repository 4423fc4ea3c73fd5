//! Transport configuration for the `http` feature.

use std::env;

use tracing::{info, warn};

pub const API_URL_VAR: &str = "STOREFRONT_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub base_url: String,
}

impl HttpConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize(base_url.into()),
        }
    }

    /// Read `STOREFRONT_API_URL`, falling back to [`DEFAULT_API_URL`].
    pub fn from_env() -> Self {
        Self::new(var(API_URL_VAR).unwrap_or_else(|| {
            info!("{API_URL_VAR} not set, using default: {DEFAULT_API_URL}");
            DEFAULT_API_URL.to_string()
        }))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

fn var(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        Ok(_) => {
            warn!("Environment variable {key} is empty, ignoring");
            None
        }
        Err(_) => None,
    }
}

fn normalize(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
