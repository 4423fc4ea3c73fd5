//! Shared fixtures: backend payloads and a transport whose replies can be held back.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use storefront_moderation::{ApiClient, ApiRequest, HttpError, InMemoryApi, StaticCredentials};
use tokio::sync::oneshot;

pub fn admin() -> StaticCredentials {
    StaticCredentials::new("admin-token", 1)
}

pub fn shopper() -> StaticCredentials {
    StaticCredentials::new("shopper-token", 42)
}

pub fn product_report(id: i64, product_id: i64, content: &str) -> Value {
    json!({
        "productReportId": id,
        "productId": product_id,
        "userid": 100 + id,
        "productReportContent": content,
        "createdAt": "2024-03-01T10:00:00Z"
    })
}

pub fn review_report(id: i64, review_id: i64, content: &str) -> Value {
    json!({
        "reviewReportId": id,
        "reviewId": review_id,
        "reviewerId": 200 + id,
        "reviewReportContent": content,
        "createdAt": "2024-03-02 08:30:00"
    })
}

/// The admin report payload as the backend groups it: one array per kind.
pub fn report_payload() -> Value {
    json!([
        [
            product_report(1, 10, "Counterfeit item"),
            product_report(2, 11, "Wrong listing photos"),
            product_report(3, 10, "Counterfeit again"),
        ],
        [
            review_report(1, 70, "Spam link"),
            review_report(2, 71, "Abusive language"),
            review_report(4, 70, "More spam"),
        ],
        { "unexpected": true }
    ])
}

pub fn review(review_id: i64, product_id: i64, title: &str) -> Value {
    json!({
        "reviewId": review_id,
        "productId": product_id,
        "username": "alice",
        "reviewTitle": title,
        "reviewContent": format!("{} body", title)
    })
}

pub fn comment(comment_id: i64, review_id: i64, content: &str) -> Value {
    json!({
        "commentId": comment_id,
        "reviewId": review_id,
        "productId": 7,
        "username": "bob",
        "commentContent": content
    })
}

type Gates = HashMap<String, VecDeque<oneshot::Receiver<()>>>;

/// Wraps [`InMemoryApi`] so a request's reply is picked when it is sent but
/// only delivered once its gate opens.
#[derive(Clone, Default)]
pub struct GatedApi {
    api: InMemoryApi,
    gates: Arc<Mutex<Gates>>,
}

impl GatedApi {
    pub fn new(api: InMemoryApi) -> Self {
        Self {
            api,
            gates: Arc::default(),
        }
    }

    pub fn api(&self) -> &InMemoryApi {
        &self.api
    }

    /// Hold the next request to `path` until the returned sender fires or drops.
    pub fn gate(&self, path: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(rx);
        tx
    }
}

impl ApiClient for GatedApi {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<Value, HttpError>> + Send {
        let gate = self
            .gates
            .lock()
            .unwrap()
            .get_mut(&request.path)
            .and_then(VecDeque::pop_front);
        let reply = self.api.send(request);
        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            reply.await
        }
    }
}
