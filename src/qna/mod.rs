//! Product Q&A panel.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::api::{decode_list, routes, ApiClient, ApiRequest, CredentialProvider};
use crate::error::{ClientError, ClientResult};
use crate::ids::{deserialize_id, deserialize_opt_id, Id};
use crate::lifecycle::{Mount, UnmountHandle};

/// Literal body the backend answers a successful question delete with.
pub const DELETE_ACK: &str = "delete success";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub ask_id: Id,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub product_id: Option<Id>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "crate::review_board::nullable_text")]
    pub ask_content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteAskPayload<'a> {
    user_id: Id,
    product_id: Id,
    ask_content: &'a str,
}

#[derive(Debug, Default)]
struct QnaState {
    product_id: Option<Id>,
    asks: Vec<AskRecord>,
}

/// Questions asked about one product.
pub struct QnaBoard<A, C> {
    api: A,
    credentials: C,
    state: RwLock<QnaState>,
    mount: Mount,
}

impl<A: ApiClient, C: CredentialProvider> QnaBoard<A, C> {
    /// Create an empty panel.
    pub fn new(api: A, credentials: C) -> Self {
        Self {
            api,
            credentials,
            state: RwLock::new(QnaState::default()),
            mount: Mount::new(),
        }
    }

    /// Handle the host view fires when it is torn down.
    pub fn unmount_handle(&self) -> UnmountHandle {
        self.mount.handle()
    }

    /// Questions currently listed.
    pub fn asks(&self) -> ClientResult<Vec<AskRecord>> {
        self.state
            .read()
            .map(|state| state.asks.clone())
            .map_err(|_| ClientError::LockPoisoned("read asks"))
    }

    /// Fetch the questions of `product_id`, replacing the list.
    pub async fn load(&self, product_id: Id) -> ClientResult<Vec<AskRecord>> {
        self.mount.ensure_mounted()?;
        let body = self
            .api
            .send(
                ApiRequest::get(routes::product_asks(product_id))
                    .with_token(self.credentials.token()),
            )
            .await
            .map_err(ClientError::from)?;
        self.mount.ensure_mounted()?;

        let asks: Vec<AskRecord> = decode_list(body, "questions")?;
        let mut state = self
            .state
            .write()
            .map_err(|_| ClientError::LockPoisoned("load asks"))?;
        state.product_id = Some(product_id);
        state.asks = asks;
        Ok(state.asks.clone())
    }

    /// Delete a question. The list changes only on an explicit acknowledgement.
    pub async fn delete(&self, ask_id: Id) -> ClientResult<AskRecord> {
        self.mount.ensure_mounted()?;
        let (token, user_id) = match (self.credentials.token(), self.credentials.user_id()) {
            (Some(token), Some(user_id)) => (token, user_id),
            _ => return Err(ClientError::Unauthorized("sign in to delete a question".into())),
        };
        let (product_id, existing) = {
            let state = self
                .state
                .read()
                .map_err(|_| ClientError::LockPoisoned("find ask"))?;
            let existing = state
                .asks
                .iter()
                .find(|ask| ask.ask_id == ask_id)
                .cloned()
                .ok_or_else(|| ClientError::NotFound(format!("question {}", ask_id)))?;
            let product_id = existing
                .product_id
                .or(state.product_id)
                .ok_or_else(|| {
                    ClientError::NotFound(format!("product of question {}", ask_id))
                })?;
            (product_id, existing)
        };

        let payload = DeleteAskPayload {
            user_id,
            product_id,
            ask_content: &existing.ask_content,
        };
        let body = serde_json::to_value(&payload)
            .map_err(|e| ClientError::Validation(e.to_string()))?;
        let ack = self
            .api
            .send(
                ApiRequest::delete(routes::ask(ask_id))
                    .with_body(body)
                    .with_token(Some(token)),
            )
            .await
            .map_err(ClientError::from)?;
        self.mount.ensure_mounted()?;

        if !is_delete_ack(&ack) {
            warn!(ask_id, %ack, "question delete not acknowledged");
            return Err(ClientError::Rejected {
                status: 200,
                message: ack.to_string(),
            });
        }

        let mut state = self
            .state
            .write()
            .map_err(|_| ClientError::LockPoisoned("delete ask"))?;
        state.asks.retain(|ask| ask.ask_id != ask_id);
        info!(ask_id, "question deleted");
        Ok(existing)
    }
}

fn is_delete_ack(body: &Value) -> bool {
    body.as_str().is_some_and(|text| text.trim() == DELETE_ACK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{InMemoryApi, Method, StaticCredentials};
    use serde_json::json;

    fn board(api: &InMemoryApi) -> QnaBoard<InMemoryApi, StaticCredentials> {
        QnaBoard::new(api.clone(), StaticCredentials::new("tok", 9))
    }

    fn seed(api: &InMemoryApi) {
        api.respond(
            Method::Get,
            "/ask/3",
            json!([
                { "askId": 1, "askContent": "When does it ship?" },
                { "askId": "2", "productId": 3, "askContent": "Colours?" }
            ]),
        );
    }

    #[tokio::test]
    async fn load_and_delete_acknowledged() {
        let api = InMemoryApi::new();
        seed(&api);
        api.respond(Method::Delete, "/ask/1", json!(DELETE_ACK));

        let board = board(&api);
        assert_eq!(board.load(3).await.unwrap().len(), 2);

        let removed = board.delete(1).await.unwrap();
        assert_eq!(removed.ask_content, "When does it ship?");
        let remaining: Vec<Id> = board.asks().unwrap().iter().map(|a| a.ask_id).collect();
        assert_eq!(remaining, vec![2]);

        let call = &api.calls_to(Method::Delete, "/ask/1")[0];
        assert_eq!(
            call.body,
            Some(json!({ "userId": 9, "productId": 3, "askContent": "When does it ship?" }))
        );
    }

    #[tokio::test]
    async fn unacknowledged_delete_keeps_list() {
        let api = InMemoryApi::new();
        seed(&api);
        api.respond(Method::Delete, "/ask/2", json!("delete failed"));

        let board = board(&api);
        board.load(3).await.unwrap();
        let result = board.delete(2).await;
        assert!(matches!(result, Err(ClientError::Rejected { status: 200, .. })));
        assert_eq!(board.asks().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_question_is_not_sent() {
        let api = InMemoryApi::new();
        seed(&api);
        let board = board(&api);
        board.load(3).await.unwrap();

        assert!(matches!(board.delete(77).await, Err(ClientError::NotFound(_))));
        assert!(api.calls_to(Method::Delete, "/ask/77").is_empty());
    }
}
