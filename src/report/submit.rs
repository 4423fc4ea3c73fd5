use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::api::{routes, ApiClient, ApiRequest, CredentialProvider};
use crate::error::{ClientError, ClientResult};
use crate::ids::Id;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductReportPayload<'a> {
    user_id: Id,
    product_id: Id,
    product_report_content: &'a str,
}

/// File a report against a product listing.
///
/// Returns the server's acknowledgement body.
pub async fn submit_product_report<A, C>(
    api: &A,
    credentials: &C,
    product_id: Id,
    content: &str,
) -> ClientResult<Value>
where
    A: ApiClient,
    C: CredentialProvider,
{
    let content = content.trim();
    if content.is_empty() {
        return Err(ClientError::Validation("report content is empty".into()));
    }
    let (token, user_id) = match (credentials.token(), credentials.user_id()) {
        (Some(token), Some(user_id)) => (token, user_id),
        _ => return Err(ClientError::Unauthorized("sign in to report a product".into())),
    };

    let payload = ProductReportPayload {
        user_id,
        product_id,
        product_report_content: content,
    };
    let body = serde_json::to_value(&payload)
        .map_err(|e| ClientError::Validation(e.to_string()))?;

    let ack = api
        .send(ApiRequest::post(routes::PRODUCT_REPORT_SUBMIT, body).with_token(Some(token)))
        .await?;
    info!(product_id, user_id, "product report submitted");
    Ok(ack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{InMemoryApi, Method, StaticCredentials};
    use serde_json::json;

    #[tokio::test]
    async fn posts_report_payload() {
        let api = InMemoryApi::new();
        api.respond(Method::Post, routes::PRODUCT_REPORT_SUBMIT, json!(true));

        let ack = submit_product_report(&api, &StaticCredentials::new("tok", 3), 10, " fake ")
            .await
            .unwrap();
        assert_eq!(ack, json!(true));

        let calls = api.calls_to(Method::Post, routes::PRODUCT_REPORT_SUBMIT);
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].body,
            Some(json!({ "userId": 3, "productId": 10, "productReportContent": "fake" }))
        );
        assert_eq!(calls[0].token.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn rejects_blank_and_anonymous() {
        let api = InMemoryApi::new();
        let blank = submit_product_report(&api, &StaticCredentials::new("tok", 3), 10, "  ").await;
        assert!(matches!(blank, Err(ClientError::Validation(_))));

        let anon = submit_product_report(&api, &StaticCredentials::anonymous(), 10, "x").await;
        assert!(matches!(anon, Err(ClientError::Unauthorized(_))));
        assert!(api.calls().is_empty());
    }
}
