//! Product review board: reviews, their comment threads and review search.
//!
//! Reviews come from the backend already well-shaped, so there is no
//! classifier here. Comment threads are cached per review and fetched,
//! reconciled and invalidated independently of each other.

mod controller;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::{deserialize_id, Id};

pub use controller::ReviewBoardController;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub review_id: Id,
    #[serde(deserialize_with = "deserialize_id")]
    pub product_id: Id,
    #[serde(default, deserialize_with = "nullable_text")]
    pub username: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub review_title: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub review_content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub comment_id: Id,
    #[serde(deserialize_with = "deserialize_id")]
    pub review_id: Id,
    #[serde(deserialize_with = "deserialize_id")]
    pub product_id: Id,
    #[serde(default, deserialize_with = "nullable_text")]
    pub username: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub comment_content: String,
}

/// Body of every comment mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPayload {
    pub user_id: Id,
    pub product_id: Id,
    pub review_id: Id,
    pub comment_content: String,
}

/// `null` or a missing field reads as the empty string.
pub(crate) fn nullable_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::decode_list;
    use crate::error::ClientError;
    use serde_json::json;

    #[test]
    fn review_ids_are_coerced() {
        let review: ReviewRecord = serde_json::from_value(json!({
            "reviewId": "4",
            "productId": 1,
            "username": "kim",
            "reviewTitle": "great",
            "reviewContent": null
        }))
        .unwrap();
        assert_eq!(review.review_id, 4);
        assert_eq!(review.review_content, "");
    }

    #[test]
    fn comment_without_ids_is_rejected() {
        let result = serde_json::from_value::<CommentRecord>(json!({
            "commentId": 1,
            "reviewId": "abc",
            "productId": 1
        }));
        assert!(result.is_err());
    }

    #[test]
    fn decode_list_shapes() {
        let empty: Vec<ReviewRecord> = decode_list(json!(null), "reviews").unwrap();
        assert!(empty.is_empty());

        let not_a_list = decode_list::<ReviewRecord>(json!({ "reviews": [] }), "reviews");
        assert!(matches!(not_a_list, Err(ClientError::MalformedResponse(_))));

        let bad_item = decode_list::<ReviewRecord>(json!([{ "reviewId": 1 }]), "reviews");
        assert!(matches!(bad_item, Err(ClientError::MalformedResponse(_))));
    }

    #[test]
    fn payload_is_camel_case() {
        let payload = CommentPayload {
            user_id: 1,
            product_id: 2,
            review_id: 3,
            comment_content: "hi".into(),
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "userId": 1, "productId": 2, "reviewId": 3, "commentContent": "hi" })
        );
    }
}
