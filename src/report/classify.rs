//! Raw report classification.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use super::{ProductReport, ReportRecord, ReviewReport};
use crate::ids::first_id;

const PRODUCT_REPORT_ID: &str = "productReportId";
const REVIEW_REPORT_ID: &str = "reviewReportId";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Classify one raw report object.
///
/// Total over every JSON value: anything that is not a recognisable report
/// yields `None`. The product check always runs first, so an object carrying
/// both `productReportId` and `reviewReportId` is a product report. A present
/// but unusable `productReportId` still claims the object, which is then
/// dropped rather than reinterpreted as a review report.
pub fn classify(raw: &Value) -> Option<ReportRecord> {
    if !raw.is_object() {
        return None;
    }

    if is_present(raw, PRODUCT_REPORT_ID) {
        return product_report(raw).map(ReportRecord::Product);
    }
    if is_present(raw, REVIEW_REPORT_ID) {
        return review_report(raw).map(ReportRecord::Review);
    }
    None
}

fn is_present(raw: &Value, key: &str) -> bool {
    raw.get(key).is_some_and(|value| !value.is_null())
}

fn product_report(raw: &Value) -> Option<ProductReport> {
    Some(ProductReport {
        report_id: first_id(raw, &[PRODUCT_REPORT_ID])?,
        product_id: first_id(raw, &["productId"])?,
        reported_user_id: first_id(raw, &["reportedUserId", "userid", "userId"])?,
        content: text(raw, "productReportContent"),
        created_at: raw.get("createdAt").and_then(parse_timestamp),
    })
}

fn review_report(raw: &Value) -> Option<ReviewReport> {
    Some(ReviewReport {
        report_id: first_id(raw, &[REVIEW_REPORT_ID])?,
        review_id: first_id(raw, &["reviewId"])?,
        reviewer_id: first_id(raw, &["reviewerId", "userid", "userId"]),
        content: text(raw, "reviewReportContent"),
        created_at: raw.get("createdAt").and_then(parse_timestamp),
    })
}

fn text(raw: &Value, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// RFC 3339, naive date-time (read as UTC), bare date, or `[y, m, d, h, min, s]`.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Array(parts) => parse_timestamp_parts(parts),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_timestamp_parts(parts: &[Value]) -> Option<DateTime<Utc>> {
    let numbers = parts
        .iter()
        .map(Value::as_u64)
        .collect::<Option<Vec<u64>>>()?;
    if numbers.len() < 3 {
        return None;
    }
    let part = |index: usize| numbers.get(index).copied().unwrap_or(0);
    let year = i32::try_from(part(0)).ok()?;
    let date = NaiveDate::from_ymd_opt(
        year,
        u32::try_from(part(1)).ok()?,
        u32::try_from(part(2)).ok()?,
    )?;
    let naive = date.and_hms_opt(
        u32::try_from(part(3)).ok()?,
        u32::try_from(part(4)).ok()?,
        u32::try_from(part(5)).ok()?,
    )?;
    Some(naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportKey;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn product_report_fields() {
        let record = classify(&json!({
            "productReportId": 1,
            "productId": "10",
            "userid": 3,
            "productReportContent": "counterfeit",
            "createdAt": "2024-11-28T10:15:00Z"
        }))
        .unwrap();

        match record {
            ReportRecord::Product(report) => {
                assert_eq!(report.report_id, 1);
                assert_eq!(report.product_id, 10);
                assert_eq!(report.reported_user_id, 3);
                assert_eq!(report.content, "counterfeit");
                assert_eq!(report.created_at.unwrap().hour(), 10);
            }
            other => panic!("expected product report, got {:?}", other),
        }
    }

    #[test]
    fn reported_user_id_preferred_over_userid() {
        let record = classify(&json!({
            "productReportId": 1,
            "productId": 2,
            "reportedUserId": 44,
            "userid": 3
        }))
        .unwrap();
        assert!(matches!(
            record,
            ReportRecord::Product(ProductReport { reported_user_id: 44, .. })
        ));
    }

    #[test]
    fn review_report_with_optional_reviewer() {
        let record = classify(&json!({
            "reviewReportId": "2",
            "reviewId": 7,
            "reviewReportContent": "spam"
        }))
        .unwrap();
        match record {
            ReportRecord::Review(report) => {
                assert_eq!(report.report_id, 2);
                assert_eq!(report.review_id, 7);
                assert_eq!(report.reviewer_id, None);
                assert_eq!(report.content, "spam");
                assert_eq!(report.created_at, None);
            }
            other => panic!("expected review report, got {:?}", other),
        }
    }

    #[test]
    fn product_wins_when_both_ids_present() {
        let record = classify(&json!({
            "productReportId": 1,
            "reviewReportId": 2,
            "productId": 5,
            "reviewId": 6,
            "userid": 9
        }))
        .unwrap();
        assert_eq!(record.key(), ReportKey::product(1));
    }

    #[test]
    fn null_product_id_falls_through_to_review() {
        let record = classify(&json!({
            "productReportId": null,
            "reviewReportId": 2,
            "reviewId": 6
        }))
        .unwrap();
        assert_eq!(record.key(), ReportKey::review(2));
    }

    #[test]
    fn noise_is_dropped_not_raised() {
        assert_eq!(classify(&json!({})), None);
        assert_eq!(classify(&json!({ "unrelated": true })), None);
        assert_eq!(classify(&json!(null)), None);
        assert_eq!(classify(&json!(42)), None);
        assert_eq!(classify(&json!("productReportId")), None);
        assert_eq!(classify(&json!([{ "productReportId": 1 }])), None);
        // claimed by the product check but missing its owning id
        assert_eq!(
            classify(&json!({ "productReportId": 1, "reviewReportId": 2, "reviewId": 3 })),
            None
        );
        assert_eq!(
            classify(&json!({ "productReportId": "x1", "productId": 1, "userid": 1 })),
            None
        );
    }

    #[test]
    fn timestamp_shapes() {
        let naive = parse_timestamp(&json!("2024-11-28T09:30:00")).unwrap();
        assert_eq!((naive.day(), naive.hour(), naive.minute()), (28, 9, 30));

        let fractional = parse_timestamp(&json!("2024-11-28T09:30:00.123")).unwrap();
        assert_eq!(fractional.second(), 0);

        let array = parse_timestamp(&json!([2024, 11, 28, 9, 30])).unwrap();
        assert_eq!((array.month(), array.hour(), array.minute()), (11, 9, 30));

        let date = parse_timestamp(&json!("2024-11-28")).unwrap();
        assert_eq!(date.hour(), 0);

        assert_eq!(parse_timestamp(&json!("yesterday")), None);
        assert_eq!(parse_timestamp(&json!([2024, 13, 1])), None);
        assert_eq!(parse_timestamp(&json!(1700000000)), None);
    }

    #[test]
    fn non_string_content_is_stringified() {
        let record = classify(&json!({
            "reviewReportId": 1,
            "reviewId": 1,
            "reviewReportContent": 404
        }))
        .unwrap();
        assert_eq!(record.content(), "404");
    }
}
