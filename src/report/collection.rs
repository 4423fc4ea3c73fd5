//! ReportCollection - flattened, classified and indexed moderation reports.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    classify, content_matches, ProductReport, ReportKey, ReportKind, ReportRecord, ReviewReport,
};
use crate::ids::Id;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportCounts {
    pub products: usize,
    pub reviews: usize,
}

impl ReportCounts {
    pub fn total(&self) -> usize {
        self.products + self.reviews
    }
}

/// Product and review reports in fetch order, with a `(kind, id)` index.
///
/// Every mutation goes through the index; positions are never used as
/// identity. No two records share a [`ReportKey`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportCollection {
    product_reports: Vec<ProductReport>,
    review_reports: Vec<ReviewReport>,
    by_id: HashMap<ReportKey, ReportRecord>,
    dropped: usize,
}

/// Flatten one level, classify, drop noise and index.
///
/// Pure and total. Array elements are spread into the sequence; arrays found
/// inside those are not flattened further and are dropped by the classifier.
/// A non-array payload is treated as a one-element sequence, `null` as empty.
/// The first record for a `(kind, id)` wins, later duplicates count as dropped.
pub fn aggregate(raw: &Value) -> ReportCollection {
    let mut collection = ReportCollection::default();
    let flattened = flatten_once(raw);
    let total = flattened.len();

    for element in flattened {
        let accepted = match classify(element) {
            Some(record) => collection.insert(record),
            None => false,
        };
        if !accepted {
            collection.dropped += 1;
        }
    }

    if collection.dropped > 0 {
        warn!(
            dropped = collection.dropped,
            total, "dropped unrecognised or duplicate report records"
        );
    }
    debug!(
        products = collection.product_reports.len(),
        reviews = collection.review_reports.len(),
        "aggregated reports"
    );
    collection
}

fn flatten_once(raw: &Value) -> Vec<&Value> {
    let top: Vec<&Value> = match raw {
        Value::Array(elements) => elements.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    };

    let mut flattened = Vec::with_capacity(top.len());
    for element in top {
        match element {
            Value::Array(inner) => flattened.extend(inner.iter()),
            other => flattened.push(other),
        }
    }
    flattened
}

impl ReportCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Product reports in fetch order.
    pub fn product_reports(&self) -> &[ProductReport] {
        &self.product_reports
    }

    /// Review reports in fetch order.
    pub fn review_reports(&self) -> &[ReviewReport] {
        &self.review_reports
    }

    /// All records, product reports first, each partition in fetch order.
    pub fn records(&self) -> Vec<ReportRecord> {
        self.product_reports
            .iter()
            .cloned()
            .map(ReportRecord::Product)
            .chain(self.review_reports.iter().cloned().map(ReportRecord::Review))
            .collect()
    }

    /// Look up a record by `(kind, id)`.
    pub fn get(&self, key: &ReportKey) -> Option<&ReportRecord> {
        self.by_id.get(key)
    }

    /// Whether a record with `key` is present.
    pub fn contains(&self, key: &ReportKey) -> bool {
        self.by_id.contains_key(key)
    }

    /// Number of records across both partitions.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// True when neither partition holds a record.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Elements of the fetched payload that did not become records.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Per-partition sizes for count badges.
    pub fn counts(&self) -> ReportCounts {
        ReportCounts {
            products: self.product_reports.len(),
            reviews: self.review_reports.len(),
        }
    }

    /// Reports filed against one product listing.
    pub fn reports_for_product(&self, product_id: Id) -> Vec<&ProductReport> {
        self.product_reports
            .iter()
            .filter(|report| report.product_id == product_id)
            .collect()
    }

    /// Reports filed against one review.
    pub fn reports_for_review(&self, review_id: Id) -> Vec<&ReviewReport> {
        self.review_reports
            .iter()
            .filter(|report| report.review_id == review_id)
            .collect()
    }

    /// Case-insensitive content search.
    ///
    /// Surrounding whitespace in `keyword` is ignored, so a blank keyword
    /// returns an identical copy.
    pub fn filter(&self, keyword: &str) -> ReportCollection {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            return self.clone();
        }

        let mut projection = ReportCollection {
            dropped: self.dropped,
            ..ReportCollection::default()
        };
        for report in &self.product_reports {
            if content_matches(&report.content, &needle) {
                projection.insert(ReportRecord::Product(report.clone()));
            }
        }
        for report in &self.review_reports {
            if content_matches(&report.content, &needle) {
                projection.insert(ReportRecord::Review(report.clone()));
            }
        }
        projection
    }

    /// Remove exactly the record with `key`.
    pub fn remove(&mut self, key: &ReportKey) -> Option<ReportRecord> {
        let removed = self.by_id.remove(key)?;
        match key.kind {
            ReportKind::Product => self
                .product_reports
                .retain(|report| report.report_id != key.id),
            ReportKind::Review => self
                .review_reports
                .retain(|report| report.report_id != key.id),
        }
        Some(removed)
    }

    /// Remove every review report filed against `review_id`.
    pub fn remove_review_reports(&mut self, review_id: Id) -> Vec<ReportRecord> {
        let keys: Vec<ReportKey> = self
            .review_reports
            .iter()
            .filter(|report| report.review_id == review_id)
            .map(|report| ReportKey::review(report.report_id))
            .collect();
        keys.iter().filter_map(|key| self.remove(key)).collect()
    }

    fn insert(&mut self, record: ReportRecord) -> bool {
        let key = record.key();
        if self.by_id.contains_key(&key) {
            return false;
        }
        match &record {
            ReportRecord::Product(report) => self.product_reports.push(report.clone()),
            ReportRecord::Review(report) => self.review_reports.push(report.clone()),
        }
        self.by_id.insert(key, record);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(id: Id, content: &str) -> Value {
        json!({
            "productReportId": id,
            "productId": 100 + id,
            "userid": 7,
            "productReportContent": content
        })
    }

    fn review(id: Id, review_id: Id, content: &str) -> Value {
        json!({
            "reviewReportId": id,
            "reviewId": review_id,
            "reviewReportContent": content
        })
    }

    #[test]
    fn flattens_exactly_one_level() {
        let single = aggregate(&json!([product(1, "a")]));
        assert_eq!(single.counts().products, 1);

        let double = aggregate(&json!([[[product(1, "a")]]]));
        assert!(double.is_empty());
        assert_eq!(double.dropped(), 1);

        let mixed = aggregate(&json!([[product(1, "a")], review(2, 9, "b")]));
        assert_eq!(mixed.len(), 2);
        assert!(mixed.contains(&ReportKey::product(1)));
        assert!(mixed.contains(&ReportKey::review(2)));
    }

    #[test]
    fn partitions_keep_fetch_order() {
        let collection = aggregate(&json!([
            review(5, 1, "r5"),
            product(3, "p3"),
            [review(1, 1, "r1"), product(1, "p1")],
            product(2, "p2"),
        ]));

        let products: Vec<Id> = collection
            .product_reports()
            .iter()
            .map(|r| r.report_id)
            .collect();
        let reviews: Vec<Id> = collection
            .review_reports()
            .iter()
            .map(|r| r.report_id)
            .collect();
        assert_eq!(products, vec![3, 1, 2]);
        assert_eq!(reviews, vec![5, 1]);
    }

    #[test]
    fn same_id_in_different_kinds_coexist() {
        let collection = aggregate(&json!([product(1, "p"), review(1, 4, "r")]));
        assert_eq!(collection.len(), 2);
        assert_eq!(
            collection.get(&ReportKey::review(1)).map(|r| r.content()),
            Some("r")
        );
    }

    #[test]
    fn duplicate_keys_keep_first() {
        let collection = aggregate(&json!([product(1, "first"), [product(1, "second")]]));
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.dropped(), 1);
        assert_eq!(collection.product_reports()[0].content, "first");
    }

    #[test]
    fn non_array_payloads() {
        assert!(aggregate(&json!(null)).is_empty());
        assert_eq!(aggregate(&json!(null)).dropped(), 0);
        assert_eq!(aggregate(&json!(product(4, "solo"))).len(), 1);
        assert_eq!(aggregate(&json!("oops")).dropped(), 1);
    }

    #[test]
    fn remove_touches_only_the_key() {
        let mut collection =
            aggregate(&json!([product(1, "a"), product(2, "b"), review(2, 8, "c")]));

        let removed = collection.remove(&ReportKey::product(2)).unwrap();
        assert_eq!(removed.key(), ReportKey::product(2));
        assert_eq!(collection.len(), 2);
        assert!(collection.contains(&ReportKey::product(1)));
        assert!(collection.contains(&ReportKey::review(2)));
        assert!(collection.remove(&ReportKey::product(2)).is_none());
    }

    #[test]
    fn remove_review_reports_by_review() {
        let mut collection = aggregate(&json!([
            review(1, 8, "a"),
            review(2, 9, "b"),
            review(3, 8, "c"),
            product(8, "same number, other kind"),
        ]));

        let removed = collection.remove_review_reports(8);
        assert_eq!(removed.len(), 2);
        assert_eq!(collection.counts(), ReportCounts { products: 1, reviews: 1 });
        assert_eq!(collection.reports_for_review(9).len(), 1);
        assert!(collection.reports_for_review(8).is_empty());
    }

    #[test]
    fn filter_is_case_insensitive_projection() {
        let collection = aggregate(&json!([
            product(1, "Asked for a REFUND twice"),
            product(2, "counterfeit"),
            review(3, 1, "refund scam"),
        ]));

        let hits = collection.filter("Refund");
        assert_eq!(hits.counts(), ReportCounts { products: 1, reviews: 1 });
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.filter(""), collection);
        assert_eq!(collection.filter("   "), collection);
        assert_eq!(collection.filter("  refund ").len(), 2);
        assert!(collection.filter("nothing like this").is_empty());
    }

    #[test]
    fn detail_lookups() {
        let collection = aggregate(&json!([product(1, "a"), product(2, "b")]));
        assert_eq!(collection.reports_for_product(101).len(), 1);
        assert!(collection.reports_for_product(999).is_empty());
        assert_eq!(collection.records().len(), 2);
        assert_eq!(collection.counts().total(), 2);
    }
}
