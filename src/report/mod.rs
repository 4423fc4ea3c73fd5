//! Moderation reports.
//!
//! The admin reports endpoint returns product and review reports mixed
//! together, sometimes grouped in one level of nested arrays. [`classify`]
//! turns one raw JSON object into a typed [`ReportRecord`] (or drops it) and
//! [`aggregate`] flattens, classifies and indexes the whole payload.
//!
//! ## Example
//!
//! ```ignore
//! use storefront_moderation::report::{aggregate, ReportKey, ReportKind};
//! use serde_json::json;
//!
//! let reports = aggregate(&json!([
//!     [{ "productReportId": 1, "productId": 10, "userid": 3, "productReportContent": "fake" }],
//!     { "reviewReportId": 2, "reviewId": 7, "reviewReportContent": "spam" },
//! ]));
//! assert_eq!(reports.counts().products, 1);
//! assert!(reports.get(&ReportKey::new(ReportKind::Review, 2)).is_some());
//! ```

mod classify;
mod collection;
mod submit;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::Id;

pub use classify::classify;
pub use collection::{aggregate, ReportCollection, ReportCounts};
pub use submit::submit_product_report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Product,
    Review,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Product => "product",
            ReportKind::Review => "review",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report ids are only unique within a kind, so lookups go through both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportKey {
    pub kind: ReportKind,
    pub id: Id,
}

impl ReportKey {
    /// Key for report `id` of `kind`.
    pub fn new(kind: ReportKind, id: Id) -> Self {
        Self { kind, id }
    }

    pub fn product(id: Id) -> Self {
        Self::new(ReportKind::Product, id)
    }

    pub fn review(id: Id) -> Self {
        Self::new(ReportKind::Review, id)
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductReport {
    pub report_id: Id,
    pub product_id: Id,
    pub reported_user_id: Id,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReport {
    pub report_id: Id,
    pub review_id: Id,
    pub reviewer_id: Option<Id>,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReportRecord {
    Product(ProductReport),
    Review(ReviewReport),
}

impl ReportRecord {
    pub fn kind(&self) -> ReportKind {
        match self {
            ReportRecord::Product(_) => ReportKind::Product,
            ReportRecord::Review(_) => ReportKind::Review,
        }
    }

    pub fn key(&self) -> ReportKey {
        match self {
            ReportRecord::Product(report) => ReportKey::product(report.report_id),
            ReportRecord::Review(report) => ReportKey::review(report.report_id),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            ReportRecord::Product(report) => &report.content,
            ReportRecord::Review(report) => &report.content,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            ReportRecord::Product(report) => report.created_at,
            ReportRecord::Review(report) => report.created_at,
        }
    }
}

impl From<ProductReport> for ReportRecord {
    fn from(report: ProductReport) -> Self {
        ReportRecord::Product(report)
    }
}

impl From<ReviewReport> for ReportRecord {
    fn from(report: ReviewReport) -> Self {
        ReportRecord::Review(report)
    }
}

/// Case-insensitive substring match; `needle` must already be lowercased.
pub(crate) fn content_matches(content: &str, needle: &str) -> bool {
    content.to_lowercase().contains(needle)
}
