//! Backend paths.

use crate::ids::Id;
use crate::report::ReportKey;

pub const ADMIN_REPORTS: &str = "/admin/reports";
pub const REVIEW_SEARCH: &str = "/reviews/search";
pub const COMMENTS: &str = "/comments";
pub const PRODUCT_REPORT_SUBMIT: &str = "/report/product";

pub fn admin_report(key: ReportKey) -> String {
    format!("{}/{}/{}", ADMIN_REPORTS, key.kind.as_str(), key.id)
}

pub fn admin_report_resolve(key: ReportKey) -> String {
    format!("{}/resolve", admin_report(key))
}

pub fn admin_review(review_id: Id) -> String {
    format!("/admin/reviews/{}", review_id)
}

pub fn admin_user_suspend(user_id: Id) -> String {
    format!("/admin/users/{}/suspend", user_id)
}

pub fn product_reviews(product_id: Id) -> String {
    format!("/reviews/product/{}", product_id)
}

pub fn review(review_id: Id) -> String {
    format!("/reviews/{}", review_id)
}

pub fn review_comments(review_id: Id) -> String {
    format!("{}/{}", COMMENTS, review_id)
}

pub fn comment(comment_id: Id) -> String {
    format!("{}/{}", COMMENTS, comment_id)
}

pub fn comment_detail(comment_id: Id) -> String {
    format!("{}/detail/{}", COMMENTS, comment_id)
}

pub fn product_asks(product_id: Id) -> String {
    format!("/ask/{}", product_id)
}

pub fn ask(ask_id: Id) -> String {
    format!("/ask/{}", ask_id)
}
