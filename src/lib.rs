pub mod api;
#[cfg(feature = "http")]
mod config;
mod error;
pub mod ids;
mod inflight;
mod lifecycle;
pub mod moderation;
pub mod qna;
pub mod report;
pub mod review_board;

pub use api::{
    ApiClient, ApiRequest, CredentialProvider, HttpError, InMemoryApi, Method, StaticCredentials,
};
pub use error::{ClientError, ClientResult};
pub use ids::{coerce_id, Id};
pub use inflight::{InFlight, Ticket};
pub use lifecycle::{Mount, UnmountHandle};
pub use moderation::{ListState, ModerationListController, ModerationScreen};
pub use qna::{AskRecord, QnaBoard};
pub use report::{
    aggregate, classify, submit_product_report, ProductReport, ReportCollection, ReportCounts,
    ReportKey, ReportKind, ReportRecord, ReviewReport,
};
pub use review_board::{CommentRecord, ReviewBoardController, ReviewRecord};

#[cfg(feature = "emitter")]
pub use moderation::{ModerationEvents, NavigationTarget, NAVIGATE_EVENT};

#[cfg(feature = "http")]
pub use api::HttpApiClient;
#[cfg(feature = "http")]
pub use config::{HttpConfig, API_URL_VAR, DEFAULT_API_URL};

// Re-export the emitter so hosts can share one listener registry.
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
