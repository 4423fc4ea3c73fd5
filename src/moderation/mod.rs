//! Admin moderation screens.
//!
//! One [`ModerationListController`] backs one mounted admin screen. It owns
//! the fetched [`ReportCollection`](crate::report::ReportCollection) and
//! reconciles it only after the server confirms a mutation.
//!
//! ```text
//! Idle --fetch--> Loading --ok--> Ready(collection) --delete ok--> Ready(collection - key)
//!                         \--err-> Error(message)
//! ```

mod controller;
#[cfg(feature = "emitter")]
mod events;

use crate::report::{ReportCollection, ReportKind};

pub use controller::ModerationListController;
#[cfg(feature = "emitter")]
pub use events::{ModerationEvents, NavigationTarget, NAVIGATE_EVENT};

/// Which partition the mounted screen lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModerationScreen {
    ProductReports,
    ReviewReports,
}

impl ModerationScreen {
    /// Report kind this screen lists.
    pub fn kind(&self) -> ReportKind {
        match self {
            ModerationScreen::ProductReports => ReportKind::Product,
            ModerationScreen::ReviewReports => ReportKind::Review,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ListState {
    #[default]
    Idle,
    Loading,
    Ready(ReportCollection),
    Error(String),
}

impl ListState {
    /// True once a fetch has landed and a collection is loaded.
    pub fn is_ready(&self) -> bool {
        matches!(self, ListState::Ready(_))
    }

    /// The loaded collection, if any.
    pub fn collection(&self) -> Option<&ReportCollection> {
        match self {
            ListState::Ready(collection) => Some(collection),
            _ => None,
        }
    }

    pub(crate) fn collection_mut(&mut self) -> Option<&mut ReportCollection> {
        match self {
            ListState::Ready(collection) => Some(collection),
            _ => None,
        }
    }
}
