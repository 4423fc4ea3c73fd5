//! Navigation requests raised by moderation screens.
//!
//! The controller never navigates on its own. Rows ask to open a product or
//! review and the host view subscribes and decides what to do.

use std::sync::Mutex;

use event_emitter_rs::EventEmitter;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::ids::Id;

pub const NAVIGATE_EVENT: &str = "moderation.navigate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationTarget {
    Product { product_id: Id },
    Review { review_id: Id },
}

/// Event emitter owned by one controller.
///
/// Listeners run on the emitter's own threads, not on the caller's.
pub struct ModerationEvents {
    emitter: Mutex<EventEmitter>,
}

impl Default for ModerationEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ModerationEvents {
    pub fn new() -> Self {
        Self {
            emitter: Mutex::new(EventEmitter::new()),
        }
    }

    /// Register a navigation listener; returns its listener id.
    pub fn on_navigate<F>(&self, listener: F) -> ClientResult<String>
    where
        F: Fn(NavigationTarget) + Send + Sync + 'static,
    {
        let mut emitter = self
            .emitter
            .lock()
            .map_err(|_| ClientError::LockPoisoned("register listener"))?;
        Ok(emitter.on(NAVIGATE_EVENT, listener))
    }

    pub fn navigate(&self, target: NavigationTarget) -> ClientResult<()> {
        let mut emitter = self
            .emitter
            .lock()
            .map_err(|_| ClientError::LockPoisoned("emit"))?;
        debug!(?target, "navigation requested");
        let _ = emitter.emit(NAVIGATE_EVENT, target);
        Ok(())
    }
}
