//! Mount lifetime of a controller.
//!
//! A view creates its controller on mount and hands the [`UnmountHandle`] to
//! whatever tears the view down. Once unmounted, responses that are still in
//! flight resolve into `ClientError::Unmounted` instead of being reconciled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct Mount {
    unmounted: Arc<AtomicBool>,
}

impl Mount {
    /// A fresh, mounted lifetime.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancellation hook sharing this lifetime.
    pub fn handle(&self) -> UnmountHandle {
        UnmountHandle {
            unmounted: Arc::clone(&self.unmounted),
        }
    }

    pub fn is_mounted(&self) -> bool {
        !self.unmounted.load(Ordering::Acquire)
    }

    /// `Err(Unmounted)` once the handle has fired.
    pub fn ensure_mounted(&self) -> ClientResult<()> {
        if self.is_mounted() {
            Ok(())
        } else {
            Err(ClientError::Unmounted)
        }
    }
}

/// Cloneable cancellation hook for one controller instance.
#[derive(Debug, Clone)]
pub struct UnmountHandle {
    unmounted: Arc<AtomicBool>,
}

impl UnmountHandle {
    pub fn unmount(&self) {
        self.unmounted.store(true, Ordering::Release);
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_unmounts_owner() {
        let mount = Mount::new();
        let handle = mount.handle();
        assert!(mount.ensure_mounted().is_ok());

        handle.clone().unmount();
        assert!(handle.is_unmounted());
        assert!(!mount.is_mounted());
        assert_eq!(mount.ensure_mounted(), Err(ClientError::Unmounted));
    }
}
