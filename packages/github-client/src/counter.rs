//! Hourly request accounting shared by every worker using the client.

use std::sync::{Mutex, PoisonError};

/// Counts upstream requests issued since the last reset.
///
/// Owned by the client and handed out as `Arc<RequestCounter>` to the quota
/// worker, which resets it when the wall-clock hour changes.
#[derive(Debug, Default)]
pub struct RequestCounter {
    count: Mutex<u64>,
}

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one request and return the updated count.
    pub fn increment(&self) -> u64 {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count += 1;
        *count
    }

    pub fn get(&self) -> u64 {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reset to zero, returning the count of the window that just closed.
    pub fn reset(&self) -> u64 {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *count)
    }
}
