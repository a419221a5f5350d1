use async_trait::async_trait;
use mesabot_core::{ReservationRecord, ReservationSink};
use std::time::Duration;

use crate::retry::retry_with_backoff;

/// Wraps a sink with a bounded number of retries.
pub struct RetryingSink<K> {
    inner: K,
    delays: Vec<Duration>,
}

impl<K: ReservationSink> RetryingSink<K> {
    /// Retry after each delay in `delays`, so at most `delays.len() + 1` attempts.
    #[must_use]
    pub const fn new(inner: K, delays: Vec<Duration>) -> Self {
        Self { inner, delays }
    }

    #[must_use]
    pub const fn inner(&self) -> &K {
        &self.inner
    }
}

#[async_trait]
impl<K: ReservationSink> ReservationSink for RetryingSink<K> {
    async fn append(&self, record: &ReservationRecord) -> anyhow::Result<()> {
        retry_with_backoff(|| self.inner.append(record), &self.delays)
            .await
            .map_err(|e| e.context(format!("gave up after {} attempts", self.delays.len() + 1)))
    }
}
