use mesabot_core::SessionStore;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Periodically drop sessions idle for at least `idle_timeout`.
///
/// Abandoned dialogues otherwise stay in the store for the life of the
/// process. The task runs until aborted.
pub fn spawn_idle_sweeper<S>(store: S, idle_timeout: Duration, interval: Duration) -> JoinHandle<()>
where
    S: SessionStore + 'static,
{
    let period = interval.max(MIN_INTERVAL);
    info!(
        "Idle session sweeper enabled: timeout {}s, every {}s",
        idle_timeout.as_secs(),
        period.as_secs()
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            match store.evict_idle(idle_timeout).await {
                Ok(count) if count > 0 => {
                    info!("Evicted {count} idle session(s)");
                }
                Ok(_) => {
                    debug!("No idle sessions to evict");
                }
                Err(e) => {
                    warn!("Failed to evict idle sessions: {e:#}");
                }
            }
        }
    })
}
