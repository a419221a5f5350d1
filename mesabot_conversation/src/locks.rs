//! Per-sender turn serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = Arc<StdMutex<HashMap<String, Arc<Mutex<()>>>>>;

/// One async mutex per sender currently in a turn.
///
/// Two messages from the same sender run one after the other; messages
/// from different senders never contend beyond the short map lookup.
/// Entries are dropped as soon as no turn holds or waits on them, including
/// when a turn is cancelled mid-way.
#[derive(Debug, Default)]
pub struct SenderLocks {
    inner: LockMap,
}

/// Claim on a sender's mutex, held from lookup until the turn ends.
#[derive(Debug)]
struct Lease {
    sender_id: String,
    lock: Arc<Mutex<()>>,
    map: LockMap,
}

impl Drop for Lease {
    fn drop(&mut self) {
        let mut map = lock_map(&self.map);
        // Clones are only handed out under the map lock and each lives in a
        // lease, so two owners (the map and us) means nobody else is waiting.
        if map
            .get(&self.sender_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 2)
        {
            map.remove(&self.sender_id);
        }
    }
}

/// Held for the duration of one sender's turn. Dropping it ends the turn.
#[derive(Debug)]
pub struct SenderGuard {
    // Field order matters: the mutex is released before the lease cleans up.
    _guard: OwnedMutexGuard<()>,
    _lease: Lease,
}

fn lock_map(map: &LockMap) -> MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SenderLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, sender_id: &str) -> SenderGuard {
        let lease = {
            let mut map = lock_map(&self.inner);
            Lease {
                sender_id: sender_id.to_string(),
                lock: Arc::clone(map.entry(sender_id.to_string()).or_default()),
                map: Arc::clone(&self.inner),
            }
        };

        SenderGuard {
            _guard: Arc::clone(&lease.lock).lock_owned().await,
            _lease: lease,
        }
    }

    /// Number of senders with a turn in flight.
    #[must_use]
    pub fn active(&self) -> usize {
        lock_map(&self.inner).len()
    }
}
