//! Per-class async locks
//!
//! Writes whose validity depends on a class's enrollment count (enroll,
//! capacity changes) hold that class's lock across check and write. Calls
//! for different classes never contend.
//!
//! An entry lives only while someone holds or waits on it, so the table
//! stays as small as the number of in-flight writes regardless of which
//! class ids callers send.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

type LockTable = HashMap<Uuid, Arc<Mutex<()>>>;

#[derive(Clone, Default)]
pub struct ClassLocks {
    inner: Arc<Mutex<LockTable>>,
}

/// Exclusive access to one class; released on drop
pub struct ClassLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    table: Arc<Mutex<LockTable>>,
    class_id: Uuid,
}

impl ClassLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `class_id`
    ///
    /// The table lock is released before waiting on the class lock.
    pub async fn acquire(&self, class_id: Uuid) -> ClassLockGuard {
        let lock = {
            let mut table = self.inner.lock().await;
            // Entries only the table references are idle
            table.retain(|_, lock| Arc::strong_count(lock) > 1);
            table.entry(class_id).or_default().clone()
        };

        ClassLockGuard {
            guard: Some(lock.lock_owned().await),
            table: Arc::clone(&self.inner),
            class_id,
        }
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

impl Drop for ClassLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Contended table: the next acquire prunes the idle entry instead
        if let Ok(mut table) = self.table.try_lock() {
            let idle = table
                .get(&self.class_id)
                .is_some_and(|lock| Arc::strong_count(lock) == 1);
            if idle {
                table.remove(&self.class_id);
            }
        }
    }
}
