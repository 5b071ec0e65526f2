use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-URI async locks.
///
/// Idle cells (no holder, no waiter) are pruned on every acquisition, so the
/// table only grows with the number of URIs under contention.
#[derive(Debug, Default)]
pub(crate) struct UriLocks {
    table: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UriLocks {
    pub(crate) async fn lock(&self, uri: &str) -> OwnedMutexGuard<()> {
        let cell = {
            let mut table = self.table.lock().expect("lock poisoned");
            table.retain(|_, cell| Arc::strong_count(cell) > 1);
            Arc::clone(table.entry(uri.to_string()).or_default())
        };
        cell.lock_owned().await
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.table.lock().expect("lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_uri_is_exclusive() {
        let locks = Arc::new(UriLocks::default());
        let guard = locks.lock("http://ex/r1").await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock("http://ex/r1").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_uris_do_not_block() {
        let locks = UriLocks::default();
        let _a = locks.lock("http://ex/a").await;
        let _b = locks.lock("http://ex/b").await;
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn idle_cells_are_pruned() {
        let locks = UriLocks::default();
        drop(locks.lock("http://ex/a").await);
        drop(locks.lock("http://ex/b").await);
        let _c = locks.lock("http://ex/c").await;
        assert_eq!(locks.len(), 1);
    }
}
