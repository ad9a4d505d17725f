//! Retention scheduler: periodic cleanup of old messages.

use recap_memory::Store;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Run one cleanup pass. Errors are logged, never propagated.
pub(super) async fn sweep_once(store: &Store, days: u32) -> Option<u64> {
    match store.cleanup(days).await {
        Ok(deleted) => {
            if deleted > 0 {
                info!("retention: deleted {deleted} messages older than {days} days");
            }
            Some(deleted)
        }
        Err(e) => {
            error!("retention: cleanup failed: {e}");
            None
        }
    }
}

/// Sweep every `interval` until `cancel` fires.
///
/// Cancellation is only checked between sweeps so a running cleanup
/// transaction always completes.
pub(super) async fn retention_loop(
    store: Store,
    days: u32,
    interval: Duration,
    cancel: CancellationToken,
) {
    info!(
        "retention: keeping {days} days, sweeping every {}s",
        interval.as_secs()
    );
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
        sweep_once(&store, days).await;
    }
    info!("retention: stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use recap_core::config::MemoryConfig;

    async fn test_store() -> (Store, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = MemoryConfig {
            db_path: dir.path().join("test.db").to_string_lossy().into_owned(),
        };
        (Store::new(&config).await.unwrap(), dir)
    }

    #[tokio::test]
    async fn test_sweep_once_deletes_old_rows() {
        let (store, _dir) = test_store().await;
        let old = Utc::now() - ChronoDuration::days(40);
        store.save(1, Some("a"), "old", -1, Some(old)).await.unwrap();
        store.save(1, Some("a"), "new", -1, None).await.unwrap();

        assert_eq!(sweep_once(&store, 30).await, Some(1));
        assert_eq!(sweep_once(&store, 30).await, Some(0));
        assert_eq!(store.count(None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_loop_sweeps_and_stops_on_cancel() {
        let (store, _dir) = test_store().await;
        let old = Utc::now() - ChronoDuration::days(40);
        store.save(1, Some("a"), "old", -1, Some(old)).await.unwrap();

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(retention_loop(
            store.clone(),
            30,
            Duration::from_millis(10),
            cancel.clone(),
        ));

        let mut remaining = 1;
        for _ in 0..100 {
            remaining = store.count(None).await.unwrap();
            if remaining == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(remaining, 0);

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_loop_survives_storage_failure() {
        let (store, _dir) = test_store().await;
        store.close().await;
        assert_eq!(sweep_once(&store, 30).await, None);

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(retention_loop(
            store,
            30,
            Duration::from_millis(5),
            cancel.clone(),
        ));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!handle.is_finished());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
