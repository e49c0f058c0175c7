use std::{sync::Arc, time::Duration};
use tokio::{
    sync::Notify,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::debug;

use super::{Snapshot, Tracker};
use crate::fetch::Fetch;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3600);
pub const DEFAULT_RECOMPUTE_INTERVAL: Duration = Duration::from_secs(300);

/// Refresh from `url` now and then every `every`. A failed refresh waits for
/// the next tick; a successful one wakes `updated`.
pub fn spawn_refresh_task<F>(
    tracker: Arc<Tracker>,
    fetcher: Arc<F>,
    url: String,
    every: Duration,
    updated: Arc<Notify>,
) -> JoinHandle<()>
where
    F: Fetch + 'static,
{
    tokio::spawn(async move {
        let mut ticker = time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if tracker.refresh(fetcher.as_ref(), &url).await {
                updated.notify_one();
            }
        }
    })
}

/// Hand a fresh [`Snapshot`] to `sink` now, every `every`, and whenever
/// `updated` fires.
pub fn spawn_recompute_task<S>(
    tracker: Arc<Tracker>,
    every: Duration,
    updated: Arc<Notify>,
    mut sink: S,
) -> JoinHandle<()>
where
    S: FnMut(Snapshot) + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => debug!("recompute tick"),
                _ = updated.notified() => debug!("recompute after refresh"),
            }
            sink(tracker.snapshot());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::tests::{feed, StubFetcher};
    use anyhow::anyhow;
    use tokio::sync::mpsc;

    const ROW: &str = "World,OWID_WRL,2021-03-10,1,1000000,1,1,14400,1,10.0,2.0,1000";

    #[tokio::test(start_paused = true)]
    async fn test_refresh_runs_immediately_then_on_interval() {
        let tracker = Arc::new(Tracker::default());
        let fetcher = Arc::new(StubFetcher::with(vec![
            Err(anyhow!("offline")),
            Ok(feed(&[ROW])),
        ]));
        let updated = Arc::new(Notify::new());

        let handle = spawn_refresh_task(
            Arc::clone(&tracker),
            Arc::clone(&fetcher),
            "stub://feed".into(),
            Duration::from_secs(3600),
            Arc::clone(&updated),
        );

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(*fetcher.calls.lock().unwrap(), 1);
        assert_eq!(tracker.latest().date, "Never");

        time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(*fetcher.calls.lock().unwrap(), 2);
        assert_eq!(tracker.latest().date, "2021-03-10");

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_recompute_renders_on_tick_and_after_refresh() {
        let tracker = Arc::new(Tracker::default());
        let fetcher = Arc::new(StubFetcher::with(vec![Ok(feed(&[ROW]))]));
        let updated = Arc::new(Notify::new());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let render = spawn_recompute_task(
            Arc::clone(&tracker),
            Duration::from_secs(300),
            Arc::clone(&updated),
            move |snap| {
                let _ = tx.send(snap);
            },
        );

        // empty state first
        let first = rx.recv().await.unwrap();
        assert_eq!(first.last_updated, "Never");
        assert_eq!(first.estimated_percentage, "--%");

        let refresh = spawn_refresh_task(
            Arc::clone(&tracker),
            fetcher,
            "stub://feed".into(),
            Duration::from_secs(3600),
            Arc::clone(&updated),
        );

        let second = rx.recv().await.unwrap();
        assert_eq!(second.last_updated, "2021-03-10");
        assert_eq!(second.percentage, "10.00%");

        let third = rx.recv().await.unwrap();
        assert_eq!(third.location, "World");

        refresh.abort();
        render.abort();
    }
}
