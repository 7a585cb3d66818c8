//! Run supersession and auto-refresh
//!
//! Owns the latest published snapshot behind a watch channel. Every refresh
//! bumps a run generation before it starts; a run only publishes its tree if
//! its generation is still current when it finishes, so a superseded run can
//! never overwrite results from a newer one. Auto-refresh on an interval is
//! just a new run.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::aggregator::run_health_check;
use crate::catalog::Catalog;
use crate::progress::Progress;
use crate::types::HealthSnapshot;
use crate::validator::LinkChecker;

pub struct HealthMonitor<C, L> {
    catalog: Arc<C>,
    checker: Arc<L>,
    progress_tx: watch::Sender<Arc<Progress>>,
    generation: AtomicU64,
    snapshot_tx: watch::Sender<Option<HealthSnapshot>>,
}

impl<C, L> HealthMonitor<C, L>
where
    C: Catalog + 'static,
    L: LinkChecker + 'static,
{
    pub fn new(catalog: Arc<C>, checker: Arc<L>) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        let (progress_tx, _) = watch::channel(Arc::new(Progress::new()));
        Self { catalog, checker, progress_tx, generation: AtomicU64::new(0), snapshot_tx }
    }

    /// Subscribe to the progress counter of the current run. Every refresh
    /// owns a fresh counter and publishes it here when it starts, so a
    /// superseded run keeps mutating only its own.
    pub fn subscribe_progress(&self) -> watch::Receiver<Arc<Progress>> {
        self.progress_tx.subscribe()
    }

    /// Subscribe to published snapshots. `None` until the first run lands.
    pub fn subscribe(&self) -> watch::Receiver<Option<HealthSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Run a fresh health check. The result is published only if no newer
    /// refresh started while this one was in flight.
    pub async fn refresh(&self) -> HealthSnapshot {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let progress = Arc::new(Progress::new());
        let _ = self.progress_tx.send(progress.clone());

        let snapshot =
            run_health_check(self.catalog.as_ref(), self.checker.as_ref(), progress.as_ref())
                .await;

        if self.generation.load(Ordering::SeqCst) == generation {
            let _ = self.snapshot_tx.send(Some(snapshot.clone()));
        }
        snapshot
    }

    /// Kick off a refresh without waiting for it.
    pub fn spawn_refresh(self: &Arc<Self>) {
        let monitor = self.clone();
        tokio::spawn(async move {
            monitor.refresh().await;
        });
    }

    /// Refresh on a fixed cadence until the task is dropped.
    pub async fn run_auto_refresh(self: Arc<Self>, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        // First tick fires immediately; skip it so the caller's initial
        // refresh is not doubled.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            self.refresh().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CheckOutcome, ClassInfo, DayContent, DayInfo, SectionInfo};
    use crate::validator::LinkKind;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixtureCatalog {
        sections: Mutex<Vec<SectionInfo>>,
        days_delay: Duration,
    }

    #[async_trait]
    impl Catalog for FixtureCatalog {
        async fn list_sections(&self) -> Result<Vec<SectionInfo>> {
            Ok(self.sections.lock().unwrap().clone())
        }

        async fn list_classes(&self, _section_id: i64) -> Result<Vec<ClassInfo>> {
            Ok(vec![ClassInfo { id: 1, name: "Class 1".to_string() }])
        }

        async fn list_days(&self, _class_id: i64) -> Result<Vec<DayInfo>> {
            if !self.days_delay.is_zero() {
                tokio::time::sleep(self.days_delay).await;
            }
            Ok(vec![DayInfo {
                id: 1,
                day_number: 1,
                topic: None,
                quiz_link: Some("https://example.com/quiz".to_string()),
                project_link: None,
            }])
        }

        async fn day_content(&self, _day_id: i64) -> Result<DayContent> {
            Ok(DayContent::default())
        }
    }

    struct FixtureChecker {
        delay: Mutex<Duration>,
    }

    #[async_trait]
    impl LinkChecker for FixtureChecker {
        async fn check(&self, _url: &str, _kind: LinkKind) -> CheckOutcome {
            let delay = *self.delay.lock().unwrap();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            CheckOutcome::working(200)
        }
    }

    fn monitor_with(
        section_name: &str,
        check_delay: Duration,
        days_delay: Duration,
    ) -> (Arc<HealthMonitor<FixtureCatalog, FixtureChecker>>, Arc<FixtureCatalog>) {
        let catalog = Arc::new(FixtureCatalog {
            sections: Mutex::new(vec![SectionInfo { id: 1, name: section_name.to_string() }]),
            days_delay,
        });
        let checker = Arc::new(FixtureChecker { delay: Mutex::new(check_delay) });
        (Arc::new(HealthMonitor::new(catalog.clone(), checker)), catalog)
    }

    #[tokio::test]
    async fn test_refresh_publishes_snapshot() {
        let (monitor, _) = monitor_with("grad", Duration::ZERO, Duration::ZERO);
        let rx = monitor.subscribe();
        assert!(rx.borrow().is_none());

        monitor.refresh().await;
        let published = rx.borrow().clone().expect("snapshot published");
        assert_eq!(published.sections.len(), 1);
        assert_eq!(published.sections[0].section_name, "grad");
    }

    #[tokio::test]
    async fn test_superseded_run_does_not_publish() {
        let (monitor, catalog) = monitor_with("before", Duration::from_millis(200), Duration::ZERO);

        // Slow run starts against the old catalog contents.
        let slow = {
            let monitor = monitor.clone();
            tokio::spawn(async move { monitor.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        // A newer, fast run supersedes it.
        catalog.sections.lock().unwrap()[0].name = "after".to_string();
        let fast = monitor.refresh().await;
        assert_eq!(fast.sections[0].section_name, "after");

        // Let the stale run finish; its tree must not replace the new one.
        slow.await.unwrap();
        let published = monitor.subscribe().borrow().clone().unwrap();
        assert_eq!(published.sections[0].section_name, "after");
    }

    #[tokio::test]
    async fn test_superseded_run_keeps_its_own_progress_counter() {
        let (monitor, _) = monitor_with("grad", Duration::ZERO, Duration::from_millis(200));

        // Stale run stalls while listing days, with scheduled tasks still
        // left to complete.
        let stale = {
            let monitor = monitor.clone();
            tokio::spawn(async move { monitor.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        // The newer run takes over the published counter.
        let rx = monitor.subscribe_progress();
        monitor.refresh().await;
        stale.await.unwrap();

        // 1 sections fetch + 1 section + 1 class + 1 day. The stale run's
        // late completions land on its own counter, not this one.
        let snap = rx.borrow().snapshot();
        assert_eq!(snap.total, 4);
        assert_eq!(snap.completed, 4);
    }
}
