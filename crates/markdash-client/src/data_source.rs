//! Refreshable overview data source.
//!
//! Re-fetches the aggregate metrics whenever a refresh token arrives,
//! regardless of who published it. State is exposed through a tokio
//! watch channel so any number of views can observe the same snapshot.
//! There is no request cancellation; responses are sequenced so a slow
//! stale response never overwrites a fresher one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use markdash_core::{OverviewMetrics, RefreshToken};

use crate::api::ServerApi;
use crate::signal::Subscription;

/// Observable fetch state: `data` is replaced wholesale on success and
/// kept (stale but present) on failure, so transient errors never blank
/// out a rendered view.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

pub struct OverviewDataSource<A: ServerApi + ?Sized> {
    api: Arc<A>,
    state: watch::Sender<Snapshot<OverviewMetrics>>,
    seq: AtomicU64,
}

impl<A: ServerApi + ?Sized> OverviewDataSource<A> {
    pub fn new(api: Arc<A>) -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        Self {
            api,
            state,
            seq: AtomicU64::new(0),
        }
    }

    /// Observe fetch state changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<OverviewMetrics>> {
        self.state.subscribe()
    }

    /// Current fetch state.
    pub fn snapshot(&self) -> Snapshot<OverviewMetrics> {
        self.state.borrow().clone()
    }

    /// Fetch the metrics for `token`. Sets `loading` for the duration;
    /// on success replaces `data` and clears `error`, on failure records
    /// `error` and keeps the previous `data`. If a newer refresh was
    /// dispatched while this one was in flight, its completion owns the
    /// final state and this response is discarded.
    pub async fn refresh(&self, token: RefreshToken) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| s.loading = true);
        tracing::debug!(token = %token, "Refreshing overview metrics");

        let result = self.api.fetch_overview(token).await;

        if self.seq.load(Ordering::SeqCst) != seq {
            tracing::debug!(token = %token, "Discarding stale overview response");
            return;
        }

        self.state.send_modify(|s| {
            s.loading = false;
            match result {
                Ok(metrics) => {
                    s.data = Some(metrics);
                    s.error = None;
                }
                Err(e) => {
                    s.error = Some(e.to_string());
                }
            }
        });
    }

    /// Drive refreshes from a signal bus subscription. Runs until the
    /// subscription's bus side is gone or the task is aborted.
    pub fn spawn_bus_listener(self: Arc<Self>, mut subscription: Subscription) -> JoinHandle<()>
    where
        A: 'static,
    {
        tokio::spawn(async move {
            while let Some(token) = subscription.recv().await {
                self.refresh(token).await;
            }
        })
    }
}
