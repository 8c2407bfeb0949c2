//! Cross-context refresh signal bus.
//!
//! A durable key-value slot plus change notification: publishers write
//! the latest refresh token to a well-known file; subscribers in any
//! process of the same machine watch that file and receive the token
//! asynchronously. A context that mounts after a publish still discovers
//! the latest token through a one-time read at subscribe time.
//!
//! Delivery is hybrid: a file watcher for instant updates, with a slow
//! poll fallback for missed events or platforms where watching fails.
//! The publishing handle suppresses its own notifications; publishers
//! refresh their local state explicitly instead.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config as NotifyConfig, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use markdash_core::{ClientConfig, RefreshToken};

/// Sentinel for "this handle has not published yet".
const NO_TOKEN: i64 = i64::MIN;

#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("Failed to write signal slot {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to prepare signal slot directory {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Handle to the shared refresh signal slot.
///
/// Clones share the same publisher identity: a subscription created from
/// a handle never sees tokens published through that handle or its
/// clones. Separate [`RefreshBus::new`] instances on the same path act
/// as independent contexts, as do other processes.
#[derive(Clone)]
pub struct RefreshBus {
    path: PathBuf,
    fallback_poll: Duration,
    last_published: Arc<AtomicI64>,
}

impl RefreshBus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fallback_poll: Duration::from_secs(5),
            last_published: Arc::new(AtomicI64::new(NO_TOKEN)),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.signal_path.clone())
            .with_fallback_poll(Duration::from_secs(config.bus_fallback_poll_secs))
    }

    /// Override the slow-poll fallback interval (primarily for tests).
    pub fn with_fallback_poll(mut self, interval: Duration) -> Self {
        self.fallback_poll = interval;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `token` to the slot. Last write wins; the slot carries only
    /// a change-detection token, so writers do not coordinate further.
    pub fn publish(&self, token: RefreshToken) -> Result<(), SignalError> {
        // Record before writing so the watcher task never delivers our
        // own token between the write and the bookkeeping.
        self.last_published.store(token.0, Ordering::SeqCst);

        let parent = slot_parent(&self.path)?;
        fs::create_dir_all(parent).map_err(|source| SignalError::Prepare {
            path: parent.to_path_buf(),
            source,
        })?;

        // Write-then-rename so readers never observe a partial token.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, token.to_string()).map_err(|source| SignalError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| SignalError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(token = %token, path = %self.path.display(), "Published refresh signal");
        Ok(())
    }

    /// Read the slot's current token. Missing or malformed contents are
    /// discarded, never propagated.
    pub fn read_current(&self) -> Option<RefreshToken> {
        read_slot(&self.path)
    }

    /// Subscribe to slot changes.
    ///
    /// Delivers the current token once at mount time (if one exists and
    /// was not published by this handle), then every change made by other
    /// contexts. Rapid consecutive changes may be coalesced; at most one
    /// delivery per token value. Unsubscribe by dropping the returned
    /// [`Subscription`].
    pub fn subscribe(&self) -> Result<Subscription, SignalError> {
        let parent = slot_parent(&self.path)?.to_path_buf();
        fs::create_dir_all(&parent).map_err(|source| SignalError::Prepare {
            path: parent.clone(),
            source,
        })?;

        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<()>();

        // Watch the parent directory: the slot is replaced by rename, so
        // a watch on the file itself would be dropped at the first publish.
        let watcher = {
            let tx = event_tx.clone();
            match RecommendedWatcher::new(
                move |res: notify::Result<notify::Event>| {
                    if res.is_ok() {
                        let _ = tx.send(());
                    }
                },
                NotifyConfig::default(),
            ) {
                Ok(mut w) => match w.watch(&parent, RecursiveMode::NonRecursive) {
                    Ok(()) => Some(w),
                    Err(e) => {
                        tracing::warn!(error = %e, path = %parent.display(),
                            "Signal watch failed, relying on slow poll");
                        None
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Signal watcher unavailable, relying on slow poll");
                    None
                }
            }
        };

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let path = self.path.clone();
        let last_published = Arc::clone(&self.last_published);
        let mut last_delivered: Option<RefreshToken> = None;

        // Read-on-mount: a late subscriber still learns the latest token.
        if let Some(token) = read_slot(&path) {
            if token.0 != last_published.load(Ordering::SeqCst) {
                let _ = out_tx.send(token);
                last_delivered = Some(token);
            }
        }

        let fallback = self.fallback_poll;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(fallback);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    event = event_rx.recv() => {
                        if event.is_none() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {}
                }

                let Some(token) = read_slot(&path) else {
                    continue;
                };
                if token.0 == last_published.load(Ordering::SeqCst) {
                    // Same-writer suppression.
                    continue;
                }
                if last_delivered == Some(token) {
                    continue;
                }
                if out_tx.send(token).is_err() {
                    break;
                }
                last_delivered = Some(token);
            }
        });

        Ok(Subscription {
            rx: out_rx,
            _event_tx: event_tx,
            _watcher: watcher,
        })
    }
}

fn slot_parent(path: &Path) -> Result<&Path, SignalError> {
    path.parent().ok_or_else(|| SignalError::Prepare {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "signal path has no parent"),
    })
}

fn read_slot(path: &Path) -> Option<RefreshToken> {
    let raw = fs::read_to_string(path).ok()?;
    let token = RefreshToken::parse(&raw);
    if token.is_none() {
        tracing::debug!(path = %path.display(), "Ignoring malformed signal slot contents");
    }
    token
}

/// Live subscription to the signal slot. Dropping it unsubscribes.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<RefreshToken>,
    // Keeps the forwarding task alive while no watcher events arrive.
    _event_tx: mpsc::UnboundedSender<()>,
    _watcher: Option<RecommendedWatcher>,
}

impl Subscription {
    /// Wait for the next delivered token.
    pub async fn recv(&mut self) -> Option<RefreshToken> {
        self.rx.recv().await
    }

    /// Non-blocking check for an already-delivered token.
    pub fn try_recv(&mut self) -> Option<RefreshToken> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    fn bus_at(dir: &Path) -> RefreshBus {
        RefreshBus::new(dir.join("refresh-signal")).with_fallback_poll(Duration::from_millis(25))
    }

    #[test]
    fn read_current_of_missing_slot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(bus_at(dir.path()).read_current(), None);
    }

    #[test]
    fn publish_then_read_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let bus = bus_at(dir.path());
        let token = RefreshToken(1234);
        bus.publish(token).unwrap();
        assert_eq!(bus.read_current(), Some(token));
    }

    #[test]
    fn malformed_slot_contents_are_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let bus = bus_at(dir.path());
        fs::write(bus.path(), "definitely-not-a-token").unwrap();
        assert_eq!(bus.read_current(), None);
    }

    #[tokio::test]
    async fn subscriber_receives_publish_from_other_context() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = bus_at(dir.path());
        let subscriber = bus_at(dir.path());

        let mut sub = subscriber.subscribe().unwrap();
        publisher.publish(RefreshToken(42)).unwrap();

        let delivered = timeout(Duration::from_secs(2), sub.recv()).await.unwrap();
        assert_eq!(delivered, Some(RefreshToken(42)));
    }

    #[tokio::test]
    async fn late_subscriber_sees_latest_token_on_mount() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = bus_at(dir.path());
        publisher.publish(RefreshToken(7)).unwrap();

        let subscriber = bus_at(dir.path());
        let mut sub = subscriber.subscribe().unwrap();
        let delivered = timeout(Duration::from_secs(2), sub.recv()).await.unwrap();
        assert_eq!(delivered, Some(RefreshToken(7)));
    }

    #[tokio::test]
    async fn two_publishes_converge_on_latest_token() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = bus_at(dir.path());
        let subscriber = bus_at(dir.path());

        let mut sub = subscriber.subscribe().unwrap();
        publisher.publish(RefreshToken(1)).unwrap();
        publisher.publish(RefreshToken(2)).unwrap();

        // Intermediate delivery of token 1 is permitted but not required.
        let mut latest = None;
        while let Ok(Some(token)) = timeout(Duration::from_millis(500), sub.recv()).await {
            latest = Some(token);
            if latest == Some(RefreshToken(2)) {
                break;
            }
        }
        assert_eq!(latest, Some(RefreshToken(2)));
    }

    #[tokio::test]
    async fn publisher_does_not_receive_its_own_token() {
        let dir = tempfile::tempdir().unwrap();
        let bus = bus_at(dir.path());

        let mut sub = bus.subscribe().unwrap();
        bus.publish(RefreshToken(99)).unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(sub.try_recv(), None);
    }

    #[tokio::test]
    async fn clone_shares_publisher_identity() {
        let dir = tempfile::tempdir().unwrap();
        let bus = bus_at(dir.path());
        let clone = bus.clone();

        let mut sub = bus.subscribe().unwrap();
        clone.publish(RefreshToken(5)).unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(sub.try_recv(), None);
    }
}
