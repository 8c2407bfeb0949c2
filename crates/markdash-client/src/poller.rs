//! Processing poll loop.
//!
//! After a successful upload the server processes the batch
//! asynchronously; this loop queries the status endpoint at a fixed
//! interval until the server reports `ready`, then publishes a refresh
//! signal, notifies the user, and asks the initiating view to show the
//! dashboard. The loop is bounded: it times out after a maximum number
//! of attempts and gives up after too many consecutive query failures,
//! so a stuck backend can never hang a view silently.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use markdash_core::{ClientConfig, ClientError, ProcessingStatus, RefreshToken};

use crate::api::ServerApi;
use crate::events::{EventSender, UiEvent};
use crate::signal::RefreshBus;

#[derive(Clone, Debug)]
pub struct PollerConfig {
    /// Fixed wait between status checks.
    pub interval: Duration,
    /// Maximum status checks before the session times out.
    pub max_attempts: u32,
    /// Consecutive query failures tolerated before giving up. Failures
    /// below the cap are treated as `pending` and retried.
    pub max_transient_errors: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_attempts: 150,
            max_transient_errors: 5,
        }
    }
}

impl From<&ClientConfig> for PollerConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.poll_interval_ms),
            max_attempts: config.poll_max_attempts,
            max_transient_errors: config.poll_max_transient_errors,
        }
    }
}

/// Issues poll session handles. A new session supersedes all earlier
/// ones, guaranteeing at most one poll loop can reach completion.
#[derive(Clone, Default)]
pub struct SessionCounter(Arc<AtomicU64>);

impl SessionCounter {
    pub fn begin(&self) -> Session {
        let id = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        Session {
            counter: Arc::clone(&self.0),
            id,
        }
    }
}

/// Handle for one poll session.
pub struct Session {
    counter: Arc<AtomicU64>,
    id: u64,
}

impl Session {
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.id
    }
}

/// How a poll session ended (short of an error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Server reported `ready`; refresh signal published.
    Ready,
    /// A newer session started; this one exited without side effects.
    Superseded,
}

pub struct ProcessingPoller<A: ServerApi + ?Sized> {
    api: Arc<A>,
    bus: RefreshBus,
    config: PollerConfig,
    events: EventSender,
}

impl<A: ServerApi + ?Sized> ProcessingPoller<A> {
    pub fn new(api: Arc<A>, bus: RefreshBus, config: PollerConfig, events: EventSender) -> Self {
        Self {
            api,
            bus,
            config,
            events,
        }
    }

    /// Run the poll loop until `ready`, timeout, or supersession.
    ///
    /// Terminal on `ready`: the loop never re-enters; a fresh submit
    /// starts a new session.
    pub async fn run(&self, session: Session) -> Result<PollOutcome, ClientError> {
        let _ = self.events.send(UiEvent::info("Processing uploaded PDFs..."));

        let mut consecutive_errors = 0u32;
        for attempt in 1..=self.config.max_attempts {
            if !session.is_current() {
                tracing::debug!(attempt, "Poll session superseded, exiting");
                return Ok(PollOutcome::Superseded);
            }

            match self.api.processing_status().await {
                Ok(ProcessingStatus::Ready) => {
                    if !session.is_current() {
                        return Ok(PollOutcome::Superseded);
                    }
                    return self.complete(attempt);
                }
                Ok(ProcessingStatus::Pending) => {
                    consecutive_errors = 0;
                    tracing::trace!(attempt, "Processing still pending");
                }
                Err(e) => {
                    consecutive_errors += 1;
                    tracing::warn!(
                        error = %e,
                        attempt,
                        consecutive_errors,
                        "Status query failed, treating as pending"
                    );
                    if consecutive_errors >= self.config.max_transient_errors {
                        let err = ClientError::PollingFailed {
                            consecutive_errors,
                            source: e,
                        };
                        let _ = self.events.send(UiEvent::error(err.client_message()));
                        return Err(err);
                    }
                }
            }

            // No wait after the final attempt; the timeout is already due.
            if attempt < self.config.max_attempts {
                sleep(self.config.interval).await;
            }
        }

        let err = ClientError::ProcessingTimeout {
            attempts: self.config.max_attempts,
        };
        tracing::error!(attempts = self.config.max_attempts, "Processing poll timed out");
        let _ = self.events.send(UiEvent::error(err.client_message()));
        Err(err)
    }

    fn complete(&self, attempts: u32) -> Result<PollOutcome, ClientError> {
        tracing::info!(attempts, "Processing complete, publishing refresh signal");
        self.bus
            .publish(RefreshToken::now())
            .map_err(|e| ClientError::Signal(e.to_string()))?;
        let _ = self
            .events
            .send(UiEvent::success("Processing complete! Redirecting..."));
        let _ = self.events.send(UiEvent::NavigateToOverview);
        Ok(PollOutcome::Ready)
    }
}
