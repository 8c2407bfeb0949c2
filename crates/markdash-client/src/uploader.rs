//! Upload orchestration.
//!
//! Owns the pending batch. Files enter through the validator, leave on
//! explicit removal or successful submission. Submission is serialized
//! by the `Idle`/`Submitting` state: two simultaneous submit triggers
//! cannot both reach the network. On success the batch is cleared and a
//! poll session starts in the background; the caller does not block on
//! processing completion.

use std::sync::Arc;

use tokio::task::JoinHandle;

use markdash_core::{ClientError, PendingFile};

use crate::api::ServerApi;
use crate::events::{EventSender, UiEvent};
use crate::poller::{PollOutcome, PollerConfig, ProcessingPoller, SessionCounter};
use crate::signal::RefreshBus;
use crate::validator::BatchValidator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Submitting,
}

pub struct UploadOrchestrator<A: ServerApi + ?Sized + 'static> {
    api: Arc<A>,
    bus: RefreshBus,
    validator: BatchValidator,
    poller_config: PollerConfig,
    events: EventSender,
    batch: Vec<PendingFile>,
    state: UploadState,
    sessions: SessionCounter,
    processing: Option<JoinHandle<Result<PollOutcome, ClientError>>>,
}

impl<A: ServerApi + ?Sized + 'static> UploadOrchestrator<A> {
    pub fn new(
        api: Arc<A>,
        bus: RefreshBus,
        validator: BatchValidator,
        poller_config: PollerConfig,
        events: EventSender,
    ) -> Self {
        Self {
            api,
            bus,
            validator,
            poller_config,
            events,
            batch: Vec::new(),
            state: UploadState::Idle,
            sessions: SessionCounter::default(),
            processing: None,
        }
    }

    pub fn batch(&self) -> &[PendingFile] {
        &self.batch
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    /// Validate and queue candidate files. Returns the number of files
    /// added. A rejection surfaces as a user-facing notification and
    /// leaves the batch unchanged.
    pub fn add_files(&mut self, candidates: Vec<PendingFile>) -> Result<usize, ClientError> {
        if self.state == UploadState::Submitting {
            tracing::debug!("add_files ignored while submitting");
            return Ok(0);
        }

        match self.validator.accept(candidates, &self.batch) {
            Ok(accepted) => {
                let added = accepted.len();
                self.batch.extend(accepted);
                tracing::debug!(added, batch_size = self.batch.len(), "Files queued");
                Ok(added)
            }
            Err(err) => {
                let _ = self.events.send(UiEvent::error(err.client_message()));
                Err(err)
            }
        }
    }

    /// Remove a pending file by name. No-op while a submission is in
    /// flight.
    pub fn remove_file(&mut self, name: &str) {
        if self.state == UploadState::Submitting {
            return;
        }
        self.batch.retain(|f| f.name != name);
    }

    /// Submit the batch as one multipart request.
    ///
    /// An empty batch fails with `EmptyBatch` before any network call. On
    /// a rejected upload the batch is preserved for retry. On success the
    /// batch is cleared and the processing poller runs in the background;
    /// use [`take_processing_handle`](Self::take_processing_handle) to
    /// await its outcome. A submit while already submitting is a no-op.
    pub async fn submit(&mut self) -> Result<(), ClientError> {
        if self.state == UploadState::Submitting {
            tracing::debug!("submit ignored, submission already in flight");
            return Ok(());
        }

        if self.batch.is_empty() {
            let err = ClientError::EmptyBatch;
            let _ = self.events.send(UiEvent::error(err.client_message()));
            return Err(err);
        }

        self.state = UploadState::Submitting;
        tracing::info!(files = self.batch.len(), "Submitting upload batch");
        let result = self.api.submit_batch(&self.batch).await;
        self.state = UploadState::Idle;

        match result {
            Err(e) => {
                // Batch preserved so the user can retry.
                let err = ClientError::UploadRejected(e.to_string());
                tracing::warn!(error = %e, "Upload rejected");
                let _ = self.events.send(UiEvent::error(err.client_message()));
                Err(err)
            }
            Ok(()) => {
                self.batch.clear();
                let _ = self
                    .events
                    .send(UiEvent::success("Uploaded successfully! Starting processing..."));

                let poller = ProcessingPoller::new(
                    Arc::clone(&self.api),
                    self.bus.clone(),
                    self.poller_config.clone(),
                    self.events.clone(),
                );
                let session = self.sessions.begin();
                self.processing = Some(tokio::spawn(async move { poller.run(session).await }));
                Ok(())
            }
        }
    }

    /// Handle for the most recently started poll session, if any. The
    /// session runs to completion whether or not the handle is awaited.
    pub fn take_processing_handle(
        &mut self,
    ) -> Option<JoinHandle<Result<PollOutcome, ClientError>>> {
        self.processing.take()
    }
}
