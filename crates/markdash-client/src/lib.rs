//! Markdash client orchestration.
//!
//! Implements the asynchronous upload-process-refresh pipeline: batch
//! validation, submission, the bounded processing poll loop, the
//! cross-process refresh signal bus, the refreshable overview data
//! source, and the selection/bulk-delete client. Views stay decoupled:
//! one context publishes a refresh token, every other mounted context
//! refetches.

pub mod api;
pub mod data_source;
pub mod events;
pub mod poller;
pub mod selection;
pub mod signal;
pub mod uploader;
pub mod validator;

// Re-export commonly used types
pub use api::ServerApi;
pub use data_source::{OverviewDataSource, Snapshot};
pub use events::{Toast, ToastLevel, UiEvent};
pub use poller::{PollOutcome, PollerConfig, ProcessingPoller, Session, SessionCounter};
pub use selection::SelectionClient;
pub use signal::{RefreshBus, SignalError, Subscription};
pub use uploader::{UploadOrchestrator, UploadState};
pub use validator::BatchValidator;
