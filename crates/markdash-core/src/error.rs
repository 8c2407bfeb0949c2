//! Error types module
//!
//! Unified error taxonomy for the upload/refresh pipeline. Validation-class
//! errors (`WrongFileType`, `EmptyBatch`, `NoSelection`) are resolved at the
//! orchestration layer and never reach the network; the remaining variants
//! surface as user-visible notifications and leave local state retryable.

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("No PDF files in selection")]
    WrongFileType,

    #[error("No files queued for upload")]
    EmptyBatch,

    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    #[error("Processing did not complete after {attempts} status checks")]
    ProcessingTimeout { attempts: u32 },

    #[error("Status polling failed after {consecutive_errors} consecutive errors")]
    PollingFailed {
        consecutive_errors: u32,
        #[source]
        source: anyhow::Error,
    },

    #[error("No files selected for deletion")]
    NoSelection,

    #[error("Delete rejected: {0}")]
    DeleteFailed(String),

    #[error("Refresh signal error: {0}")]
    Signal(String),

    #[error("API error")]
    Api {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for ClientError {
    fn from(err: anyhow::Error) -> Self {
        ClientError::Api {
            message: err.to_string(),
            source: err,
        }
    }
}

impl ClientError {
    /// Errors resolved entirely at the orchestration layer, before any
    /// network call is issued.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ClientError::WrongFileType | ClientError::EmptyBatch | ClientError::NoSelection
        )
    }

    /// Whether the user can retry the failed action without losing state.
    /// Only a processing timeout is terminal for the current session; a
    /// fresh submit starts a new one.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ClientError::ProcessingTimeout { .. })
    }

    /// User-facing message (toast text). May differ from the internal
    /// display form for variants carrying sources.
    pub fn client_message(&self) -> String {
        match self {
            ClientError::WrongFileType => "Please upload PDF files only".to_string(),
            ClientError::EmptyBatch => "Please select at least one PDF file".to_string(),
            ClientError::UploadRejected(reason) => reason.clone(),
            ClientError::ProcessingTimeout { .. } => {
                "Processing is taking too long; try again later".to_string()
            }
            ClientError::PollingFailed { .. } => {
                "Lost contact with the server while waiting for processing".to_string()
            }
            ClientError::NoSelection => "Select at least one file to delete".to_string(),
            ClientError::DeleteFailed(reason) => reason.clone(),
            ClientError::Signal(_) => "Could not notify other views of the change".to_string(),
            ClientError::Api { message, .. } => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_never_reach_network() {
        assert!(ClientError::WrongFileType.is_validation());
        assert!(ClientError::EmptyBatch.is_validation());
        assert!(ClientError::NoSelection.is_validation());
        assert!(!ClientError::UploadRejected("bad".into()).is_validation());
        assert!(!ClientError::DeleteFailed("bad".into()).is_validation());
    }

    #[test]
    fn upload_rejected_preserves_server_reason() {
        let err = ClientError::UploadRejected("quota exceeded".to_string());
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "quota exceeded");
    }

    #[test]
    fn processing_timeout_is_terminal() {
        let err = ClientError::ProcessingTimeout { attempts: 150 };
        assert!(!err.is_recoverable());
    }

    #[test]
    fn api_error_wraps_anyhow_source() {
        let err: ClientError = anyhow::anyhow!("connection refused").into();
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "connection refused");
    }
}
