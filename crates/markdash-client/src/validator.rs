//! Batch validation.
//!
//! Filters candidate files before they enter a pending batch: only the
//! accepted document types survive, and names already present in the
//! batch are dropped silently. Pure over its inputs.

use markdash_core::{ClientConfig, ClientError, PendingFile};

pub struct BatchValidator {
    accepted_content_types: Vec<String>,
}

impl BatchValidator {
    pub fn new(accepted_content_types: Vec<String>) -> Self {
        Self {
            accepted_content_types: accepted_content_types
                .into_iter()
                .map(|ct| ct.to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.accepted_content_types.clone())
    }

    fn is_accepted_type(&self, file: &PendingFile) -> bool {
        let normalized = file.content_type.to_lowercase();
        self.accepted_content_types.iter().any(|ct| *ct == normalized)
    }

    /// Validate `candidates` against the current batch.
    ///
    /// Returns `WrongFileType` when no candidate has an accepted content
    /// type. Candidates whose name already appears in `existing` (or
    /// earlier in the same call) are dropped without an error; duplicate
    /// names are a policy choice, not a failure. The returned set may
    /// therefore be empty even on success.
    pub fn accept(
        &self,
        candidates: Vec<PendingFile>,
        existing: &[PendingFile],
    ) -> Result<Vec<PendingFile>, ClientError> {
        let eligible: Vec<PendingFile> = candidates
            .into_iter()
            .filter(|f| self.is_accepted_type(f))
            .collect();

        if eligible.is_empty() {
            return Err(ClientError::WrongFileType);
        }

        let mut accepted: Vec<PendingFile> = Vec::with_capacity(eligible.len());
        for file in eligible {
            let duplicate = existing.iter().any(|e| e.name == file.name)
                || accepted.iter().any(|a| a.name == file.name);
            if duplicate {
                tracing::debug!(name = %file.name, "Dropping duplicate pending file");
                continue;
            }
            accepted.push(file);
        }

        Ok(accepted)
    }
}
