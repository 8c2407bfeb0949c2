//! Domain methods for the marksheet service API.
//!
//! Wire shapes match the service handlers: `/api/upload` (multipart),
//! `/api/status`, `/api/uploads/list`, `/api/uploads/delete`,
//! `/api/overview`.

use crate::ApiClient;
use anyhow::{Context, Result};
use markdash_core::models::{OverviewMetrics, PendingFile, ProcessingStatus, RefreshToken};

/// Processing status response: `{"status": "pending"|"ready"}`.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct StatusResponse {
    pub status: ProcessingStatus,
}

/// Upload listing response: `{"files": [...]}`.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ListResponse {
    pub files: Vec<String>,
}

/// Bulk delete response: `{"message": "..."}`.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

impl ApiClient {
    /// Submit a batch of pending files as one multipart request.
    pub async fn submit_batch(&self, files: &[PendingFile]) -> Result<()> {
        let mut form = reqwest::multipart::Form::new();
        for file in files {
            let part = reqwest::multipart::Part::bytes(file.content.clone())
                .file_name(file.name.clone())
                .mime_str(&file.content_type)
                .with_context(|| format!("Invalid content type for {}", file.name))?;
            form = form.part("files", part);
        }

        self.post_multipart("/api/upload", form).await
    }

    /// Query the processing state of the most recent upload.
    pub async fn processing_status(&self) -> Result<ProcessingStatus> {
        let response: StatusResponse = self.get("/api/status", &[]).await?;
        Ok(response.status)
    }

    /// List the files currently accepted by the server.
    pub async fn list_uploads(&self) -> Result<Vec<String>> {
        let response: ListResponse = self.get("/api/uploads/list", &[]).await?;
        Ok(response.files)
    }

    /// Delete the named files in one bulk request. Returns the server's
    /// confirmation message.
    pub async fn delete_uploads(&self, names: &[String]) -> Result<String> {
        let body = serde_json::json!({ "files": names });
        let response: DeleteResponse = self.post_json("/api/uploads/delete", &body).await?;
        Ok(response.message)
    }

    /// Fetch the aggregate dashboard metrics. The refresh token rides
    /// along as a cache-busting query parameter.
    pub async fn fetch_overview(&self, token: RefreshToken) -> Result<OverviewMetrics> {
        self.get("/api/overview", &[("t", token.to_string())]).await
    }
}
