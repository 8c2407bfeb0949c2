//! Remote service seam.
//!
//! The orchestration components call the marksheet service through this
//! trait; the reqwest [`ApiClient`] implements it for production use and
//! tests substitute scripted mocks.

use anyhow::Result;
use async_trait::async_trait;

use markdash_api_client::ApiClient;
use markdash_core::models::{OverviewMetrics, PendingFile, ProcessingStatus, RefreshToken};

/// Remote operations consumed by the pipeline. One method per endpoint.
#[async_trait]
pub trait ServerApi: Send + Sync {
    /// Submit a batch of files as one multipart request.
    async fn submit_batch(&self, files: &[PendingFile]) -> Result<()>;

    /// Processing state of the most recent upload.
    async fn processing_status(&self) -> Result<ProcessingStatus>;

    /// Names of the files currently accepted by the server.
    async fn list_uploads(&self) -> Result<Vec<String>>;

    /// Bulk delete; returns the server's confirmation message.
    async fn delete_uploads(&self, names: &[String]) -> Result<String>;

    /// Aggregate dashboard metrics.
    async fn fetch_overview(&self, token: RefreshToken) -> Result<OverviewMetrics>;
}

#[async_trait]
impl ServerApi for ApiClient {
    async fn submit_batch(&self, files: &[PendingFile]) -> Result<()> {
        ApiClient::submit_batch(self, files).await
    }

    async fn processing_status(&self) -> Result<ProcessingStatus> {
        ApiClient::processing_status(self).await
    }

    async fn list_uploads(&self) -> Result<Vec<String>> {
        ApiClient::list_uploads(self).await
    }

    async fn delete_uploads(&self, names: &[String]) -> Result<String> {
        ApiClient::delete_uploads(self, names).await
    }

    async fn fetch_overview(&self, token: RefreshToken) -> Result<OverviewMetrics> {
        ApiClient::fetch_overview(self, token).await
    }
}
