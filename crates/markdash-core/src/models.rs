//! Domain models shared across the client, API client, and CLI.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A file queued for upload but not yet submitted.
///
/// Identity within a batch is the `name` field (case-sensitive, exact
/// match); no two pending files in the same batch share a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl PendingFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            content,
        }
    }
}

/// Server-side processing state for the most recent upload.
///
/// Only these two states are modeled; errors while querying are treated
/// as retryable by the poller, not as a third state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    Ready,
}

impl ProcessingStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ProcessingStatus::Ready)
    }
}

/// Opaque change-detection token carried by the refresh signal slot.
///
/// The value is a millisecond timestamp, but subscribers only compare
/// tokens for identity; a newer signal supersedes an older intent to
/// refetch, nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken(pub i64);

impl RefreshToken {
    /// Token for the current instant.
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    /// Parse the textual slot contents. Malformed values yield `None`
    /// and must be discarded by the caller rather than propagated.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().map(Self)
    }
}

impl fmt::Display for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-department student count as reported by the overview endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentCount {
    pub department: String,
    pub total_students: u64,
}

/// Aggregate metrics rendered by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewMetrics {
    pub total_students: u64,
    pub total_departments: u64,
    pub avg_marks: f64,
    pub students_per_department: Vec<DepartmentCount>,
}

impl OverviewMetrics {
    /// Average number of students per department, or zero when no
    /// departments exist.
    pub fn avg_students_per_department(&self) -> f64 {
        if self.total_departments == 0 {
            0.0
        } else {
            self.total_students as f64 / self.total_departments as f64
        }
    }
}
