//! Markdash Core Library
//!
//! This crate provides the domain models, error taxonomy, and configuration
//! shared across all Markdash components.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::ClientError;
pub use models::{
    DepartmentCount, OverviewMetrics, PendingFile, ProcessingStatus, RefreshToken,
};
