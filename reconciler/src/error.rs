//! Error types for the reconciler

use crate::feed::FeedKind;
use momo_protocol::SchemaVersion;
use thiserror::Error;

/// Result type for reconciler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reconciler errors
#[derive(Error, Debug)]
pub enum Error {
    /// Neither API generation served the feed
    #[error("{feed} feed unavailable (v2: {v2_error}; v1: {v1_error})")]
    FeedUnavailable {
        /// Feed that failed
        feed: FeedKind,
        /// V2 failure
        v2_error: String,
        /// V1 failure
        v1_error: String,
    },

    /// One fetch of one feed failed
    #[error("{feed} {version} fetch failed: {reason}")]
    Feed {
        /// Feed
        feed: FeedKind,
        /// Generation requested
        version: SchemaVersion,
        /// Failure reason
        reason: String,
    },

    /// Snapshot file error
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] std::io::Error),

    /// Transport or gateway error
    #[error("Adapter error: {0}")]
    Adapter(#[from] momo_adapters::Error),

    /// Feed payload did not normalize
    #[error("Protocol error: {0}")]
    Protocol(#[from] momo_protocol::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
