//! # MoMo Reconciler
//!
//! Builds one consistent operator view from two independently versioned
//! gateway feeds:
//! - Operator availability (`/availability`, `/v2/availability`)
//! - Merchant active configuration (`/active-conf`, `/v2/active-conf`)
//!
//! ## Architecture
//!
//! ```text
//!            ┌──────────── tokio::join! ────────────┐
//!   ┌────────▼────────┐                    ┌────────▼────────┐
//!   │ availability    │                    │ active-config   │
//!   │ V2, else V1     │                    │ V2, else V1     │
//!   └────────┬────────┘                    └────────┬────────┘
//!            │        versions differ?              │
//!            └──────► corrective re-fetch ◄─────────┘
//!                             │
//!                  ┌──────────▼──────────┐     ┌───────────────┐
//!                  │ merge with catalog  │────▶│ SnapshotStore │
//!                  │ (conjunction rule)  │     │{feed}_{v}.json│
//!                  └─────────────────────┘     └───────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod catalog;
pub mod error;
pub mod feed;
pub mod merge;
pub mod metrics;
pub mod reconciler;
pub mod snapshot;

pub use catalog::{CatalogCountry, CatalogOperator, CATALOG};
pub use error::{Error, Result};
pub use feed::{FeedKind, FeedPayload};
pub use merge::{merge_catalog, MergedCatalogEntry, MergedCountry};
pub use reconciler::{ConfigurationReconciler, CorrectiveRefetch, ReconciliationReport};
pub use snapshot::{SnapshotPair, SnapshotStore};

/// Snapshot file stem for the availability feed
pub const AVAILABILITY_STEM: &str = "mno_availability";

/// Snapshot file stem for the active-configuration feed
pub const ACTIVE_CONFIG_STEM: &str = "active_conf";
