//! Configuration reconciler
//!
//! One pass fetches both feeds concurrently, repairs version skew with a
//! single corrective re-fetch, merges the result with the static catalog
//! and persists the raw payloads. Nothing is kept between passes.

use crate::{
    catalog::CATALOG,
    feed::{fetch_feed, resolve_feed, FeedKind, FeedPayload},
    merge::{merge_catalog, MergedCountry},
    metrics::{AVAILABLE_OPERATORS, RECONCILIATIONS_TOTAL, VERSION_MISMATCHES_TOTAL},
    snapshot::SnapshotStore,
    Result,
};
use momo_adapters::{GatewayConfig, HttpTransport, Transport};
use momo_protocol::{
    normalizer::{
        group_by_country, normalize_active_config, normalize_availability, AvailabilityIndex,
        CountryAvailability,
    },
    Environment, SchemaVersion,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Outcome of the version-skew repair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum CorrectiveRefetch {
    /// Feeds arrived at the same generation
    #[default]
    None,
    /// Availability re-fetched at the configuration's generation
    Succeeded {
        /// Generation first served
        from: SchemaVersion,
        /// Generation re-fetched
        to: SchemaVersion,
    },
    /// Re-fetch failed; the feeds stay mismatched
    Failed {
        /// Generation first served
        from: SchemaVersion,
        /// Generation attempted
        to: SchemaVersion,
        /// Failure reason
        reason: String,
    },
}

/// Result of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    /// Generation of the availability data used
    pub availability_version: SchemaVersion,
    /// Generation of the active configuration used
    pub config_version: SchemaVersion,
    /// Feeds still disagree after the corrective re-fetch
    pub version_mismatch_detected: bool,
    /// What the skew repair did
    pub corrective_refetch: CorrectiveRefetch,
    /// Merchant name from the active configuration
    pub merchant_name: Option<String>,
    /// Company name from the active configuration
    pub company_name: Option<String>,
    /// Catalog merged with both feeds, per country
    pub merged_catalog: Vec<MergedCountry>,
    /// Normalized availability per country, in feed order
    pub availability: Vec<CountryAvailability>,
    /// Snapshot files replaced during this pass
    pub snapshots_written: Vec<PathBuf>,
}

impl ReconciliationReport {
    /// Number of operators currently offered
    pub fn available_operator_count(&self) -> usize {
        self.merged_catalog.iter().map(|c| c.available().count()).sum()
    }
}

/// Merges the availability and active-configuration feeds
pub struct ConfigurationReconciler {
    transport: Arc<dyn Transport>,
    snapshots: SnapshotStore,
}

impl ConfigurationReconciler {
    /// New reconciler
    pub fn new(transport: Arc<dyn Transport>, snapshots: SnapshotStore) -> Self {
        Self { transport, snapshots }
    }

    /// HTTP transport and snapshot directory from configuration
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(
            Arc::new(transport),
            SnapshotStore::new(config.data_dir.clone()),
        ))
    }

    /// Snapshot store
    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// Run one reconciliation pass.
    ///
    /// Fails with `FeedUnavailable` when either feed is served by neither
    /// generation; earlier snapshots are never substituted.
    pub async fn reconcile(&self, environment: Environment) -> Result<ReconciliationReport> {
        info!(%environment, "Starting reconciliation");

        let transport = self.transport.as_ref();
        let (availability, config) = tokio::join!(
            resolve_feed(transport, FeedKind::Availability, environment),
            resolve_feed(transport, FeedKind::ActiveConfig, environment),
        );

        let (mut availability, config) = match (availability, config) {
            (Ok(a), Ok(c)) => (a, c),
            (Err(e), _) | (_, Err(e)) => {
                RECONCILIATIONS_TOTAL.with_label_values(&["feed_unavailable"]).inc();
                error!(%environment, "Reconciliation failed: {}", e);
                return Err(e);
            }
        };

        let mut snapshots_written = Vec::new();
        self.persist(&availability, &mut snapshots_written).await;
        self.persist(&config, &mut snapshots_written).await;

        let mut corrective_refetch = CorrectiveRefetch::None;
        if availability.version != config.version {
            let from = availability.version;
            let to = config.version;
            warn!(
                availability_version = %from,
                config_version = %to,
                "Feed version mismatch, re-fetching availability"
            );

            match fetch_feed(transport, FeedKind::Availability, to, environment).await {
                Ok(refetched) => {
                    VERSION_MISMATCHES_TOTAL.with_label_values(&["resolved"]).inc();
                    self.persist(&refetched, &mut snapshots_written).await;
                    availability = refetched;
                    corrective_refetch = CorrectiveRefetch::Succeeded { from, to };
                }
                Err(e) => {
                    VERSION_MISMATCHES_TOTAL.with_label_values(&["unresolved"]).inc();
                    warn!(
                        availability_version = %from,
                        config_version = %to,
                        "Corrective re-fetch failed, continuing mismatched: {}",
                        e
                    );
                    corrective_refetch = CorrectiveRefetch::Failed {
                        from,
                        to,
                        reason: e.to_string(),
                    };
                }
            }
        }

        // Built fresh from whichever availability payload survived
        let entries = normalize_availability(availability.version, &availability.data)?;
        let index = AvailabilityIndex::from_entries(entries.iter().cloned());
        let active = normalize_active_config(config.version, &config.data)?;
        // A mismatched pair cannot vouch for any operator
        let versions_match = availability.version == config.version;

        let report = ReconciliationReport {
            availability_version: availability.version,
            config_version: config.version,
            version_mismatch_detected: !versions_match,
            corrective_refetch,
            merchant_name: active.merchant_name.clone(),
            company_name: active.company_name.clone(),
            merged_catalog: merge_catalog(CATALOG, &index, &active, versions_match),
            availability: group_by_country(&entries),
            snapshots_written,
        };

        let outcome = if report.version_mismatch_detected { "mismatched" } else { "consistent" };
        RECONCILIATIONS_TOTAL.with_label_values(&[outcome]).inc();
        AVAILABLE_OPERATORS.set(report.available_operator_count() as i64);

        info!(
            availability_version = %report.availability_version,
            config_version = %report.config_version,
            operators = index.len(),
            configured = active.operator_count(),
            available = report.available_operator_count(),
            "Reconciliation completed"
        );
        Ok(report)
    }

    async fn persist(&self, payload: &FeedPayload, written: &mut Vec<PathBuf>) {
        match self.snapshots.write(payload.kind, payload.version, &payload.raw).await {
            Ok(path) => written.push(path),
            Err(e) => warn!(feed = %payload.kind, version = %payload.version, "Snapshot write failed: {}", e),
        }
    }
}
