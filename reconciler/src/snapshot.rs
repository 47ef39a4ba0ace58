//! Raw feed snapshots on disk
//!
//! One file per feed per generation (`mno_availability_v2.json`,
//! `active_conf_v1.json`, ...), overwritten wholesale on every fetch. The
//! files are a disposable cache for offline inspection.

use crate::{feed::FeedKind, Result, ACTIVE_CONFIG_STEM, AVAILABILITY_STEM};
use momo_protocol::SchemaVersion;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Both feeds loaded from the same generation
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotPair {
    /// Generation suffix; `None` for unsuffixed legacy files
    pub version: Option<SchemaVersion>,
    /// Availability body
    pub availability: Value,
    /// Active-configuration body
    pub active_config: Value,
}

/// Snapshot directory
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Store rooted at `dir` (created on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a feed at a generation, `None` for the unsuffixed name
    pub fn file_name(stem: &str, version: Option<SchemaVersion>) -> String {
        match version {
            Some(v) => format!("{}_{}.json", stem, v),
            None => format!("{}.json", stem),
        }
    }

    /// Path of a feed snapshot
    pub fn path(&self, kind: FeedKind, version: SchemaVersion) -> PathBuf {
        self.dir.join(Self::file_name(kind.stem(), Some(version)))
    }

    /// Replace the snapshot for a feed and generation
    pub async fn write(&self, kind: FeedKind, version: SchemaVersion, body: &Value) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).await?;

        let path = self.path(kind, version);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(body)?).await?;
        fs::rename(&tmp, &path).await?;

        debug!(path = %path.display(), "Snapshot written");
        Ok(path)
    }

    async fn read(&self, stem: &str, version: Option<SchemaVersion>) -> Result<Option<Value>> {
        let path = self.dir.join(Self::file_name(stem, version));
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Highest-priority complete pair: v2, then v1, then unsuffixed files.
    ///
    /// A generation is used only when both of its files exist.
    pub async fn load_latest(&self) -> Result<Option<SnapshotPair>> {
        for version in [Some(SchemaVersion::V2), Some(SchemaVersion::V1), None] {
            let availability = self.read(AVAILABILITY_STEM, version).await?;
            let active_config = self.read(ACTIVE_CONFIG_STEM, version).await?;

            if let (Some(availability), Some(active_config)) = (availability, active_config) {
                info!(
                    version = version.map_or("default", |v| v.as_str()),
                    "Loaded snapshot pair"
                );
                return Ok(Some(SnapshotPair {
                    version,
                    availability,
                    active_config,
                }));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_overwrites() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path().join("data"));

        store.write(FeedKind::Availability, SchemaVersion::V2, &json!([1, 2])).await.unwrap();
        let path = store.write(FeedKind::Availability, SchemaVersion::V2, &json!([3])).await.unwrap();

        assert!(path.ends_with("mno_availability_v2.json"));
        let body: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(body, json!([3]));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_load_latest_priority() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path());

        assert!(store.load_latest().await.unwrap().is_none());

        std::fs::write(tmp.path().join("mno_availability.json"), "[]").unwrap();
        std::fs::write(tmp.path().join("active_conf.json"), "{}").unwrap();
        assert_eq!(store.load_latest().await.unwrap().unwrap().version, None);

        store.write(FeedKind::Availability, SchemaVersion::V1, &json!([])).await.unwrap();
        store.write(FeedKind::ActiveConfig, SchemaVersion::V1, &json!({"v": 1})).await.unwrap();
        // v2 availability alone does not make a pair
        store.write(FeedKind::Availability, SchemaVersion::V2, &json!([])).await.unwrap();

        let pair = store.load_latest().await.unwrap().unwrap();
        assert_eq!(pair.version, Some(SchemaVersion::V1));
        assert_eq!(pair.active_config, json!({"v": 1}));
    }
}
