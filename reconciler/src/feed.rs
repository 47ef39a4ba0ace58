//! Feed fetching with V2-first fallback

use crate::{Error, Result, ACTIVE_CONFIG_STEM, AVAILABILITY_STEM};
use momo_adapters::{wire, GatewayRequest, Transport};
use momo_protocol::{Environment, SchemaVersion};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

/// Configuration feed served by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeedKind {
    /// Operator availability per operation type
    Availability,
    /// Merchant's enabled operators with limits and display data
    ActiveConfig,
}

impl FeedKind {
    /// Snapshot file stem
    pub fn stem(&self) -> &'static str {
        match self {
            FeedKind::Availability => AVAILABILITY_STEM,
            FeedKind::ActiveConfig => ACTIVE_CONFIG_STEM,
        }
    }

    /// Gateway path for a generation
    pub fn path(&self, version: SchemaVersion) -> String {
        match self {
            FeedKind::Availability => wire::availability_path(version),
            FeedKind::ActiveConfig => wire::active_config_path(version),
        }
    }

    fn shape_ok(&self, data: &Value) -> bool {
        match self {
            FeedKind::Availability => data.is_array(),
            FeedKind::ActiveConfig => data.is_object(),
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedKind::Availability => f.write_str("availability"),
            FeedKind::ActiveConfig => f.write_str("active-config"),
        }
    }
}

/// A successfully fetched feed
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPayload {
    /// Which feed
    pub kind: FeedKind,
    /// Generation that served it
    pub version: SchemaVersion,
    /// Body exactly as received (persisted to the snapshot)
    pub raw: Value,
    /// Payload with any `{success, data}` envelope removed
    pub data: Value,
}

/// Fetch one feed at one generation.
///
/// Non-2xx, a `success: false` envelope, a transport error or a payload of
/// the wrong shape are all failures.
pub async fn fetch_feed(
    transport: &dyn Transport,
    kind: FeedKind,
    version: SchemaVersion,
    environment: Environment,
) -> Result<FeedPayload> {
    let failure = |reason: String| Error::Feed { feed: kind, version, reason };

    let response = transport
        .send(GatewayRequest::get(environment, kind.path(version)))
        .await
        .map_err(|e| failure(e.to_string()))?;

    if !response.is_success() {
        return Err(failure(format!("HTTP {}", response.status)));
    }

    let data = match response.body.get("success").and_then(Value::as_bool) {
        Some(false) => {
            let message = response
                .body
                .get("message")
                .or_else(|| response.body.get("error"))
                .and_then(Value::as_str)
                .unwrap_or("gateway reported success: false");
            return Err(failure(message.to_string()));
        }
        Some(true) => response.body.get("data").cloned().unwrap_or(Value::Null),
        None => response.body.clone(),
    };

    if !kind.shape_ok(&data) {
        return Err(failure("malformed payload".to_string()));
    }

    debug!(feed = %kind, %version, "Feed fetched");
    Ok(FeedPayload {
        kind,
        version,
        raw: response.body,
        data,
    })
}

/// Fetch a feed preferring V2, falling back to V1
pub async fn resolve_feed(
    transport: &dyn Transport,
    kind: FeedKind,
    environment: Environment,
) -> Result<FeedPayload> {
    let preferred = SchemaVersion::V2;
    let v2_error = match fetch_feed(transport, kind, preferred, environment).await {
        Ok(payload) => return Ok(payload),
        Err(e) => e,
    };
    warn!(feed = %kind, "V2 fetch failed, falling back to V1: {}", v2_error);

    fetch_feed(transport, kind, preferred.other(), environment)
        .await
        .map_err(|v1_error| Error::FeedUnavailable {
            feed: kind,
            v2_error: v2_error.to_string(),
            v1_error: v1_error.to_string(),
        })
}
