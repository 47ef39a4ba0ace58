//! Status bodies: decode once into a tagged envelope, then classify

use super::str_field;
use crate::{
    failure_codes::{failure_message, DEFAULT_FAILURE_MESSAGE},
    types::*,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Decoded shape of a status-check body.
///
/// The body's shape decides the variant; the declared version only settles
/// bodies that carry no information at all (null or `{}`).
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEnvelope {
    /// V1 array; holds the first record
    V1Array(Value),
    /// V1 flat record
    V1Object(Value),
    /// V1 empty array / empty object: nothing recorded yet
    V1Empty,
    /// V2 `{status: "FOUND", data}`
    V2Found {
        /// Transaction record
        data: Value,
        /// Whole envelope, for failure reasons reported outside `data`
        envelope: Value,
    },
    /// V2 `{status: "NOT_FOUND"}`
    V2NotFound,
}

impl StatusEnvelope {
    /// Decode a raw status body
    pub fn decode(version: SchemaVersion, body: &Value) -> Result<Self> {
        let empty = match version {
            SchemaVersion::V1 => StatusEnvelope::V1Empty,
            SchemaVersion::V2 => StatusEnvelope::V2NotFound,
        };

        match body {
            Value::Null => Ok(empty),
            Value::Array(items) => match items.first() {
                None => Ok(StatusEnvelope::V1Empty),
                Some(Value::Object(record)) if record.is_empty() => Ok(StatusEnvelope::V1Empty),
                Some(record @ Value::Object(_)) => Ok(StatusEnvelope::V1Array(record.clone())),
                Some(other) => Err(Error::Decode(format!(
                    "status array holds a non-object element: {}",
                    other
                ))),
            },
            Value::Object(map) if map.is_empty() => Ok(empty),
            Value::Object(map) => {
                if let Some(data @ Value::Object(_)) = map.get("data") {
                    return Ok(StatusEnvelope::V2Found {
                        data: data.clone(),
                        envelope: body.clone(),
                    });
                }
                match map.get("status").and_then(Value::as_str) {
                    Some("NOT_FOUND") => Ok(StatusEnvelope::V2NotFound),
                    Some("FOUND") => Ok(StatusEnvelope::V2Found {
                        data: Value::Object(Default::default()),
                        envelope: body.clone(),
                    }),
                    _ => Ok(StatusEnvelope::V1Object(body.clone())),
                }
            }
            other => Err(Error::Decode(format!("unexpected status body: {}", other))),
        }
    }

    /// Transaction record, if the gateway returned one
    pub fn record(&self) -> Option<&Value> {
        match self {
            StatusEnvelope::V1Array(record) | StatusEnvelope::V1Object(record) => Some(record),
            StatusEnvelope::V2Found { data, .. } => Some(data),
            StatusEnvelope::V1Empty | StatusEnvelope::V2NotFound => None,
        }
    }

    /// Collapsed status
    pub fn status(&self) -> TransactionStatus {
        self.record()
            .map(|record| TransactionStatus::from_token(str_field(record, &["status"])))
            .unwrap_or(TransactionStatus::Processing)
    }
}

/// Decoded failure reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetails {
    /// Gateway code, when present
    pub code: Option<String>,
    /// Human-readable message
    pub message: String,
}

/// Extract a failure reason from a gateway body.
///
/// Precedence: `rejectionReason.rejectionMessage`, then
/// `failureReason.failureCode` through the code table, then
/// `failureReason.failureMessage`, then a top-level `message`.
pub fn extract_failure(body: &Value) -> Option<FailureDetails> {
    let rejection = body.get("rejectionReason");
    if let Some(message) = rejection.and_then(|r| str_field(r, &["rejectionMessage"])) {
        return Some(FailureDetails {
            code: rejection
                .and_then(|r| str_field(r, &["rejectionCode"]))
                .map(str::to_string),
            message: message.to_string(),
        });
    }

    let failure = body.get("failureReason");
    if let Some(code) = failure.and_then(|f| str_field(f, &["failureCode"])) {
        let message = match failure_message(code) {
            // Unknown code: the gateway's own text beats the generic fallback
            DEFAULT_FAILURE_MESSAGE => failure
                .and_then(|f| str_field(f, &["failureMessage"]))
                .unwrap_or(DEFAULT_FAILURE_MESSAGE),
            known => known,
        };
        return Some(FailureDetails {
            code: Some(code.to_string()),
            message: message.to_string(),
        });
    }

    if let Some(message) = failure.and_then(|f| str_field(f, &["failureMessage"])) {
        return Some(FailureDetails {
            code: None,
            message: message.to_string(),
        });
    }

    str_field(body, &["message"]).map(|message| FailureDetails {
        code: None,
        message: message.to_string(),
    })
}

/// Failure reason with the generic fallback applied
pub fn failure_or_default(body: &Value) -> FailureDetails {
    extract_failure(body).unwrap_or_else(|| FailureDetails {
        code: None,
        message: DEFAULT_FAILURE_MESSAGE.to_string(),
    })
}

fn processing_message(kind: OperationKind) -> String {
    format!("{} is processing. Please wait and check your account.", kind.label())
}

/// Classify a status-check body into a canonical result
pub fn classify_status(
    operation_id: &str,
    kind: OperationKind,
    version: SchemaVersion,
    body: &Value,
) -> MoneyMovementResult {
    let envelope = match StatusEnvelope::decode(version, body) {
        Ok(envelope) => envelope,
        Err(e) => {
            return MoneyMovementResult::failed(
                operation_id,
                kind,
                version,
                format!("Malformed {} status response: {}", kind, e),
            )
            .with_raw(body.clone());
        }
    };

    let status = envelope.status();
    let mut result = MoneyMovementResult {
        operation_id: operation_id.to_string(),
        kind,
        version,
        status,
        failure_code: None,
        failure_message: None,
        message: processing_message(kind),
        http_status: None,
        raw: body.clone(),
    };

    match status {
        TransactionStatus::Completed => {
            result.message = format!("{} processed successfully.", kind.label());
        }
        TransactionStatus::Failed => {
            let record_failure = envelope.record().and_then(extract_failure);
            let envelope_failure = match &envelope {
                StatusEnvelope::V2Found { envelope, .. } => extract_failure(envelope),
                _ => None,
            };
            let details = record_failure.or(envelope_failure).unwrap_or_else(|| FailureDetails {
                code: Some("OTHER_ERROR".to_string()),
                message: failure_message("OTHER_ERROR").to_string(),
            });
            result.message = format!("{} failed: {}", kind.label(), details.message);
            result.failure_code = details.code;
            result.failure_message = Some(details.message);
        }
        TransactionStatus::Processing | TransactionStatus::Unknown => {}
    }

    result
}
