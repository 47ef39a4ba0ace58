//! Canonical types shared by every gateway operation

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gateway API generation
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// Correspondent / statementDescription generation
    #[default]
    V1,
    /// Provider / customerMessage generation
    V2,
}

impl SchemaVersion {
    /// Wire label (`v1` / `v2`)
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => "v1",
            SchemaVersion::V2 => "v2",
        }
    }

    /// The other generation
    pub fn other(self) -> Self {
        match self {
            SchemaVersion::V1 => SchemaVersion::V2,
            SchemaVersion::V2 => SchemaVersion::V1,
        }
    }

    /// Parse a caller-supplied label, falling back to V1 for anything unrecognized
    pub fn parse_lenient(label: &str) -> Self {
        label.parse().unwrap_or(SchemaVersion::V1)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" => Ok(SchemaVersion::V1),
            "v2" => Ok(SchemaVersion::V2),
            other => Err(Error::UnknownVersion(other.to_string())),
        }
    }
}

/// Gateway environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Sandbox (TLS verification disabled)
    #[default]
    Sandbox,
    /// Production (TLS verification enforced)
    Production,
}

impl Environment {
    /// Parse an environment name; only `production` selects production
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Sandbox
        }
    }

    /// Lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Production => "production",
        }
    }

    /// Whether the transport must verify TLS certificates
    pub fn verify_tls(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Environment variable carrying the API token for this environment
    pub fn token_var(&self) -> String {
        format!("PAWAPAY_{}_API_TOKEN", self.as_str().to_ascii_uppercase())
    }

    /// Default gateway base URL
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => "https://api.sandbox.pawapay.io",
            Environment::Production => "https://api.pawapay.io",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Money-movement operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Collect from a payer
    Deposit,
    /// Disburse to a recipient
    Payout,
    /// Return a completed deposit
    Refund,
}

impl OperationKind {
    /// Id field name on the wire (`depositId`, ...)
    pub fn id_field(&self) -> &'static str {
        match self {
            OperationKind::Deposit => "depositId",
            OperationKind::Payout => "payoutId",
            OperationKind::Refund => "refundId",
        }
    }

    /// Endpoint collection (`deposits`, ...)
    pub fn collection(&self) -> &'static str {
        match self {
            OperationKind::Deposit => "deposits",
            OperationKind::Payout => "payouts",
            OperationKind::Refund => "refunds",
        }
    }

    /// Capitalized label for messages
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::Deposit => "Deposit",
            OperationKind::Payout => "Payout",
            OperationKind::Refund => "Refund",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Deposit => write!(f, "deposit"),
            OperationKind::Payout => write!(f, "payout"),
            OperationKind::Refund => write!(f, "refund"),
        }
    }
}

/// One metadata entry attached to an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataField {
    /// Field name
    pub field_name: String,
    /// Field value
    pub field_value: String,
    /// Whether the value is personally identifiable
    #[serde(default, rename = "isPII", skip_serializing_if = "Option::is_none")]
    pub is_pii: Option<bool>,
}

impl MetadataField {
    /// Non-PII metadata entry
    pub fn new(field_name: impl Into<String>, field_value: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            field_value: field_value.into(),
            is_pii: None,
        }
    }

    /// Mark as PII
    pub fn pii(mut self) -> Self {
        self.is_pii = Some(true);
        self
    }
}

/// Canonical money-movement request, independent of the API generation.
///
/// The operation id is not part of the request: the orchestrator assigns it
/// exactly once, before any network call, and reuses it for the status poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyMovementRequest {
    /// Operation kind
    pub kind: OperationKind,
    /// Decimal amount as a string (at most 2 fraction digits)
    pub amount: String,
    /// ISO currency code
    pub currency: String,
    /// Payer (deposit) or recipient (payout) phone number, digits only
    pub counterparty_msisdn: String,
    /// Correspondent (V1) / provider (V2) code
    pub operator_code: String,
    /// Statement description (V1) / customer message (V2)
    pub description: String,
    /// Ordered metadata entries
    #[serde(default)]
    pub metadata: Vec<MetadataField>,
    /// Deposit being refunded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_operation_id: Option<String>,
}

impl MoneyMovementRequest {
    /// Deposit request
    pub fn deposit(
        amount: impl Into<String>,
        currency: impl Into<String>,
        payer_msisdn: impl Into<String>,
        operator_code: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind: OperationKind::Deposit,
            amount: amount.into(),
            currency: currency.into(),
            counterparty_msisdn: payer_msisdn.into(),
            operator_code: operator_code.into(),
            description: description.into(),
            metadata: Vec::new(),
            parent_operation_id: None,
        }
    }

    /// Payout request
    pub fn payout(
        amount: impl Into<String>,
        currency: impl Into<String>,
        recipient_msisdn: impl Into<String>,
        operator_code: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind: OperationKind::Payout,
            ..Self::deposit(amount, currency, recipient_msisdn, operator_code, description)
        }
    }

    /// Refund of a completed deposit
    pub fn refund(
        deposit_id: impl Into<String>,
        amount: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            kind: OperationKind::Refund,
            amount: amount.into(),
            currency: currency.into(),
            counterparty_msisdn: String::new(),
            operator_code: String::new(),
            description: String::new(),
            metadata: Vec::new(),
            parent_operation_id: Some(deposit_id.into()),
        }
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: Vec<MetadataField>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Canonical transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Accepted but not yet settled (includes "not found yet")
    Processing,
    /// Terminal success
    Completed,
    /// Terminal failure
    Failed,
    /// Gateway reported a token we do not recognize
    Unknown,
}

impl TransactionStatus {
    /// Map a gateway status token; `None` means the record carries no status yet
    pub fn from_token(token: Option<&str>) -> Self {
        match token.map(|t| t.trim().to_ascii_uppercase()) {
            None => TransactionStatus::Processing,
            Some(t) => match t.as_str() {
                "COMPLETED" => TransactionStatus::Completed,
                "FAILED" => TransactionStatus::Failed,
                "" | "ACCEPTED" | "SUBMITTED" | "ENQUEUED" | "PROCESSING"
                | "IN_RECONCILIATION" => TransactionStatus::Processing,
                _ => TransactionStatus::Unknown,
            },
        }
    }

    /// Completed or Failed
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Completed | TransactionStatus::Failed)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Processing => write!(f, "PROCESSING"),
            TransactionStatus::Completed => write!(f, "COMPLETED"),
            TransactionStatus::Failed => write!(f, "FAILED"),
            TransactionStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Canonical outcome of one money-movement operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyMovementResult {
    /// Idempotency key assigned before initiation
    pub operation_id: String,
    /// Operation kind
    pub kind: OperationKind,
    /// API generation used
    pub version: SchemaVersion,
    /// Collapsed status
    pub status: TransactionStatus,
    /// Gateway failure or rejection code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_code: Option<String>,
    /// Human-readable failure reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
    /// Message suitable for the caller
    pub message: String,
    /// HTTP status of the last gateway call, when one was made
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Gateway body passed through untouched
    pub raw: serde_json::Value,
}

impl MoneyMovementResult {
    /// Failed result that never reached a terminal gateway state
    pub fn failed(
        operation_id: impl Into<String>,
        kind: OperationKind,
        version: SchemaVersion,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        Self {
            operation_id: operation_id.into(),
            kind,
            version,
            status: TransactionStatus::Failed,
            failure_code: None,
            failure_message: Some(message.clone()),
            message,
            http_status: None,
            raw: serde_json::Value::Null,
        }
    }

    /// Set the failure code
    pub fn with_failure_code(mut self, code: impl Into<String>) -> Self {
        self.failure_code = Some(code.into());
        self
    }

    /// Set the HTTP status
    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    /// Attach the raw gateway body
    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = raw;
        self
    }

    /// True only for a completed operation
    pub fn success(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version_parsing() {
        assert_eq!("V2".parse::<SchemaVersion>().unwrap(), SchemaVersion::V2);
        assert_eq!(" v1 ".parse::<SchemaVersion>().unwrap(), SchemaVersion::V1);
        assert!("v3".parse::<SchemaVersion>().is_err());
        assert_eq!(SchemaVersion::parse_lenient("v3"), SchemaVersion::V1);
        assert_eq!(SchemaVersion::parse_lenient("V2"), SchemaVersion::V2);
        assert_eq!(SchemaVersion::V2.other(), SchemaVersion::V1);
        assert_eq!(SchemaVersion::V1.other(), SchemaVersion::V2);
    }

    #[test]
    fn test_environment_tls_toggle() {
        assert!(Environment::from_name("PRODUCTION").verify_tls());
        assert!(!Environment::from_name("sandbox").verify_tls());
        assert!(!Environment::from_name("staging").verify_tls());
        assert_eq!(Environment::Sandbox.token_var(), "PAWAPAY_SANDBOX_API_TOKEN");
    }

    #[test]
    fn test_status_tokens() {
        assert_eq!(TransactionStatus::from_token(Some("COMPLETED")), TransactionStatus::Completed);
        assert_eq!(TransactionStatus::from_token(Some("failed")), TransactionStatus::Failed);
        assert_eq!(TransactionStatus::from_token(Some("SUBMITTED")), TransactionStatus::Processing);
        assert_eq!(TransactionStatus::from_token(None), TransactionStatus::Processing);
        assert_eq!(TransactionStatus::from_token(Some("WEIRD")), TransactionStatus::Unknown);
        assert!(!TransactionStatus::Unknown.is_terminal());
    }

    #[test]
    fn test_metadata_serialization() {
        let field = MetadataField::new("customerId", "abc").pii();
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["fieldName"], "customerId");
        assert_eq!(json["isPII"], true);
    }
}
