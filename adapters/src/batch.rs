//! Batch payout coordinator
//!
//! Each recipient runs as a two-phase task (initiate, settle delay, one status
//! check) and folds into its own [`RecipientResult`]; a failing recipient
//! never stops the batch.

use crate::{
    config::GatewayConfig, metrics::BATCH_RECIPIENTS_TOTAL,
    orchestrator::TransactionOrchestrator, DEFAULT_BATCH_CONCURRENCY,
};
use futures_util::stream::{self, StreamExt};
use momo_protocol::{
    validation::validate_metadata, Environment, MetadataField, MoneyMovementRequest,
    MoneyMovementResult, SchemaVersion, TransactionStatus, MAX_BATCH_PAYOUT_METADATA_ITEMS,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Statement description used on V1 payouts that do not carry one
pub const DEFAULT_PAYOUT_DESCRIPTION: &str = "Payout to customer";

#[rustfmt::skip]
const COUNTRY_TO_ISO3: &[(&str, &str)] = &[
    ("Algeria", "DZA"), ("Angola", "AGO"), ("Benin", "BEN"), ("Botswana", "BWA"),
    ("Burkina Faso", "BFA"), ("Burundi", "BDI"), ("Cabo Verde", "CPV"), ("Cameroon", "CMR"),
    ("Central African Republic", "CAF"), ("Chad", "TCD"), ("Comoros", "COM"), ("Congo", "COG"),
    ("Congo (DRC)", "COD"), ("Cote D'Ivoire", "CIV"), ("Djibouti", "DJI"), ("Egypt", "EGY"),
    ("Equatorial Guinea", "GNQ"), ("Eritrea", "ERI"), ("Eswatini", "SWZ"), ("Ethiopia", "ETH"),
    ("Gabon", "GAB"), ("Gambia", "GMB"), ("Ghana", "GHA"), ("Guinea", "GIN"),
    ("Guinea-Bissau", "GNB"), ("Kenya", "KEN"), ("Lesotho", "LSO"), ("Liberia", "LBR"),
    ("Libya", "LBY"), ("Madagascar", "MDG"), ("Malawi", "MWI"), ("Mali", "MLI"),
    ("Mauritania", "MRT"), ("Mauritius", "MUS"), ("Morocco", "MAR"), ("Mozambique", "MOZ"),
    ("Namibia", "NAM"), ("Niger", "NER"), ("Nigeria", "NGA"), ("Rwanda", "RWA"),
    ("Sao Tome and Principe", "STP"), ("Senegal", "SEN"), ("Seychelles", "SYC"),
    ("Sierra Leone", "SLE"), ("Somalia", "SOM"), ("South Africa", "ZAF"), ("South Sudan", "SSD"),
    ("Sudan", "SDN"), ("Tanzania", "TZA"), ("Togo", "TGO"), ("Tunisia", "TUN"),
    ("Uganda", "UGA"), ("Zambia", "ZMB"), ("Zimbabwe", "ZWE"),
];

/// ISO-3 code for a country name; unknown names are upper-cased as given
pub fn country_iso3(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let code = COUNTRY_TO_ISO3
        .iter()
        .find(|(country, _)| *country == name)
        .map(|(_, iso3)| iso3.to_string())
        .unwrap_or_else(|| name.to_uppercase());
    Some(code)
}

/// One payout line as submitted by a caller; V1 and V2 field names are both accepted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayoutRecipient {
    /// Recipient phone number, digits only
    pub recipient_msisdn: Option<String>,
    /// Decimal amount
    pub amount: Option<String>,
    /// ISO currency code
    pub currency: Option<String>,
    /// V2 operator code
    pub provider: Option<String>,
    /// V1 operator code
    pub correspondent: Option<String>,
    /// V2 description
    pub customer_message: Option<String>,
    /// V1 description
    pub statement_description: Option<String>,
    /// Country name or code
    pub country: Option<String>,
    /// Per-recipient API generation override
    pub api_version: Option<String>,
    /// Metadata (at most 5 entries)
    pub metadata: Vec<MetadataField>,
}

impl PayoutRecipient {
    /// Recipient with the fields every payout needs
    pub fn new(
        recipient_msisdn: impl Into<String>,
        amount: impl Into<String>,
        currency: impl Into<String>,
        operator_code: impl Into<String>,
    ) -> Self {
        Self {
            recipient_msisdn: Some(recipient_msisdn.into()),
            amount: Some(amount.into()),
            currency: Some(currency.into()),
            provider: Some(operator_code.into()),
            ..Default::default()
        }
    }

    fn operator_code(&self, version: SchemaVersion) -> Option<&str> {
        let (preferred, fallback) = match version {
            SchemaVersion::V1 => (&self.correspondent, &self.provider),
            SchemaVersion::V2 => (&self.provider, &self.correspondent),
        };
        non_blank(preferred).or_else(|| non_blank(fallback))
    }

    fn description(&self, version: SchemaVersion) -> Option<&str> {
        let (preferred, fallback) = match version {
            SchemaVersion::V1 => (&self.statement_description, &self.customer_message),
            SchemaVersion::V2 => (&self.customer_message, &self.statement_description),
        };
        non_blank(preferred).or_else(|| non_blank(fallback))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Outcome of one recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientResult {
    /// Position in the submitted batch
    pub index: usize,
    /// Recipient phone number as submitted
    pub recipient_msisdn: Option<String>,
    /// Payout id, once assigned
    pub payout_id: Option<String>,
    /// Effective API generation
    pub version: SchemaVersion,
    /// ISO-3 country, when a country was given
    pub country_iso3: Option<String>,
    /// Completed
    pub success: bool,
    /// Last known status
    pub status: Option<TransactionStatus>,
    /// Amount as submitted
    pub amount: Option<String>,
    /// Currency as submitted
    pub currency: Option<String>,
    /// Human-readable summary
    pub details: String,
    /// Failure reason
    pub error: Option<String>,
    /// Orchestrator result, when the payout reached the gateway
    pub result: Option<MoneyMovementResult>,
}

/// Outcome of a whole batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// No recipient failed
    pub overall_success: bool,
    /// Completed recipients
    pub successful_count: usize,
    /// Everything else
    pub failed_count: usize,
    /// Recipients submitted
    pub total_recipients: usize,
    /// Summary line
    pub message: String,
    /// One entry per recipient, in input order
    pub results: Vec<RecipientResult>,
}

impl BatchResult {
    fn from_results(results: Vec<RecipientResult>) -> Self {
        let successful_count = results.iter().filter(|r| r.success).count();
        let failed_count = results.len() - successful_count;
        Self {
            overall_success: failed_count == 0,
            successful_count,
            failed_count,
            total_recipients: results.len(),
            message: format!(
                "Payout processing completed. {} successful and {} failed.",
                successful_count, failed_count
            ),
            results,
        }
    }
}

/// Payout ready for the orchestrator
struct PreparedPayout {
    request: MoneyMovementRequest,
    version: SchemaVersion,
    country_iso3: Option<String>,
}

/// Why a recipient did not complete
enum RecipientFailure {
    /// Rejected before reaching a status check
    Aborted {
        payout_id: Option<String>,
        result: Option<MoneyMovementResult>,
        reason: String,
    },
    /// Status check returned something other than COMPLETED
    NotCompleted(MoneyMovementResult),
}

/// Runs payouts for many recipients with per-recipient isolation
pub struct BatchPayoutCoordinator {
    orchestrator: Arc<TransactionOrchestrator>,
    settle_delay: Duration,
    concurrency: usize,
}

impl BatchPayoutCoordinator {
    /// Sequential coordinator
    pub fn new(orchestrator: Arc<TransactionOrchestrator>, settle_delay: Duration) -> Self {
        Self {
            orchestrator,
            settle_delay,
            concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }

    /// Coordinator using the configured settle delay and concurrency
    pub fn from_config(orchestrator: Arc<TransactionOrchestrator>, config: &GatewayConfig) -> Self {
        Self::new(orchestrator, config.settle_delay()).with_concurrency(config.batch_concurrency)
    }

    /// Process up to `limit` recipients at once; results keep input order
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    /// Pay every recipient and summarize
    pub async fn execute_batch(
        &self,
        recipients: &[PayoutRecipient],
        default_version: SchemaVersion,
        environment: Environment,
    ) -> BatchResult {
        info!(
            recipients = recipients.len(),
            %default_version,
            %environment,
            concurrency = self.concurrency,
            "Starting batch payout"
        );

        let mut results: Vec<RecipientResult> = if self.concurrency <= 1 {
            let mut results = Vec::with_capacity(recipients.len());
            for (index, recipient) in recipients.iter().enumerate() {
                results.push(self.process(index, recipient, default_version, environment).await);
            }
            results
        } else {
            stream::iter(recipients.iter().enumerate())
                .map(|(index, recipient)| self.process(index, recipient, default_version, environment))
                .buffer_unordered(self.concurrency)
                .collect()
                .await
        };
        results.sort_by_key(|r| r.index);

        let batch = BatchResult::from_results(results);
        info!(
            successful = batch.successful_count,
            failed = batch.failed_count,
            "{}", batch.message
        );
        batch
    }

    async fn process(
        &self,
        index: usize,
        recipient: &PayoutRecipient,
        default_version: SchemaVersion,
        environment: Environment,
    ) -> RecipientResult {
        let version = recipient
            .api_version
            .as_deref()
            .map(SchemaVersion::parse_lenient)
            .unwrap_or(default_version);

        let prepared = prepare(recipient, version);
        let country_iso3 = prepared.as_ref().ok().and_then(|p| p.country_iso3.clone());
        let outcome = match prepared {
            Ok(prepared) => self.run(prepared, environment).await,
            Err(reason) => Err(RecipientFailure::Aborted {
                payout_id: None,
                result: None,
                reason,
            }),
        };

        fold(index, recipient, version, country_iso3, outcome)
    }

    /// Initiate, wait for the gateway to settle, check once
    async fn run(
        &self,
        prepared: PreparedPayout,
        environment: Environment,
    ) -> Result<MoneyMovementResult, RecipientFailure> {
        let initiated = self
            .orchestrator
            .initiate(&prepared.request, prepared.version, environment)
            .await
            .map_err(|result| RecipientFailure::Aborted {
                payout_id: Some(result.operation_id.clone()),
                reason: result
                    .failure_message
                    .clone()
                    .unwrap_or_else(|| result.message.clone()),
                result: Some(result),
            })?;

        tokio::time::sleep(self.settle_delay).await;

        let result = self.orchestrator.poll(&initiated).await;
        if result.success() {
            Ok(result)
        } else {
            Err(RecipientFailure::NotCompleted(result))
        }
    }
}

fn prepare(recipient: &PayoutRecipient, version: SchemaVersion) -> Result<PreparedPayout, String> {
    let description = match (recipient.description(version), version) {
        (Some(description), _) => description.to_string(),
        (None, SchemaVersion::V1) => DEFAULT_PAYOUT_DESCRIPTION.to_string(),
        (None, SchemaVersion::V2) => String::new(),
    };

    validate_metadata(&recipient.metadata, MAX_BATCH_PAYOUT_METADATA_ITEMS).map_err(|e| e.message)?;

    let request = MoneyMovementRequest::payout(
        recipient.amount.clone().unwrap_or_default(),
        recipient.currency.clone().unwrap_or_default(),
        recipient.recipient_msisdn.clone().unwrap_or_default(),
        recipient.operator_code(version).unwrap_or_default(),
        description,
    )
    .with_metadata(recipient.metadata.clone());

    Ok(PreparedPayout {
        request,
        version,
        country_iso3: recipient.country.as_deref().and_then(country_iso3),
    })
}

fn fold(
    index: usize,
    recipient: &PayoutRecipient,
    version: SchemaVersion,
    country_iso3: Option<String>,
    outcome: Result<MoneyMovementResult, RecipientFailure>,
) -> RecipientResult {
    let mut entry = RecipientResult {
        index,
        recipient_msisdn: recipient.recipient_msisdn.clone(),
        payout_id: None,
        version,
        country_iso3,
        success: false,
        status: None,
        amount: recipient.amount.clone(),
        currency: recipient.currency.clone(),
        details: String::new(),
        error: None,
        result: None,
    };

    match outcome {
        Ok(result) => {
            info!(payout_id = %result.operation_id, %version, "Payout completed successfully");
            BATCH_RECIPIENTS_TOTAL.with_label_values(&[version.as_str(), "completed"]).inc();
            entry.success = true;
            entry.status = Some(result.status);
            entry.payout_id = Some(result.operation_id.clone());
            entry.details = format!(
                "Payout of {} {} to {} completed successfully. ID: {}",
                recipient.amount.as_deref().unwrap_or_default(),
                recipient.currency.as_deref().unwrap_or_default(),
                recipient.recipient_msisdn.as_deref().unwrap_or_default(),
                result.operation_id
            );
            entry.result = Some(result);
        }
        Err(RecipientFailure::NotCompleted(result)) => {
            let reason = result
                .failure_message
                .clone()
                .unwrap_or_else(|| "Unknown error or Pending".to_string());
            error!(payout_id = %result.operation_id, %version, error = %reason, "Payout failed or not completed");
            BATCH_RECIPIENTS_TOTAL.with_label_values(&[version.as_str(), "not_completed"]).inc();
            entry.status = Some(result.status);
            entry.payout_id = Some(result.operation_id.clone());
            entry.details = format!(
                "Payout failed or pending. ID: {}. Reason: {} [v={}]",
                result.operation_id, reason, version
            );
            entry.error = Some(reason);
            entry.result = Some(result);
        }
        Err(RecipientFailure::Aborted { payout_id, result, reason }) => {
            error!(
                recipient_msisdn = ?recipient.recipient_msisdn,
                %version,
                error = %reason,
                "Payout processing error"
            );
            BATCH_RECIPIENTS_TOTAL.with_label_values(&[version.as_str(), "error"]).inc();
            entry.status = result.as_ref().map(|r| r.status);
            entry.payout_id = payout_id;
            entry.details = format!("Payout processing error: {}", reason);
            entry.error = Some(reason);
            entry.result = result;
        }
    }

    entry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_iso3() {
        assert_eq!(country_iso3("Uganda").as_deref(), Some("UGA"));
        assert_eq!(country_iso3(" Congo (DRC) ").as_deref(), Some("COD"));
        assert_eq!(country_iso3("zmb").as_deref(), Some("ZMB"));
        assert_eq!(country_iso3("  "), None);
    }

    #[test]
    fn test_synonyms_cross_populate() {
        let recipient = PayoutRecipient {
            correspondent: Some("MTN_MOMO_ZMB".into()),
            customer_message: Some("Salary".into()),
            ..PayoutRecipient::new("260971234567", "10", "ZMW", "")
        };

        let v2 = prepare(&recipient, SchemaVersion::V2).ok().unwrap();
        assert_eq!(v2.request.operator_code, "MTN_MOMO_ZMB");
        assert_eq!(v2.request.description, "Salary");

        let v1 = prepare(&recipient, SchemaVersion::V1).ok().unwrap();
        assert_eq!(v1.request.operator_code, "MTN_MOMO_ZMB");
        assert_eq!(v1.request.description, "Salary");
    }

    #[test]
    fn test_v1_description_default() {
        let recipient = PayoutRecipient::new("260971234567", "10", "ZMW", "MTN_MOMO_ZMB");
        let v1 = prepare(&recipient, SchemaVersion::V1).ok().unwrap();
        assert_eq!(v1.request.description, DEFAULT_PAYOUT_DESCRIPTION);
        let v2 = prepare(&recipient, SchemaVersion::V2).ok().unwrap();
        assert!(v2.request.description.is_empty());
    }

    #[test]
    fn test_batch_metadata_limit() {
        let recipient = PayoutRecipient {
            metadata: (0..6).map(|i| MetadataField::new(format!("f{}", i), "v")).collect(),
            ..PayoutRecipient::new("260971234567", "10", "ZMW", "MTN_MOMO_ZMB")
        };
        let err = prepare(&recipient, SchemaVersion::V1).err().unwrap();
        assert!(err.contains("must not be more than 5"));
    }

    #[test]
    fn test_recipient_deserializes_form_fields() {
        let recipient: PayoutRecipient = serde_json::from_value(serde_json::json!({
            "recipientMsisdn": "256783456789",
            "amount": "500",
            "currency": "UGX",
            "statementDescription": "Refund 12",
            "apiVersion": "V2",
            "metadata": [{"fieldName": "orderId", "fieldValue": "ORD-1"}]
        }))
        .unwrap();
        assert_eq!(recipient.api_version.as_deref(), Some("V2"));
        assert_eq!(recipient.description(SchemaVersion::V2), Some("Refund 12"));
        assert_eq!(recipient.metadata.len(), 1);
    }
}
