//! Hosted payment-page sessions
//!
//! The gateway hosts the payer-facing form; the merchant only creates a
//! session and redirects the payer to the returned URL.

use crate::{
    transport::{GatewayRequest, Transport},
    wire,
};
use momo_protocol::{
    normalizer::extract_failure,
    validation::{description_field, validate_amount, validate_description, validate_metadata},
    Environment, IdGenerator, MetadataField, SchemaVersion, ValidationError, MAX_METADATA_ITEMS,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

/// Payment-page session parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentPageRequest {
    /// Decimal amount
    pub amount: String,
    /// ISO currency code
    pub currency: String,
    /// Payer phone number; non-digits are stripped
    pub payer_msisdn: String,
    /// Statement description / customer message
    pub description: String,
    /// Where the gateway sends the payer afterwards
    pub return_url: String,
    /// ISO-3 country preselected on the page
    pub country: Option<String>,
    /// Reason shown on the page
    pub reason: Option<String>,
    /// Page language (EN / FR)
    pub language: Option<String>,
    /// Metadata
    pub metadata: Vec<MetadataField>,
}

/// Payment-page session outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPageResult {
    /// Session created and a redirect URL returned
    pub success: bool,
    /// Deposit id bound to the session
    pub deposit_id: String,
    /// API generation used
    pub version: SchemaVersion,
    /// Page to redirect the payer to
    pub redirect_url: Option<String>,
    /// Failure reason
    pub error_message: Option<String>,
    /// Gateway HTTP status, when a call was made
    pub http_status: Option<u16>,
    /// Gateway body
    pub raw: Value,
}

impl PaymentPageResult {
    fn failed(deposit_id: &str, version: SchemaVersion, message: impl Into<String>) -> Self {
        Self {
            success: false,
            deposit_id: deposit_id.to_string(),
            version,
            redirect_url: None,
            error_message: Some(message.into()),
            http_status: None,
            raw: Value::Null,
        }
    }
}

fn validate(request: &PaymentPageRequest, version: SchemaVersion) -> Result<String, ValidationError> {
    let msisdn: String = request.payer_msisdn.chars().filter(char::is_ascii_digit).collect();

    let required = [
        ("amount", request.amount.as_str()),
        ("payerMsisdn", msisdn.as_str()),
        (description_field(version), request.description.as_str()),
        ("currency", request.currency.as_str()),
        ("returnUrl", request.return_url.as_str()),
    ];
    let missing: Vec<String> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::missing(missing));
    }

    validate_amount(&request.amount)?;
    validate_description(&request.description, description_field(version))?;
    validate_metadata(&request.metadata, MAX_METADATA_ITEMS)?;
    Ok(msisdn)
}

/// Session body in the generation's wire shape
pub fn session_body(
    request: &PaymentPageRequest,
    deposit_id: &str,
    msisdn: &str,
    version: SchemaVersion,
) -> Value {
    let mut body = json!({
        "depositId": deposit_id,
        "returnUrl": request.return_url,
        "language": request.language.as_deref().unwrap_or("EN"),
        "reason": request.reason.as_deref().unwrap_or("Payment"),
    });

    match version {
        SchemaVersion::V1 => {
            body["amount"] = json!(request.amount);
            body["msisdn"] = json!(msisdn);
            body["statementDescription"] = json!(request.description);
        }
        SchemaVersion::V2 => {
            body["amountDetails"] = json!({"amount": request.amount, "currency": request.currency});
            body["phoneNumber"] = json!(msisdn);
            body["customerMessage"] = json!(request.description);
        }
    }
    if let Some(country) = &request.country {
        body["country"] = json!(country);
    }
    if !request.metadata.is_empty() {
        body["metadata"] = wire::metadata_body(version, &request.metadata);
    }
    body
}

/// Creates payment-page sessions
pub struct PaymentPageClient {
    transport: Arc<dyn Transport>,
    ids: Arc<dyn IdGenerator>,
}

impl PaymentPageClient {
    /// New client
    pub fn new(transport: Arc<dyn Transport>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { transport, ids }
    }

    /// Create a session; the deposit id is assigned once, before the call
    pub async fn create_session(
        &self,
        request: &PaymentPageRequest,
        version: SchemaVersion,
        environment: Environment,
    ) -> PaymentPageResult {
        let deposit_id = self.ids.generate();

        let msisdn = match validate(request, version) {
            Ok(msisdn) => msisdn,
            Err(e) => return PaymentPageResult::failed(&deposit_id, version, e.message),
        };

        info!(deposit_id = %deposit_id, %version, %environment, "Creating payment page session");
        let body = session_body(request, &deposit_id, &msisdn, version);
        let gateway_request = GatewayRequest::post(environment, wire::payment_page_path(version), body);

        let response = match self.transport.send(gateway_request).await {
            Ok(response) => response,
            Err(e) => {
                error!(deposit_id = %deposit_id, "Payment page transport error: {}", e);
                return PaymentPageResult::failed(&deposit_id, version, e.to_string());
            }
        };

        let redirect_url = if matches!(response.status, 200 | 201) {
            ["redirectUrl", "url"]
                .iter()
                .find_map(|k| response.body.get(*k).and_then(Value::as_str))
                .map(str::to_string)
        } else {
            None
        };

        match redirect_url {
            Some(url) => {
                info!(deposit_id = %deposit_id, "Payment page session created");
                PaymentPageResult {
                    success: true,
                    deposit_id,
                    version,
                    redirect_url: Some(url),
                    error_message: None,
                    http_status: Some(response.status),
                    raw: response.body,
                }
            }
            None => {
                let message = extract_failure(&response.body)
                    .map(|f| f.message)
                    .unwrap_or_else(|| "Failed to create payment session.".to_string());
                error!(deposit_id = %deposit_id, status = response.status, "{}", message);
                PaymentPageResult {
                    http_status: Some(response.status),
                    raw: response.body,
                    ..PaymentPageResult::failed(&deposit_id, version, message)
                }
            }
        }
    }
}
