//! Transaction orchestrator
//!
//! Validate → assign id → initiate → poll once → classify. Every path ends in
//! a [`MoneyMovementResult`]; transport and gateway errors never escape.

use crate::{
    metrics::OPERATIONS_TOTAL,
    transport::{GatewayRequest, GatewayResponse, Transport},
    wire,
};
use chrono::Utc;
use momo_protocol::{
    normalizer::{classify_status, failure_or_default},
    validation::validate_request,
    Environment, IdGenerator, MoneyMovementRequest, MoneyMovementResult, OperationKind,
    SchemaVersion, UuidGenerator,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Currency sent on a V2 refund that does not name one
pub const DEFAULT_REFUND_CURRENCY: &str = "UGX";

/// Operation accepted by the gateway and awaiting its status check
#[derive(Debug, Clone, PartialEq)]
pub struct InitiatedOperation {
    /// Idempotency key sent on initiation
    pub operation_id: String,
    /// Operation kind
    pub kind: OperationKind,
    /// API generation used for initiation; the poll uses the same one
    pub version: SchemaVersion,
    /// Target environment
    pub environment: Environment,
    /// Initiation HTTP status
    pub http_status: u16,
    /// Initiation body
    pub raw: Value,
}

/// Drives deposits, payouts and refunds against the gateway
pub struct TransactionOrchestrator {
    transport: Arc<dyn Transport>,
    ids: Arc<dyn IdGenerator>,
}

impl TransactionOrchestrator {
    /// New orchestrator
    pub fn new(transport: Arc<dyn Transport>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { transport, ids }
    }

    /// New orchestrator issuing UUID v4 operation ids
    pub fn with_uuid_ids(transport: Arc<dyn Transport>) -> Self {
        Self::new(transport, Arc::new(UuidGenerator))
    }

    /// Validate, assign an id and initiate.
    ///
    /// `Err` carries the terminal `Failed` result when the operation never got
    /// past initiation.
    pub async fn initiate(
        &self,
        request: &MoneyMovementRequest,
        version: SchemaVersion,
        environment: Environment,
    ) -> Result<InitiatedOperation, MoneyMovementResult> {
        let operation_id = self.ids.generate();
        let kind = request.kind;

        let mut request = request.clone();
        if kind == OperationKind::Refund
            && version == SchemaVersion::V2
            && request.currency.trim().is_empty()
        {
            warn!(
                operation_id = %operation_id,
                "V2 refund has no currency, defaulting to {}", DEFAULT_REFUND_CURRENCY
            );
            request.currency = DEFAULT_REFUND_CURRENCY.to_string();
        }

        if let Err(e) = validate_request(&request, version) {
            warn!(operation_id = %operation_id, %kind, %version, fields = ?e.fields, "Validation failed: {}", e);
            let result = MoneyMovementResult::failed(&operation_id, kind, version, e.message.clone())
                .with_raw(json!({ "fields": e.fields }));
            record(&result);
            return Err(result);
        }

        info!(
            operation_id = %operation_id,
            %kind,
            %version,
            %environment,
            amount = %request.amount,
            currency = %request.currency,
            "Initiating {}", kind
        );

        let body = wire::initiate_body(&request, &operation_id, version, Utc::now());
        let gateway_request =
            GatewayRequest::post(environment, wire::initiate_path(kind, version), body);

        let response = match self.transport.send(gateway_request).await {
            Ok(response) => response,
            Err(e) => {
                error!(operation_id = %operation_id, %kind, "Initiation transport error: {}", e);
                let result = MoneyMovementResult::failed(
                    &operation_id,
                    kind,
                    version,
                    format!("Processing error: {}", e),
                );
                record(&result);
                return Err(result);
            }
        };

        if let Some(result) = rejection(&operation_id, kind, version, &response) {
            error!(
                operation_id = %operation_id,
                %kind,
                status = response.status,
                "{}", result.message
            );
            record(&result);
            return Err(result);
        }

        info!(operation_id = %operation_id, %kind, status = response.status, "{} initiated", kind.label());

        Ok(InitiatedOperation {
            operation_id,
            kind,
            version,
            environment,
            http_status: response.status,
            raw: response.body,
        })
    }

    /// Single status check of an initiated operation
    pub async fn poll(&self, initiated: &InitiatedOperation) -> MoneyMovementResult {
        self.check_status(
            initiated.kind,
            &initiated.operation_id,
            initiated.version,
            initiated.environment,
        )
        .await
    }

    /// Status of any operation id, classified
    pub async fn check_status(
        &self,
        kind: OperationKind,
        operation_id: &str,
        version: SchemaVersion,
        environment: Environment,
    ) -> MoneyMovementResult {
        let request = GatewayRequest::get(environment, wire::status_path(kind, version, operation_id));

        let result = match self.transport.send(request).await {
            Err(e) => {
                error!(operation_id, %kind, "Status transport error: {}", e);
                MoneyMovementResult::failed(
                    operation_id,
                    kind,
                    version,
                    format!("Processing error: {}", e),
                )
            }
            Ok(response) if !response.is_success() => {
                error!(operation_id, %kind, status = response.status, "Status check failed");
                MoneyMovementResult::failed(
                    operation_id,
                    kind,
                    version,
                    format!(
                        "Unable to retrieve {} status. The {} may still complete; check its status later.",
                        kind, kind
                    ),
                )
                .with_http_status(response.status)
                .with_raw(response.body)
            }
            Ok(response) => {
                let result = classify_status(operation_id, kind, version, &response.body)
                    .with_http_status(response.status);
                info!(operation_id, %kind, %version, status = %result.status, "{}", result.message);
                result
            }
        };

        record(&result);
        result
    }

    /// Full lifecycle for one request
    pub async fn execute(
        &self,
        request: &MoneyMovementRequest,
        version: SchemaVersion,
        environment: Environment,
    ) -> MoneyMovementResult {
        match self.initiate(request, version, environment).await {
            Ok(initiated) => self.poll(&initiated).await,
            Err(result) => result,
        }
    }

    /// Deposit lifecycle
    pub async fn execute_deposit(
        &self,
        request: &MoneyMovementRequest,
        version: SchemaVersion,
        environment: Environment,
    ) -> MoneyMovementResult {
        self.execute_as(OperationKind::Deposit, request, version, environment).await
    }

    /// Payout lifecycle
    pub async fn execute_payout(
        &self,
        request: &MoneyMovementRequest,
        version: SchemaVersion,
        environment: Environment,
    ) -> MoneyMovementResult {
        self.execute_as(OperationKind::Payout, request, version, environment).await
    }

    /// Refund lifecycle
    pub async fn execute_refund(
        &self,
        request: &MoneyMovementRequest,
        version: SchemaVersion,
        environment: Environment,
    ) -> MoneyMovementResult {
        self.execute_as(OperationKind::Refund, request, version, environment).await
    }

    async fn execute_as(
        &self,
        kind: OperationKind,
        request: &MoneyMovementRequest,
        version: SchemaVersion,
        environment: Environment,
    ) -> MoneyMovementResult {
        if request.kind == kind {
            return self.execute(request, version, environment).await;
        }
        let request = MoneyMovementRequest {
            kind,
            ..request.clone()
        };
        self.execute(&request, version, environment).await
    }
}

/// Failed result for a non-2xx initiation or a 2xx body reporting `REJECTED`
fn rejection(
    operation_id: &str,
    kind: OperationKind,
    version: SchemaVersion,
    response: &GatewayResponse,
) -> Option<MoneyMovementResult> {
    let rejected_in_body = response
        .body
        .get("status")
        .and_then(Value::as_str)
        .map_or(false, |s| s.eq_ignore_ascii_case("REJECTED"));
    if response.is_success() && !rejected_in_body {
        return None;
    }

    let details = failure_or_default(&response.body);

    let mut result = MoneyMovementResult::failed(
        operation_id,
        kind,
        version,
        format!("{} initiation failed: {}", kind.label(), details.message),
    )
    .with_http_status(response.status)
    .with_raw(response.body.clone());
    result.failure_message = Some(details.message);
    result.failure_code = details.code;
    Some(result)
}

fn record(result: &MoneyMovementResult) {
    OPERATIONS_TOTAL
        .with_label_values(&[
            &result.kind.to_string(),
            result.version.as_str(),
            &result.status.to_string(),
        ])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpMethod, ScriptedTransport};
    use momo_protocol::failure_codes::DEFAULT_FAILURE_MESSAGE;
    use momo_protocol::{SequentialIdGenerator, TransactionStatus};

    fn setup() -> (Arc<ScriptedTransport>, Arc<SequentialIdGenerator>, TransactionOrchestrator) {
        let transport = Arc::new(ScriptedTransport::new());
        let ids = Arc::new(SequentialIdGenerator::new("op"));
        let orchestrator = TransactionOrchestrator::new(transport.clone(), ids.clone());
        (transport, ids, orchestrator)
    }

    fn deposit() -> MoneyMovementRequest {
        MoneyMovementRequest::deposit("100", "UGX", "256783456789", "MTN_MOMO_UGA", "Order 42")
    }

    #[tokio::test]
    async fn test_v1_deposit_happy_path() {
        let (transport, ids, orchestrator) = setup();
        transport
            .respond(HttpMethod::Post, "/deposits", 200, json!({"depositId": "op-1", "status": "ACCEPTED"}))
            .respond(HttpMethod::Get, "/deposits/op-1", 200, json!([{"depositId": "op-1", "status": "COMPLETED"}]));

        let result = orchestrator
            .execute_deposit(&deposit(), SchemaVersion::V1, Environment::Sandbox)
            .await;

        assert!(result.success());
        assert_eq!(result.operation_id, "op-1");
        assert_eq!(result.http_status, Some(200));
        assert_eq!(ids.issued(), 1);

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        let body = requests[0].body.as_ref().unwrap();
        assert_eq!(body["depositId"], "op-1");
        assert_eq!(body["correspondent"], "MTN_MOMO_UGA");
    }

    #[tokio::test]
    async fn test_validation_failure_makes_no_call() {
        let (transport, ids, orchestrator) = setup();
        let mut request = deposit();
        request.amount = "5.555".into();

        let result = orchestrator
            .execute(&request, SchemaVersion::V1, Environment::Sandbox)
            .await;

        assert_eq!(result.status, TransactionStatus::Failed);
        assert!(result.message.contains("The amount '5.555' is invalid"));
        assert_eq!(result.raw["fields"][0], "amount");
        assert_eq!(result.operation_id, "op-1");
        assert_eq!(ids.issued(), 1);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_initiation_is_not_polled() {
        let (transport, _, orchestrator) = setup();
        transport.respond(
            HttpMethod::Post,
            "/v2/deposits",
            400,
            json!({"status": "REJECTED", "failureReason": {"failureCode": "INVALID_PHONE_NUMBER"}}),
        );

        let result = orchestrator
            .execute(&deposit(), SchemaVersion::V2, Environment::Sandbox)
            .await;

        assert_eq!(result.status, TransactionStatus::Failed);
        assert_eq!(result.failure_code.as_deref(), Some("INVALID_PHONE_NUMBER"));
        assert!(result.message.starts_with("Deposit initiation failed:"));
        assert_eq!(result.http_status, Some(400));
        assert_eq!(transport.count(HttpMethod::Get, "/v2/deposits/op-1"), 0);
    }

    #[tokio::test]
    async fn test_rejected_with_ok_status() {
        let (transport, _, orchestrator) = setup();
        transport.respond(
            HttpMethod::Post,
            "/deposits",
            200,
            json!({"status": "REJECTED", "rejectionReason": {"rejectionCode": "AMOUNT_TOO_SMALL", "rejectionMessage": "Amount is below the limit"}}),
        );

        let result = orchestrator
            .execute(&deposit(), SchemaVersion::V1, Environment::Sandbox)
            .await;

        assert_eq!(result.failure_code.as_deref(), Some("AMOUNT_TOO_SMALL"));
        assert_eq!(result.failure_message.as_deref(), Some("Amount is below the limit"));
        assert_eq!(transport.count(HttpMethod::Get, "/deposits/op-1"), 0);
    }

    #[tokio::test]
    async fn test_rejected_without_reason_uses_default_message() {
        let (transport, _, orchestrator) = setup();
        transport.respond(HttpMethod::Post, "/deposits", 400, json!({}));

        let result = orchestrator
            .execute(&deposit(), SchemaVersion::V1, Environment::Sandbox)
            .await;

        assert_eq!(result.status, TransactionStatus::Failed);
        assert_eq!(
            result.message,
            format!("Deposit initiation failed: {}", DEFAULT_FAILURE_MESSAGE)
        );
        assert_eq!(result.failure_message.as_deref(), Some(DEFAULT_FAILURE_MESSAGE));
        assert!(result.failure_code.is_none());
        assert_eq!(result.http_status, Some(400));
        assert_eq!(transport.count(HttpMethod::Get, "/deposits/op-1"), 0);
    }

    #[tokio::test]
    async fn test_v2_not_found_is_processing() {
        let (transport, _, orchestrator) = setup();
        transport
            .respond(HttpMethod::Post, "/v2/payouts", 200, json!({"payoutId": "op-1", "status": "ACCEPTED"}))
            .respond(HttpMethod::Get, "/v2/payouts/op-1", 200, json!({"status": "NOT_FOUND"}));

        let request = MoneyMovementRequest::payout("10", "ZMW", "260971234567", "MTN_MOMO_ZMB", "");
        let result = orchestrator
            .execute_payout(&request, SchemaVersion::V2, Environment::Sandbox)
            .await;

        assert_eq!(result.status, TransactionStatus::Processing);
        assert!(!result.success());
        assert!(result.failure_message.is_none());
    }

    #[tokio::test]
    async fn test_status_endpoint_error() {
        let (transport, _, orchestrator) = setup();
        transport
            .respond(HttpMethod::Post, "/deposits", 200, json!({"status": "ACCEPTED"}))
            .respond(HttpMethod::Get, "/deposits/op-1", 503, Value::Null);

        let result = orchestrator
            .execute(&deposit(), SchemaVersion::V1, Environment::Sandbox)
            .await;

        assert_eq!(result.status, TransactionStatus::Failed);
        assert_eq!(result.http_status, Some(503));
        assert!(result.message.contains("may still complete"));
    }

    #[tokio::test]
    async fn test_transport_error_becomes_failed_result() {
        let (transport, _, orchestrator) = setup();
        transport.fail(HttpMethod::Post, "/deposits", "connection refused");

        let result = orchestrator
            .execute(&deposit(), SchemaVersion::V1, Environment::Sandbox)
            .await;

        assert_eq!(result.status, TransactionStatus::Failed);
        assert!(result.message.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_v2_refund_defaults_currency() {
        let (transport, _, orchestrator) = setup();
        transport
            .respond(HttpMethod::Post, "/v2/refunds", 200, json!({"status": "ACCEPTED"}))
            .respond(HttpMethod::Get, "/v2/refunds/op-1", 200, json!({"status": "FOUND", "data": {"status": "COMPLETED"}}));

        let request = MoneyMovementRequest::refund("dep-7", "50", "");
        let result = orchestrator
            .execute_refund(&request, SchemaVersion::V2, Environment::Sandbox)
            .await;

        assert!(result.success());
        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["currency"], DEFAULT_REFUND_CURRENCY);
        assert_eq!(body["depositId"], "dep-7");
    }
}
