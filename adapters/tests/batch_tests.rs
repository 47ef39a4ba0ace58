//! Batch payout scenarios against a scripted gateway
//!
//! Time is paused, so settle delays advance the virtual clock instantly.

use momo_adapters::{
    BatchPayoutCoordinator, HttpMethod, PayoutRecipient, ScriptedTransport,
    TransactionOrchestrator,
};
use momo_protocol::{Environment, SchemaVersion, SequentialIdGenerator, TransactionStatus};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const SETTLE: Duration = Duration::from_secs(2);

fn coordinator(transport: &Arc<ScriptedTransport>) -> BatchPayoutCoordinator {
    let orchestrator = Arc::new(TransactionOrchestrator::new(
        transport.clone(),
        Arc::new(SequentialIdGenerator::new("payout")),
    ));
    BatchPayoutCoordinator::new(orchestrator, SETTLE)
}

fn recipient(msisdn: &str) -> PayoutRecipient {
    PayoutRecipient {
        correspondent: Some("MTN_MOMO_UGA".into()),
        ..PayoutRecipient::new(msisdn, "1000", "UGX", "")
    }
}

fn completed(id: &str) -> serde_json::Value {
    json!([{"payoutId": id, "status": "COMPLETED"}])
}

#[tokio::test(start_paused = true)]
async fn test_failing_recipient_is_isolated() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .respond(HttpMethod::Post, "/payouts", 200, json!({"status": "ACCEPTED"}))
        .fail(HttpMethod::Post, "/payouts", "connection reset by peer")
        .respond(HttpMethod::Post, "/payouts", 200, json!({"status": "ACCEPTED"}))
        .respond(HttpMethod::Get, "/payouts/payout-1", 200, completed("payout-1"))
        .respond(HttpMethod::Get, "/payouts/payout-3", 200, completed("payout-3"));

    let recipients = vec![
        recipient("256700000001"),
        recipient("256700000002"),
        recipient("256700000003"),
    ];

    let start = Instant::now();
    let batch = coordinator(&transport)
        .execute_batch(&recipients, SchemaVersion::V1, Environment::Sandbox)
        .await;

    assert_eq!(batch.results.len(), 3);
    assert_eq!(batch.total_recipients, 3);
    assert_eq!(batch.successful_count, 2);
    assert_eq!(batch.failed_count, 1);
    assert!(!batch.overall_success);
    assert_eq!(batch.message, "Payout processing completed. 2 successful and 1 failed.");

    assert!(batch.results[0].success);
    assert!(!batch.results[1].success);
    assert!(batch.results[1].details.starts_with("Payout processing error:"));
    assert!(batch.results[1].error.as_deref().unwrap().contains("connection reset"));
    assert!(batch.results[2].success);
    assert_eq!(batch.results[2].payout_id.as_deref(), Some("payout-3"));

    // Recipient 2 never reached its settle delay
    assert_eq!(transport.count(HttpMethod::Get, "/payouts/payout-2"), 0);
    assert!(start.elapsed() >= SETTLE * 2);
    assert!(start.elapsed() < SETTLE * 3);
}

#[tokio::test(start_paused = true)]
async fn test_pending_counts_as_failed() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .respond(HttpMethod::Post, "/payouts", 200, json!({"status": "ACCEPTED"}))
        .respond(HttpMethod::Get, "/payouts/payout-1", 200, json!([{"status": "SUBMITTED"}]));

    let batch = coordinator(&transport)
        .execute_batch(&[recipient("256700000001")], SchemaVersion::V1, Environment::Sandbox)
        .await;

    let entry = &batch.results[0];
    assert!(!entry.success);
    assert_eq!(entry.status, Some(TransactionStatus::Processing));
    assert_eq!(entry.error.as_deref(), Some("Unknown error or Pending"));
    assert!(entry.details.ends_with("[v=v1]"));
}

#[tokio::test(start_paused = true)]
async fn test_per_recipient_version_override() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .respond(HttpMethod::Post, "/v2/payouts", 200, json!({"status": "ACCEPTED"}))
        .respond(HttpMethod::Get, "/v2/payouts/payout-1", 200, json!({"status": "FOUND", "data": {"status": "COMPLETED"}}))
        .respond(HttpMethod::Post, "/payouts", 200, json!({"status": "ACCEPTED"}))
        .respond(HttpMethod::Get, "/payouts/payout-2", 200, completed("payout-2"));

    let recipients = vec![
        PayoutRecipient {
            api_version: Some("v2".into()),
            country: Some("Uganda".into()),
            ..recipient("256700000001")
        },
        PayoutRecipient {
            api_version: Some("v9".into()),
            ..recipient("256700000002")
        },
    ];

    let batch = coordinator(&transport)
        .execute_batch(&recipients, SchemaVersion::V2, Environment::Sandbox)
        .await;

    assert!(batch.overall_success);
    assert_eq!(batch.results[0].version, SchemaVersion::V2);
    assert_eq!(batch.results[0].country_iso3.as_deref(), Some("UGA"));
    assert_eq!(batch.results[1].version, SchemaVersion::V1);

    let requests = transport.requests();
    let v2_body = requests[0].body.as_ref().unwrap();
    assert_eq!(v2_body["recipient"]["accountDetails"]["provider"], "MTN_MOMO_UGA");
    let v1_body = requests[2].body.as_ref().unwrap();
    assert_eq!(v1_body["statementDescription"], "Payout to customer");
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_batch_keeps_input_order() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond(HttpMethod::Post, "/payouts", 200, json!({"status": "ACCEPTED"}));
    for id in 1..=4 {
        let path = format!("/payouts/payout-{}", id);
        transport.respond(HttpMethod::Get, &path, 200, completed(&format!("payout-{}", id)));
    }

    let recipients: Vec<_> = (1..=4).map(|i| recipient(&format!("25670000000{}", i))).collect();

    let start = Instant::now();
    let batch = coordinator(&transport)
        .with_concurrency(4)
        .execute_batch(&recipients, SchemaVersion::V1, Environment::Sandbox)
        .await;

    assert!(batch.overall_success);
    let indices: Vec<_> = batch.results.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    let msisdns: Vec<_> = batch
        .results
        .iter()
        .map(|r| r.recipient_msisdn.clone().unwrap())
        .collect();
    assert_eq!(msisdns[3], "256700000004");
    assert!(start.elapsed() < SETTLE * 2);
}

#[tokio::test(start_paused = true)]
async fn test_v2_recipient_without_provider_fails_validation() {
    let transport = Arc::new(ScriptedTransport::new());
    let recipients = vec![PayoutRecipient::new("256700000001", "1000", "UGX", "")];

    let batch = coordinator(&transport)
        .execute_batch(&recipients, SchemaVersion::V2, Environment::Sandbox)
        .await;

    assert_eq!(batch.failed_count, 1);
    assert!(batch.results[0].error.as_deref().unwrap().contains("provider"));
    assert!(transport.requests().is_empty());
}
