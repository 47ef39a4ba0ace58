//! Gateway and orchestrator metrics

use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

lazy_static::lazy_static! {
    pub static ref OPERATIONS_TOTAL: CounterVec = register_counter_vec!(
        "momo_operations_total",
        "Money-movement operations by outcome",
        &["kind", "version", "status"]
    )
    .unwrap();

    pub static ref GATEWAY_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "momo_gateway_request_duration_seconds",
        "Gateway request duration",
        &["method", "environment"]
    )
    .unwrap();

    pub static ref BATCH_RECIPIENTS_TOTAL: CounterVec = register_counter_vec!(
        "momo_batch_recipients_total",
        "Batch payout recipients by outcome",
        &["version", "outcome"]
    )
    .unwrap();
}
