//! Reconciliation metrics

use prometheus::{register_counter_vec, register_int_gauge, CounterVec, IntGauge};

lazy_static::lazy_static! {
    pub static ref RECONCILIATIONS_TOTAL: CounterVec = register_counter_vec!(
        "momo_reconciliations_total",
        "Reconciliation passes by outcome",
        &["outcome"]
    )
    .unwrap();

    pub static ref VERSION_MISMATCHES_TOTAL: CounterVec = register_counter_vec!(
        "momo_feed_version_mismatches_total",
        "Feed version skew by corrective re-fetch result",
        &["resolution"]
    )
    .unwrap();

    pub static ref AVAILABLE_OPERATORS: IntGauge = register_int_gauge!(
        "momo_available_operators",
        "Operators available after the last reconciliation"
    )
    .unwrap();
}
