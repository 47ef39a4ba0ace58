//! Schema normalizer: V1/V2 gateway bodies to the canonical model
//!
//! Every function here is pure; the same body always yields the same value.

pub mod active_config;
pub mod availability;
pub mod status;

pub use active_config::{
    dedupe_pin_prompt_instructions, normalize_active_config, ActiveConfig, ActiveConfigEntry,
    OperationLimits,
};
pub use availability::{
    group_by_country, normalize_availability, normalize_operation_types, AvailabilityEntry,
    AvailabilityIndex, CountryAvailability, OperationStatus, ProviderAvailability,
};
pub use status::{
    classify_status, extract_failure, failure_or_default, FailureDetails, StatusEnvelope,
};

use serde_json::Value;

/// First string-valued key among `keys`
pub(crate) fn str_field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| value.get(*k))
        .find_map(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// First scalar (string, number or bool) among `keys`, rendered as a string
pub(crate) fn scalar_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().filter_map(|k| value.get(*k)).find_map(|v| match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}
