//! Availability feed normalization
//!
//! V1 lists `correspondents` whose `operationTypes` is an array of
//! `{operationType, status}`. V2 lists `providers` whose `operationTypes` is an
//! object keyed by operation type, valued by a bare status or a nested
//! `{operationType, status}`. Both collapse to the same entries.

use super::str_field;
use crate::{types::SchemaVersion, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Gateway token for an operation that accepts traffic
pub const OPERATIONAL: &str = "OPERATIONAL";

/// One operator + operation type availability fact
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityEntry {
    /// Correspondent / provider code
    pub operator_code: String,
    /// Country code as reported by the feed
    pub country: String,
    /// DEPOSIT, PAYOUT, REFUND, ...
    pub operation_type: String,
    /// Raw status token
    pub status: String,
    /// `status == OPERATIONAL`
    pub operational: bool,
}

/// Operation type and its status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    /// Operation type
    pub operation_type: String,
    /// Status token
    pub status: String,
}

/// Normalize an `operationTypes` value in either generation's shape
pub fn normalize_operation_types(raw: &Value) -> Vec<OperationStatus> {
    match raw {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                str_field(item, &["operationType"]).map(|op| OperationStatus {
                    operation_type: op.to_string(),
                    status: str_field(item, &["status"]).unwrap_or("UNKNOWN").to_string(),
                })
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter_map(|(op_type, value)| match value {
                Value::String(status) => Some(OperationStatus {
                    operation_type: op_type.clone(),
                    status: status.clone(),
                }),
                Value::Object(_) => Some(OperationStatus {
                    operation_type: str_field(value, &["operationType"])
                        .unwrap_or(op_type)
                        .to_string(),
                    status: str_field(value, &["status"]).unwrap_or("UNKNOWN").to_string(),
                }),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn operator_list(version: SchemaVersion, country: &Value) -> &[Value] {
    let keys = match version {
        SchemaVersion::V1 => ["correspondents", "providers"],
        SchemaVersion::V2 => ["providers", "correspondents"],
    };
    keys.iter()
        .find_map(|k| country.get(*k).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn operator_code(version: SchemaVersion, operator: &Value) -> String {
    let keys = match version {
        SchemaVersion::V1 => ["correspondent", "provider"],
        SchemaVersion::V2 => ["provider", "correspondent"],
    };
    str_field(operator, &keys).unwrap_or("N/A").to_string()
}

/// Flatten an availability payload into entries, in feed order
pub fn normalize_availability(version: SchemaVersion, payload: &Value) -> Result<Vec<AvailabilityEntry>> {
    let countries = payload
        .as_array()
        .ok_or_else(|| Error::Decode("availability payload must be an array of countries".into()))?;

    let mut entries = Vec::new();
    for country_item in countries {
        let country = str_field(country_item, &["country"]).unwrap_or("N/A");
        for operator in operator_list(version, country_item) {
            let code = operator_code(version, operator);
            let raw_ops = operator.get("operationTypes").unwrap_or(&Value::Null);
            for op in normalize_operation_types(raw_ops) {
                entries.push(AvailabilityEntry {
                    operator_code: code.clone(),
                    country: country.to_string(),
                    operational: op.status == OPERATIONAL,
                    operation_type: op.operation_type,
                    status: op.status,
                });
            }
        }
    }
    Ok(entries)
}

/// Availability keyed by operator, then operation type.
///
/// Built fresh from one normalization pass; a later entry for the same
/// operator and operation overwrites an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityIndex {
    operators: BTreeMap<String, BTreeMap<String, AvailabilityEntry>>,
}

impl AvailabilityIndex {
    /// Build from entries (last write wins)
    pub fn from_entries(entries: impl IntoIterator<Item = AvailabilityEntry>) -> Self {
        let mut operators: BTreeMap<String, BTreeMap<String, AvailabilityEntry>> = BTreeMap::new();
        for entry in entries {
            operators
                .entry(entry.operator_code.clone())
                .or_default()
                .insert(entry.operation_type.clone(), entry);
        }
        Self { operators }
    }

    /// Whether the feed mentions the operator at all
    pub fn contains(&self, operator_code: &str) -> bool {
        self.operators.contains_key(operator_code)
    }

    /// Operational only if listed with at least one operation, all OPERATIONAL
    pub fn is_operational(&self, operator_code: &str) -> bool {
        self.operators
            .get(operator_code)
            .map_or(false, |ops| !ops.is_empty() && ops.values().all(|e| e.operational))
    }

    /// Entries for one operator
    pub fn operations(&self, operator_code: &str) -> Vec<&AvailabilityEntry> {
        self.operators
            .get(operator_code)
            .map(|ops| ops.values().collect())
            .unwrap_or_default()
    }

    /// Number of distinct operators
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// No operators
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

/// One operator's operations inside a country report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderAvailability {
    /// Operator code
    pub code: String,
    /// Operations in feed order
    pub operations: Vec<OperationStatus>,
}

/// Availability grouped per country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryAvailability {
    /// Country code
    pub country: String,
    /// Operators in feed order
    pub providers: Vec<ProviderAvailability>,
}

/// Group flat entries per country and operator, preserving first-seen order
pub fn group_by_country(entries: &[AvailabilityEntry]) -> Vec<CountryAvailability> {
    let mut countries: Vec<CountryAvailability> = Vec::new();
    for entry in entries {
        let ci = match countries.iter().position(|c| c.country == entry.country) {
            Some(i) => i,
            None => {
                countries.push(CountryAvailability {
                    country: entry.country.clone(),
                    providers: Vec::new(),
                });
                countries.len() - 1
            }
        };
        let providers = &mut countries[ci].providers;
        let pi = match providers.iter().position(|p| p.code == entry.operator_code) {
            Some(i) => i,
            None => {
                providers.push(ProviderAvailability {
                    code: entry.operator_code.clone(),
                    operations: Vec::new(),
                });
                providers.len() - 1
            }
        };
        providers[pi].operations.push(OperationStatus {
            operation_type: entry.operation_type.clone(),
            status: entry.status.clone(),
        });
    }
    countries
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_v2_mixed_operation_types() {
        let raw = json!({
            "DEPOSIT": "OPERATIONAL",
            "PAYOUT": {"operationType": "PAYOUT", "status": "DELAYED"},
            "REFUND": {"status": "OPERATIONAL"},
            "IGNORED": 3
        });
        let ops = normalize_operation_types(&raw);
        assert_eq!(ops.len(), 3);
        assert!(ops.iter().any(|o| o.operation_type == "REFUND" && o.status == "OPERATIONAL"));
        assert!(ops.iter().any(|o| o.operation_type == "PAYOUT" && o.status == "DELAYED"));
    }

    #[test]
    fn test_last_write_wins() {
        let payload = json!([
            {"country": "UGA", "correspondents": [
                {"correspondent": "MTN_MOMO_UGA", "operationTypes": [
                    {"operationType": "DEPOSIT", "status": "CLOSED"},
                    {"operationType": "DEPOSIT", "status": "OPERATIONAL"}
                ]}
            ]}
        ]);
        let entries = normalize_availability(SchemaVersion::V1, &payload).unwrap();
        let index = AvailabilityIndex::from_entries(entries);
        assert_eq!(index.operations("MTN_MOMO_UGA").len(), 1);
        assert!(index.is_operational("MTN_MOMO_UGA"));
    }

    #[test]
    fn test_operator_without_operations_is_not_operational() {
        let payload = json!([{"country": "ZMB", "providers": [{"provider": "ZAMTEL_ZMB", "operationTypes": {}}]}]);
        let index = AvailabilityIndex::from_entries(normalize_availability(SchemaVersion::V2, &payload).unwrap());
        assert!(!index.is_operational("ZAMTEL_ZMB"));
        assert!(!index.is_operational("MISSING"));
    }

    #[test]
    fn test_rejects_non_array_payload() {
        assert!(normalize_availability(SchemaVersion::V2, &json!({"countries": []})).is_err());
    }

    #[test]
    fn test_group_by_country() {
        let payload = json!([
            {"country": "UGA", "providers": [
                {"provider": "MTN_MOMO_UGA", "operationTypes": {"DEPOSIT": "OPERATIONAL", "PAYOUT": "CLOSED"}},
                {"provider": "AIRTEL_OAPI_UGA", "operationTypes": {"DEPOSIT": "OPERATIONAL"}}
            ]},
            {"country": "ZMB", "providers": [
                {"provider": "MTN_MOMO_ZMB", "operationTypes": {"PAYOUT": "OPERATIONAL"}}
            ]}
        ]);
        let entries = normalize_availability(SchemaVersion::V2, &payload).unwrap();
        let report = group_by_country(&entries);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].providers.len(), 2);
        assert_eq!(report[0].providers[0].operations.len(), 2);
        assert_eq!(report[1].country, "ZMB");
    }
}
