//! Active-configuration feed normalization
//!
//! V1 lists `correspondents`, each with one `currency` and an
//! `operationTypes` array. V2 lists `providers`, each with `currencies[]`
//! whose `operationTypes` is an array or an object keyed by operation type.

use super::{scalar_field, str_field};
use crate::{types::SchemaVersion, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};

/// Per-operation limits and PIN prompt settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationLimits {
    /// `minAmount` / `minTransactionLimit`
    pub min: Option<String>,
    /// `maxAmount` / `maxTransactionLimit`
    pub max: Option<String>,
    /// Authorization type, e.g. PROVIDER_AUTH
    pub auth_type: Option<String>,
    /// MANUAL / AUTOMATIC
    pub pin_prompt: Option<String>,
    /// Whether the PIN prompt can be re-triggered
    pub pin_prompt_revivable: Option<bool>,
    /// Instructions with duplicate channels removed
    pub pin_prompt_instructions: Option<Value>,
    /// `decimalsInAmount` / `decimals`
    pub decimals: Option<String>,
}

impl OperationLimits {
    fn from_details(details: &Value) -> Self {
        Self {
            min: scalar_field(details, &["minAmount", "minTransactionLimit"]),
            max: scalar_field(details, &["maxAmount", "maxTransactionLimit"]),
            auth_type: str_field(details, &["authType"]).map(str::to_string),
            pin_prompt: str_field(details, &["pinPrompt"]).map(str::to_string),
            pin_prompt_revivable: details.get("pinPromptRevivable").and_then(truthy),
            pin_prompt_instructions: details
                .get("pinPromptInstructions")
                .filter(|v| !v.is_null())
                .cloned()
                .map(dedupe_pin_prompt_instructions),
            decimals: scalar_field(details, &["decimalsInAmount", "decimals"]),
        }
    }
}

fn truthy(value: &Value) -> Option<bool> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().map_or(false, |f| f != 0.0)),
        Value::String(s) => Some(!s.is_empty()),
        _ => Some(true),
    }
}

/// Configured operator inside one country
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveConfigEntry {
    /// Correspondent / provider code
    pub operator_code: String,
    /// Country code
    pub country: String,
    /// Display name
    pub display_name: Option<String>,
    /// Name shown to the customer
    pub owner_name: Option<String>,
    /// Logo URL
    pub logo: Option<String>,
    /// Distinct currencies, in feed order
    pub currencies: Vec<String>,
    /// Limits keyed by operation type
    pub operations: BTreeMap<String, OperationLimits>,
}

/// Normalized active configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveConfig {
    /// Merchant name
    pub merchant_name: Option<String>,
    /// Company name
    pub company_name: Option<String>,
    /// Country code to operator code to entry
    pub entries: BTreeMap<String, BTreeMap<String, ActiveConfigEntry>>,
}

impl ActiveConfig {
    /// Entry for an operator in a country
    pub fn get(&self, country: &str, operator_code: &str) -> Option<&ActiveConfigEntry> {
        self.entries.get(country).and_then(|ops| ops.get(operator_code))
    }

    /// Whether any country configures the operator
    pub fn contains(&self, operator_code: &str) -> bool {
        self.entries.values().any(|ops| ops.contains_key(operator_code))
    }

    /// First entry for an operator across all countries
    pub fn find(&self, operator_code: &str) -> Option<&ActiveConfigEntry> {
        self.entries.values().find_map(|ops| ops.get(operator_code))
    }

    /// Total configured operators
    pub fn operator_count(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }
}

/// Drop PIN-prompt channels that repeat an earlier one.
///
/// Two channels are duplicates when type, display name, quick link,
/// variables and English instruction texts all match. Values without a
/// `channels` array pass through untouched.
pub fn dedupe_pin_prompt_instructions(mut instructions: Value) -> Value {
    let Some(channels) = instructions.get_mut("channels").and_then(Value::as_array_mut) else {
        return instructions;
    };

    let mut seen = HashSet::new();
    channels.retain(|channel| {
        let texts: Vec<Value> = channel
            .pointer("/instructions/en")
            .and_then(Value::as_array)
            .map(|lines| {
                lines
                    .iter()
                    .map(|line| line.get("text").cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .unwrap_or_default();
        let signature = json!({
            "t": channel.get("type"),
            "d": channel.get("displayName"),
            "q": channel.get("quickLink"),
            "v": channel.get("variables"),
            "s": texts,
        })
        .to_string();
        seen.insert(signature)
    });
    instructions
}

fn push_unique(currencies: &mut Vec<String>, currency: Option<&str>) {
    if let Some(c) = currency {
        if !currencies.iter().any(|existing| existing == c) {
            currencies.push(c.to_string());
        }
    }
}

fn collect_operations(block: &Value, operations: &mut BTreeMap<String, OperationLimits>) {
    match block {
        Value::Array(items) => {
            for item in items {
                match str_field(item, &["operationType"]) {
                    Some(op_type) => {
                        operations.insert(op_type.to_string(), OperationLimits::from_details(item));
                    }
                    None => collect_operations(item, operations),
                }
            }
        }
        Value::Object(map) => {
            for (op_type, details) in map {
                if details.is_object() {
                    operations.insert(op_type.clone(), OperationLimits::from_details(details));
                }
            }
        }
        _ => {}
    }
}

/// Normalize an active-configuration payload
pub fn normalize_active_config(version: SchemaVersion, payload: &Value) -> Result<ActiveConfig> {
    if !payload.is_object() {
        return Err(Error::Decode(
            "active configuration payload must be an object".into(),
        ));
    }

    let mut config = ActiveConfig {
        merchant_name: str_field(payload, &["merchantName"]).map(str::to_string),
        company_name: str_field(payload, &["companyName"]).map(str::to_string),
        entries: BTreeMap::new(),
    };

    let countries = payload
        .get("countries")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    for country_item in countries {
        let country = str_field(country_item, &["country"]).unwrap_or("N/A").to_string();
        let correspondents = country_item.get("correspondents").and_then(Value::as_array);
        let providers = country_item.get("providers").and_then(Value::as_array);

        // Shape decides; the declared version only breaks a tie when both lists appear
        let (operators, v1_shape) = match (correspondents, providers, version) {
            (Some(list), None, _) | (Some(list), Some(_), SchemaVersion::V1) => (list, true),
            (_, Some(list), _) => (list, false),
            (None, None, _) => continue,
        };

        let by_code = config.entries.entry(country.clone()).or_default();
        for operator in operators {
            let code = str_field(operator, &["correspondent", "provider"])
                .unwrap_or("N/A")
                .to_string();
            let mut entry = ActiveConfigEntry {
                operator_code: code.clone(),
                country: country.clone(),
                display_name: str_field(operator, &["displayName"]).map(str::to_string),
                owner_name: str_field(operator, &["ownerName", "nameDisplayedToCustomer"])
                    .map(str::to_string),
                logo: str_field(operator, &["logo"]).map(str::to_string),
                ..Default::default()
            };

            if v1_shape {
                push_unique(&mut entry.currencies, str_field(operator, &["currency"]));
                if let Some(block) = operator.get("operationTypes") {
                    collect_operations(block, &mut entry.operations);
                }
            } else {
                let currencies = operator
                    .get("currencies")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                for currency in currencies {
                    push_unique(&mut entry.currencies, str_field(currency, &["currency"]));
                    if let Some(block) = currency.get("operationTypes") {
                        collect_operations(block, &mut entry.operations);
                    }
                }
            }

            by_code.insert(code, entry);
        }
    }

    Ok(config)
}
