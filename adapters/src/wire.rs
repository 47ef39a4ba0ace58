//! Version-specific endpoint paths and request bodies
//!
//! | Concept     | V1                                  | V2                                          |
//! |-------------|-------------------------------------|---------------------------------------------|
//! | operator    | `correspondent`                     | `payer/recipient.accountDetails.provider`   |
//! | description | `statementDescription`              | `customerMessage`                           |
//! | party       | `{type: MSISDN, address: {value}}`  | `{type: MMO, accountDetails: {phoneNumber}}`|
//! | metadata    | `[{fieldName, fieldValue, isPII}]`  | `[{<name>: <value>, isPII}]`                |

use chrono::{DateTime, SecondsFormat, Utc};
use momo_protocol::{
    validation::description_field, MetadataField, MoneyMovementRequest, OperationKind,
    SchemaVersion,
};
use serde_json::{json, Map, Value};

fn prefix(version: SchemaVersion) -> &'static str {
    match version {
        SchemaVersion::V1 => "",
        SchemaVersion::V2 => "/v2",
    }
}

/// Initiation endpoint, e.g. `/deposits` or `/v2/payouts`
pub fn initiate_path(kind: OperationKind, version: SchemaVersion) -> String {
    format!("{}/{}", prefix(version), kind.collection())
}

/// Status endpoint for one operation
pub fn status_path(kind: OperationKind, version: SchemaVersion, operation_id: &str) -> String {
    format!("{}/{}/{}", prefix(version), kind.collection(), operation_id)
}

/// Operator availability feed
pub fn availability_path(version: SchemaVersion) -> String {
    format!("{}/availability", prefix(version))
}

/// Merchant active-configuration feed
pub fn active_config_path(version: SchemaVersion) -> String {
    format!("{}/active-conf", prefix(version))
}

/// Hosted payment-page session endpoint
pub fn payment_page_path(version: SchemaVersion) -> &'static str {
    match version {
        SchemaVersion::V1 => "/v1/widget/sessions",
        SchemaVersion::V2 => "/v2/paymentpage",
    }
}

/// Metadata list in the generation's wire shape
pub fn metadata_body(version: SchemaVersion, metadata: &[MetadataField]) -> Value {
    let items = metadata
        .iter()
        .map(|field| match version {
            SchemaVersion::V1 => {
                let mut item = json!({
                    "fieldName": field.field_name,
                    "fieldValue": field.field_value,
                });
                if let Some(pii) = field.is_pii {
                    item["isPII"] = Value::Bool(pii);
                }
                item
            }
            SchemaVersion::V2 => {
                let mut item = Map::new();
                item.insert(field.field_name.clone(), Value::String(field.field_value.clone()));
                if let Some(pii) = field.is_pii {
                    item.insert("isPII".to_string(), Value::Bool(pii));
                }
                Value::Object(item)
            }
        })
        .collect();
    Value::Array(items)
}

fn party(version: SchemaVersion, msisdn: &str, operator_code: &str) -> Value {
    match version {
        SchemaVersion::V1 => json!({
            "type": "MSISDN",
            "address": {"value": msisdn},
        }),
        SchemaVersion::V2 => json!({
            "type": "MMO",
            "accountDetails": {"phoneNumber": msisdn, "provider": operator_code},
        }),
    }
}

/// Initiation body for a validated request
pub fn initiate_body(
    request: &MoneyMovementRequest,
    operation_id: &str,
    version: SchemaVersion,
    now: DateTime<Utc>,
) -> Value {
    let mut body = Map::new();
    body.insert(request.kind.id_field().to_string(), json!(operation_id));
    body.insert("amount".to_string(), json!(request.amount));

    match request.kind {
        OperationKind::Refund => {
            if let Some(deposit_id) = &request.parent_operation_id {
                body.insert("depositId".to_string(), json!(deposit_id));
            }
            if version == SchemaVersion::V2 && !request.currency.is_empty() {
                body.insert("currency".to_string(), json!(request.currency));
            }
        }
        OperationKind::Deposit | OperationKind::Payout => {
            let party_field = match request.kind {
                OperationKind::Payout => "recipient",
                _ => "payer",
            };
            body.insert("currency".to_string(), json!(request.currency));
            body.insert(
                party_field.to_string(),
                party(version, &request.counterparty_msisdn, &request.operator_code),
            );
            if version == SchemaVersion::V1 {
                body.insert("correspondent".to_string(), json!(request.operator_code));
                body.insert(
                    "customerTimestamp".to_string(),
                    json!(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
                );
            }
            if !request.description.is_empty() {
                body.insert(description_field(version).to_string(), json!(request.description));
            }
        }
    }

    if !request.metadata.is_empty() {
        body.insert("metadata".to_string(), metadata_body(version, &request.metadata));
    }

    Value::Object(body)
}
