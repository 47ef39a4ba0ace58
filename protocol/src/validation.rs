//! Request validation, applied before any network call
//!
//! - Amount: positive decimal, at most 18 integer and 2 fraction digits
//! - Description: 1-22 ASCII letters, digits and spaces
//! - MSISDN: digits only
//! - Metadata: bounded count, named fields, non-blank values

use crate::{
    types::*, ValidationError, MAX_AMOUNT_INTEGER_DIGITS, MAX_DESCRIPTION_LENGTH,
    MAX_METADATA_ITEMS,
};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

lazy_static! {
    static ref AMOUNT_RE: Regex = Regex::new(r"^[0-9]+(\.[0-9]{1,2})?$").expect("amount regex");
    static ref DESCRIPTION_RE: Regex =
        Regex::new(r"^[A-Za-z0-9 ]{1,22}$").expect("description regex");
    static ref MSISDN_RE: Regex = Regex::new(r"^[0-9]+$").expect("msisdn regex");
    static ref METADATA_NAME_RE: Regex =
        Regex::new(r"^[A-Za-z0-9_ ]+$").expect("metadata name regex");
}

type ValidationResult<T> = Result<T, ValidationError>;

/// Wire name of the operator field for a version
pub fn operator_field(version: SchemaVersion) -> &'static str {
    match version {
        SchemaVersion::V1 => "correspondent",
        SchemaVersion::V2 => "provider",
    }
}

/// Wire name of the description field for a version
pub fn description_field(version: SchemaVersion) -> &'static str {
    match version {
        SchemaVersion::V1 => "statementDescription",
        SchemaVersion::V2 => "customerMessage",
    }
}

/// Wire name of the counterparty phone field for a kind
fn msisdn_field(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Payout => "recipientMsisdn",
        _ => "payerMsisdn",
    }
}

/// Validate an amount string and return its decimal value
pub fn validate_amount(amount: &str) -> ValidationResult<Decimal> {
    if amount.trim().is_empty() {
        return Err(ValidationError::field("amount", "This value should not be blank."));
    }

    let integer_digits = amount.split('.').next().map(str::len).unwrap_or(0);
    if !AMOUNT_RE.is_match(amount) || integer_digits > MAX_AMOUNT_INTEGER_DIGITS {
        return Err(ValidationError::field(
            "amount",
            format!(
                "The amount '{}' is invalid. The amount must be a number with up to {} digits before the decimal point and up to 2 decimal places.",
                amount, MAX_AMOUNT_INTEGER_DIGITS
            ),
        ));
    }

    let value = Decimal::from_str(amount).map_err(|e| {
        ValidationError::field("amount", format!("The amount '{}' is invalid: {}", amount, e))
    })?;

    if value <= Decimal::ZERO {
        return Err(ValidationError::field("amount", "This value should be positive."));
    }

    Ok(value)
}

/// Strip unsupported characters and truncate to the allowed length
pub fn suggest_description(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .take(MAX_DESCRIPTION_LENGTH)
        .collect()
}

/// Validate a statement description / customer message
pub fn validate_description(description: &str, field: &str) -> ValidationResult<()> {
    if DESCRIPTION_RE.is_match(description) {
        return Ok(());
    }

    let suggestion = suggest_description(description);
    let mut message = format!(
        "Invalid {}. Only letters, numbers and spaces allowed (max {} characters).",
        field, MAX_DESCRIPTION_LENGTH
    );
    if !suggestion.trim().is_empty() && suggestion != description {
        message.push_str(&format!(" Suggested correction: '{}'", suggestion));
    }
    Err(ValidationError::field(field, message))
}

/// Validate a phone number (digits only, no leading +)
pub fn validate_msisdn(msisdn: &str, field: &str) -> ValidationResult<()> {
    if MSISDN_RE.is_match(msisdn) {
        Ok(())
    } else {
        Err(ValidationError::field(
            field,
            format!("Invalid {}. Only digits are allowed.", field),
        ))
    }
}

/// Validate metadata count and field contents
pub fn validate_metadata(metadata: &[MetadataField], max_items: usize) -> ValidationResult<()> {
    if metadata.len() > max_items {
        return Err(ValidationError::field(
            "metadata",
            format!(
                "Number of metadata items must not be more than {}. You provided {} items.",
                max_items,
                metadata.len()
            ),
        ));
    }

    for field in metadata {
        if field.field_name.trim().is_empty() {
            return Err(ValidationError::field("metadata", "Metadata field name cannot be blank."));
        }
        if !METADATA_NAME_RE.is_match(&field.field_name) {
            return Err(ValidationError::field(
                "metadata",
                "Metadata field name can only contain alphanumeric characters, underscores, and spaces.",
            ));
        }
        if field.field_value.trim().is_empty() {
            return Err(ValidationError::field(
                "metadata",
                format!("Metadata field value for '{}' cannot be blank.", field.field_name),
            ));
        }
    }

    Ok(())
}

/// Validate a canonical request for the given API generation
pub fn validate_request(request: &MoneyMovementRequest, version: SchemaVersion) -> ValidationResult<()> {
    match request.kind {
        OperationKind::Refund => validate_refund(request),
        OperationKind::Deposit | OperationKind::Payout => validate_transfer(request, version),
    }
}

fn validate_transfer(request: &MoneyMovementRequest, version: SchemaVersion) -> ValidationResult<()> {
    let msisdn_field = msisdn_field(request.kind);
    let operator_field = operator_field(version);
    let description_field = description_field(version);
    // V2 payouts may omit the customer message entirely
    let description_required =
        !(request.kind == OperationKind::Payout && version == SchemaVersion::V2);

    let mut missing = Vec::new();
    if request.amount.trim().is_empty() {
        missing.push("amount".to_string());
    }
    if request.currency.trim().is_empty() {
        missing.push("currency".to_string());
    }
    if request.counterparty_msisdn.trim().is_empty() {
        missing.push(msisdn_field.to_string());
    }
    if request.operator_code.trim().is_empty() {
        missing.push(operator_field.to_string());
    }
    if description_required && request.description.is_empty() {
        missing.push(description_field.to_string());
    }
    if !missing.is_empty() {
        return Err(ValidationError::missing(missing));
    }

    validate_amount(&request.amount)?;
    validate_msisdn(&request.counterparty_msisdn, msisdn_field)?;
    if !request.description.is_empty() {
        validate_description(&request.description, description_field)?;
    }
    validate_metadata(&request.metadata, MAX_METADATA_ITEMS)
}

fn validate_refund(request: &MoneyMovementRequest) -> ValidationResult<()> {
    let mut missing = Vec::new();
    if request
        .parent_operation_id
        .as_deref()
        .map_or(true, |id| id.trim().is_empty())
    {
        missing.push("depositId".to_string());
    }
    if request.amount.trim().is_empty() {
        missing.push("amount".to_string());
    }
    if !missing.is_empty() {
        return Err(ValidationError::missing(missing));
    }

    validate_amount(&request.amount)?;
    validate_metadata(&request.metadata, MAX_METADATA_ITEMS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deposit() -> MoneyMovementRequest {
        MoneyMovementRequest::deposit("100.00", "UGX", "256783456789", "MTN_MOMO_UGA", "Payment for order")
    }

    #[test]
    fn test_amount_rules() {
        assert!(validate_amount("5").is_ok());
        assert!(validate_amount("5.00").is_ok());
        assert!(validate_amount("0.5").is_ok());
        assert!(validate_amount("5.555").is_err());
        assert!(validate_amount(".5").is_err());
        assert!(validate_amount("-1").is_err());
        assert!(validate_amount("5555555555555555555").is_err());
        assert!(validate_amount("555555555555555555").is_ok());

        let err = validate_amount("0").unwrap_err();
        assert_eq!(err.message, "This value should be positive.");
        let err = validate_amount("").unwrap_err();
        assert_eq!(err.fields, vec!["amount".to_string()]);
    }

    #[test]
    fn test_description_suggestion() {
        let err = validate_description("Invalid@Input#", "statementDescription").unwrap_err();
        assert!(err.message.contains("Suggested correction: 'InvalidInput'"));
        assert_eq!(err.fields, vec!["statementDescription".to_string()]);
    }

    #[test]
    fn test_missing_fields_are_named_per_version() {
        let mut request = deposit();
        request.operator_code.clear();
        request.description.clear();

        let err = validate_request(&request, SchemaVersion::V1).unwrap_err();
        assert_eq!(err.fields, vec!["correspondent", "statementDescription"]);

        let err = validate_request(&request, SchemaVersion::V2).unwrap_err();
        assert_eq!(err.fields, vec!["provider", "customerMessage"]);
    }

    #[test]
    fn test_v2_payout_message_is_optional() {
        let request = MoneyMovementRequest::payout("10", "ZMW", "260971234567", "MTN_MOMO_ZMB", "");
        assert!(validate_request(&request, SchemaVersion::V2).is_ok());
        assert!(validate_request(&request, SchemaVersion::V1).is_err());
    }

    #[test]
    fn test_metadata_limit() {
        let metadata = (0..11)
            .map(|i| MetadataField::new(format!("item{}", i), "value"))
            .collect::<Vec<_>>();
        let err = validate_request(&deposit().with_metadata(metadata), SchemaVersion::V1).unwrap_err();
        assert!(err.message.contains("You provided 11 items"));
    }

    #[test]
    fn test_metadata_value_may_hold_email() {
        let metadata = vec![MetadataField::new("customerId", "customer@email.com").pii()];
        assert!(validate_request(&deposit().with_metadata(metadata), SchemaVersion::V2).is_ok());
    }

    #[test]
    fn test_refund_requires_deposit_id() {
        let mut request = MoneyMovementRequest::refund("", "50", "UGX");
        let err = validate_request(&request, SchemaVersion::V1).unwrap_err();
        assert_eq!(err.fields, vec!["depositId"]);

        request.parent_operation_id = Some("3f1c".to_string());
        assert!(validate_request(&request, SchemaVersion::V1).is_ok());
    }
}
