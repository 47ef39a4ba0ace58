//! Gateway failure and rejection codes mapped to human-readable messages

/// Message used for codes missing from the table
pub const DEFAULT_FAILURE_MESSAGE: &str =
    "The transaction could not be completed. Please try again or contact support.";

/// Look up the message for a failure or rejection code
pub fn failure_message(code: &str) -> &'static str {
    match code.trim().to_ascii_uppercase().as_str() {
        // Transaction failures
        "PAYER_NOT_FOUND" => "The phone number does not belong to the selected mobile money operator.",
        "PAYMENT_NOT_APPROVED" => "The payer did not approve the payment in time.",
        "PAYER_LIMIT_REACHED" => "The payer has reached a wallet transaction limit.",
        "PAYMENT_IN_PROGRESS" => "The payer already has a payment in progress.",
        "INSUFFICIENT_BALANCE" => "The wallet does not have enough funds for this transaction.",
        "TRANSACTION_ALREADY_IN_PROCESS" => "A transaction for this payer is already being processed.",
        "WALLET_LIMIT_REACHED" => "The wallet has reached its balance or transaction limit.",
        "RECIPIENT_NOT_FOUND" => "The recipient phone number is not registered with the operator.",
        "RECIPIENT_NOT_ALLOWED_TO_RECEIVE" => "The recipient is not allowed to receive this payout.",
        "MANUALLY_CANCELLED" => "The transaction was cancelled.",
        "NO_CALLBACK" => "The operator did not confirm the transaction in time.",
        "UNSPECIFIED_FAILURE" => "The operator reported an unspecified failure.",
        "UNKNOWN_ERROR" | "OTHER_ERROR" => "An unknown error occurred while processing the transaction.",

        // Initiation rejections
        "AUTHENTICATION_ERROR" => "The API token is missing or invalid.",
        "AUTHORISATION_ERROR" => "The API token is not allowed to perform this operation.",
        "INVALID_INPUT" => "The request contains invalid input.",
        "INVALID_AMOUNT" => "The amount is not valid for this operator.",
        "AMOUNT_TOO_SMALL" => "The amount is below the operator minimum.",
        "AMOUNT_TOO_LARGE" => "The amount is above the operator maximum.",
        "AMOUNT_OUT_OF_BOUNDS" => "The amount is outside the allowed limits.",
        "INVALID_CURRENCY" => "The currency is not supported by this operator.",
        "INVALID_PHONE_NUMBER" | "INVALID_PAYER_FORMAT" | "INVALID_RECIPIENT_FORMAT" => {
            "The phone number format is not valid."
        }
        "INVALID_CORRESPONDENT" | "INVALID_PROVIDER" => "The mobile money operator is not valid.",
        "CORRESPONDENT_TEMPORARILY_UNAVAILABLE" | "PROVIDER_TEMPORARILY_UNAVAILABLE" => {
            "The mobile money operator is temporarily unavailable."
        }
        "DEPOSITS_NOT_ALLOWED" => "Deposits are not enabled for this operator.",
        "PAYOUTS_NOT_ALLOWED" => "Payouts are not enabled for this operator.",
        "REFUNDS_NOT_ALLOWED" => "Refunds are not enabled for this operator.",
        "DUPLICATE_METADATA_FIELD" => "Metadata contains a duplicate field name.",
        "DEPOSIT_NOT_FOUND" => "The deposit to refund was not found.",
        "DEPOSIT_NOT_COMPLETED" => "Only completed deposits can be refunded.",
        "ALREADY_REFUNDED" => "The deposit has already been refunded.",
        "INVALID_STATEMENT_DESCRIPTION" | "INVALID_CUSTOMER_MESSAGE" => {
            "The description contains unsupported characters or is too long."
        }

        _ => DEFAULT_FAILURE_MESSAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_code() {
        assert!(failure_message("INSUFFICIENT_BALANCE").contains("enough funds"));
        assert_ne!(failure_message("payer_not_found"), DEFAULT_FAILURE_MESSAGE);
    }

    #[test]
    fn test_unknown_code_falls_back() {
        assert_eq!(failure_message("SOMETHING_NEW"), DEFAULT_FAILURE_MESSAGE);
        assert_eq!(failure_message(""), DEFAULT_FAILURE_MESSAGE);
    }
}
