//! Argument validation shared by every entry point.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::config::{MAX_ID_LENGTH, MIN_ID_LENGTH, MIN_OWNER_ID_LENGTH};
use crate::error::{WalletError, WalletResult};
use crate::model::Metadata;

/// Checks a wallet id: non-empty, 3 to 64 bytes, no control characters.
pub fn validate_wallet_id(wallet_id: &str) -> WalletResult<()> {
    validate_id("wallet ID", wallet_id)
}

/// Checks a gens id with the same bounds as a wallet id.
pub fn validate_gens_id(gens_id: &str) -> WalletResult<()> {
    validate_id("gens ID", gens_id)
}

fn validate_id(what: &str, id: &str) -> WalletResult<()> {
    if id.is_empty() {
        return Err(WalletError::InvalidInput(format!("{what} cannot be empty")));
    }
    if id.len() < MIN_ID_LENGTH {
        return Err(WalletError::InvalidInput(format!(
            "{what} must be at least {MIN_ID_LENGTH} characters"
        )));
    }
    if id.len() > MAX_ID_LENGTH {
        return Err(WalletError::InvalidInput(format!(
            "{what} must not exceed {MAX_ID_LENGTH} characters"
        )));
    }
    reject_control_characters(what, id)
}

/// Ids become world-state keys and `\0` opens the composite keyspace.
fn reject_control_characters(what: &str, id: &str) -> WalletResult<()> {
    if id.chars().any(char::is_control) {
        return Err(WalletError::InvalidInput(format!(
            "{what} must not contain control characters"
        )));
    }
    Ok(())
}

/// Checks an owner id: non-empty, at least 3 bytes, no control characters.
pub fn validate_owner_id(owner_id: &str) -> WalletResult<()> {
    if owner_id.is_empty() {
        return Err(WalletError::InvalidInput("owner ID cannot be empty".into()));
    }
    if owner_id.len() < MIN_OWNER_ID_LENGTH {
        return Err(WalletError::InvalidInput(format!(
            "owner ID must be at least {MIN_OWNER_ID_LENGTH} characters"
        )));
    }
    reject_control_characters("owner ID", owner_id)
}

/// Rejects zero and negative amounts.
pub fn validate_positive_amount(amount: Decimal) -> WalletResult<()> {
    if amount <= Decimal::ZERO {
        return Err(WalletError::InvalidInput(
            "amount must be greater than zero".into(),
        ));
    }
    Ok(())
}

/// Parses a decimal argument such as `"100"` or `"12.50"`.
pub fn parse_amount(raw: &str) -> WalletResult<Decimal> {
    Decimal::from_str(raw.trim())
        .map_err(|e| WalletError::InvalidInput(format!("invalid amount {raw:?}: {e}")))
}

/// Parses a metadata argument. Blank input and JSON `null` both mean `{}`.
pub fn parse_metadata(raw: &str) -> WalletResult<Metadata> {
    if raw.trim().is_empty() {
        return Ok(Metadata::new());
    }
    let parsed: Option<Metadata> = serde_json::from_str(raw)
        .map_err(|e| WalletError::Serialization(format!("failed to parse metadata: {e}")))?;
    Ok(parsed.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn wallet_id_bounds() {
        assert!(validate_wallet_id("W1").is_err());
        assert!(validate_wallet_id("").is_err());
        assert!(validate_wallet_id("W01").is_ok());
        assert!(validate_wallet_id(&"x".repeat(64)).is_ok());
        let err = validate_wallet_id(&"x".repeat(65)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn ids_reject_control_characters() {
        for id in ["\u{0}gens\u{0}bern\u{0}", "W1\u{0}", "W01\n", "ab\u{7f}"] {
            let err = validate_wallet_id(id).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{id:?}");
            assert!(validate_gens_id(id).is_err(), "{id:?}");
        }
        assert!(validate_owner_id("hans\u{0}worb").is_err());
        assert!(validate_wallet_id("W1-hans").is_ok());
        assert!(validate_gens_id("bern").is_ok());
    }

    #[test]
    fn owner_id_minimum() {
        assert!(validate_owner_id("ab").is_err());
        assert!(validate_owner_id("hans.worb.alps.ea.jedo.cc").is_ok());
    }

    #[test]
    fn amounts_must_be_positive() {
        assert!(validate_positive_amount(Decimal::ZERO).is_err());
        assert!(validate_positive_amount(Decimal::from(-1)).is_err());
        assert!(validate_positive_amount(Decimal::new(1, 2)).is_ok());
    }

    #[test]
    fn amounts_parse_exactly() {
        assert_eq!(parse_amount(" 12.50 ").unwrap(), Decimal::new(1250, 2));
        assert!(parse_amount("twelve").is_err());
    }

    #[test]
    fn metadata_blank_and_null_are_empty() {
        assert!(parse_metadata("").unwrap().is_empty());
        assert!(parse_metadata("   ").unwrap().is_empty());
        assert!(parse_metadata("null").unwrap().is_empty());
        let parsed = parse_metadata(r#"{"label":"savings"}"#).unwrap();
        assert_eq!(parsed["label"], "savings");
    }

    #[test]
    fn metadata_rejects_non_string_values() {
        let err = parse_metadata(r#"{"n":1}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }
}
