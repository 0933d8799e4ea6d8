//! # Composite Keys
//!
//! A composite key packs a namespace ("object type") and an ordered list of
//! attributes into a single world-state key:
//!
//! ```text
//! \0 transaction \0 W1 \0 8f3a...c1 \0
//! ```
//!
//! Every component is terminated by the separator, so a partial key built
//! from the leading attributes is a strict byte prefix of every full key
//! that shares them. `(transaction, W1)` scans `W1`'s records and never
//! touches `W10`'s.

use crate::config::{COMPOSITE_KEY_NAMESPACE, COMPOSITE_KEY_SEPARATOR, MAX_UNICODE_RUNE};
use crate::error::{LedgerError, LedgerResult};

/// Builds a full composite key from an object type and its attributes.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidCompositeKey`] if the object type is empty
/// or any component contains the separator or the max unicode rune.
pub fn create_composite_key(object_type: &str, attributes: &[&str]) -> LedgerResult<String> {
    if object_type.is_empty() {
        return Err(LedgerError::InvalidCompositeKey(
            "object type must not be empty".into(),
        ));
    }
    validate_component(object_type)?;

    let mut key = String::with_capacity(
        2 + object_type.len() + attributes.iter().map(|a| a.len() + 1).sum::<usize>(),
    );
    key.push(COMPOSITE_KEY_NAMESPACE);
    key.push_str(object_type);
    key.push(COMPOSITE_KEY_SEPARATOR);

    for attribute in attributes {
        validate_component(attribute)?;
        key.push_str(attribute);
        key.push(COMPOSITE_KEY_SEPARATOR);
    }

    Ok(key)
}

/// Splits a composite key back into its object type and attributes.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidCompositeKey`] if `key` is not a composite key.
pub fn split_composite_key(key: &str) -> LedgerResult<(String, Vec<String>)> {
    let body = key
        .strip_prefix(COMPOSITE_KEY_NAMESPACE)
        .ok_or_else(|| LedgerError::InvalidCompositeKey(format!("{key:?} has no namespace")))?;
    let body = body
        .strip_suffix(COMPOSITE_KEY_SEPARATOR)
        .ok_or_else(|| LedgerError::InvalidCompositeKey(format!("{key:?} is not terminated")))?;

    let mut parts = body.split(COMPOSITE_KEY_SEPARATOR).map(str::to_string);
    let object_type = parts
        .next()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| LedgerError::InvalidCompositeKey(format!("{key:?} has no object type")))?;

    Ok((object_type, parts.collect()))
}

/// Returns `true` if `key` lives in the composite keyspace.
pub fn is_composite_key(key: &str) -> bool {
    key.starts_with(COMPOSITE_KEY_NAMESPACE)
}

/// Checks a key handed to `get_state` or `put_state`.
///
/// A key that starts with the namespace byte must be a well-formed composite
/// key. Any other key is a simple key and must not contain the separator.
///
/// # Errors
///
/// [`LedgerError::InvalidKey`] for an empty or malformed simple key,
/// [`LedgerError::InvalidCompositeKey`] for a malformed composite key.
pub fn validate_state_key(key: &str) -> LedgerResult<()> {
    if key.is_empty() {
        return Err(LedgerError::InvalidKey("key must not be empty".into()));
    }
    if is_composite_key(key) {
        let (object_type, attributes) = split_composite_key(key)?;
        let attributes: Vec<&str> = attributes.iter().map(String::as_str).collect();
        create_composite_key(&object_type, &attributes)?;
        return Ok(());
    }
    if key.contains(COMPOSITE_KEY_SEPARATOR) {
        return Err(LedgerError::InvalidKey(format!(
            "simple key {key:?} contains the composite key separator"
        )));
    }
    Ok(())
}

fn validate_component(component: &str) -> LedgerResult<()> {
    if component.contains(COMPOSITE_KEY_SEPARATOR) || component.contains(MAX_UNICODE_RUNE) {
        return Err(LedgerError::InvalidCompositeKey(format!(
            "component {component:?} contains a reserved character"
        )));
    }
    Ok(())
}
