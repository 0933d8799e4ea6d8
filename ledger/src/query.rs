//! # Rich Query Selectors
//!
//! A small evaluator for CouchDB-style selector documents, enough for the
//! listings a chaincode needs without a document database behind it:
//!
//! ```json
//! {
//!   "selector": {
//!     "docType": "wallet",
//!     "ownerId": { "$regex": ".*\\.worb\\..*" }
//!   },
//!   "limit": 100
//! }
//! ```
//!
//! ## Supported operators
//!
//! | Operator            | Meaning                                              |
//! |---------------------|------------------------------------------------------|
//! | literal             | JSON equality                                        |
//! | `$eq` / `$ne`       | JSON equality / inequality                           |
//! | `$regex`            | unanchored search, string fields only                |
//! | `$exists`           | field presence                                       |
//! | `$gt` `$gte` `$lt` `$lte` | ordering; decimal-aware for numbers and numeric strings |
//!
//! Dotted field names (`metadata.tier`) walk nested objects. All field
//! conditions are AND-ed. Anything else is rejected at parse time rather
//! than silently matching everything.

use std::cmp::Ordering;
use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::{LedgerError, LedgerResult};

/// A parsed, pre-compiled rich query.
#[derive(Debug, Clone)]
pub struct RichQuery {
    fields: Vec<FieldCondition>,
    limit: Option<usize>,
}

#[derive(Debug, Clone)]
struct FieldCondition {
    path: Vec<String>,
    conditions: Vec<Condition>,
}

#[derive(Debug, Clone)]
enum Condition {
    Eq(Value),
    Ne(Value),
    Regex(Regex),
    Exists(bool),
    Compare(Ordering, bool, Value),
}

impl RichQuery {
    /// Parses a query document.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidQuery`] if the document is not JSON, has
    /// no object `selector`, or uses an unsupported operator.
    pub fn parse(query: &str) -> LedgerResult<Self> {
        let document: Value = serde_json::from_str(query)
            .map_err(|e| LedgerError::InvalidQuery(format!("query is not JSON: {e}")))?;

        let selector = document
            .get("selector")
            .and_then(Value::as_object)
            .ok_or_else(|| LedgerError::InvalidQuery("missing object `selector`".into()))?;

        let limit = match document.get("limit") {
            None | Some(Value::Null) => None,
            Some(v) => Some(v.as_u64().ok_or_else(|| {
                LedgerError::InvalidQuery("`limit` must be a non-negative integer".into())
            })? as usize),
        };

        let fields = selector
            .iter()
            .map(|(field, condition)| parse_field(field, condition))
            .collect::<LedgerResult<Vec<_>>>()?;

        Ok(Self { fields, limit })
    }

    /// The maximum number of results requested, if any.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns `true` if `document` satisfies every field condition.
    pub fn matches(&self, document: &Value) -> bool {
        self.fields.iter().all(|field| {
            let value = lookup(document, &field.path);
            field.conditions.iter().all(|c| c.holds(value))
        })
    }

    /// Convenience: parses `bytes` as JSON and matches it. Values that are
    /// not JSON documents never match.
    pub fn matches_bytes(&self, bytes: &[u8]) -> bool {
        serde_json::from_slice::<Value>(bytes)
            .map(|doc| self.matches(&doc))
            .unwrap_or(false)
    }
}

fn parse_field(field: &str, condition: &Value) -> LedgerResult<FieldCondition> {
    if field.starts_with('$') {
        return Err(LedgerError::InvalidQuery(format!(
            "unsupported combination operator {field}"
        )));
    }
    if field.is_empty() {
        return Err(LedgerError::InvalidQuery("empty field name".into()));
    }

    let path = field.split('.').map(str::to_string).collect();
    let conditions = match condition {
        Value::Object(ops) if is_operator_object(ops) => ops
            .iter()
            .map(|(op, arg)| parse_operator(op, arg))
            .collect::<LedgerResult<Vec<_>>>()?,
        literal => vec![Condition::Eq(literal.clone())],
    };

    Ok(FieldCondition { path, conditions })
}

fn is_operator_object(ops: &Map<String, Value>) -> bool {
    !ops.is_empty() && ops.keys().all(|k| k.starts_with('$'))
}

fn parse_operator(op: &str, arg: &Value) -> LedgerResult<Condition> {
    match op {
        "$eq" => Ok(Condition::Eq(arg.clone())),
        "$ne" => Ok(Condition::Ne(arg.clone())),
        "$regex" => {
            let pattern = arg
                .as_str()
                .ok_or_else(|| LedgerError::InvalidQuery("$regex needs a string".into()))?;
            let regex = Regex::new(pattern)
                .map_err(|e| LedgerError::InvalidQuery(format!("bad $regex {pattern:?}: {e}")))?;
            Ok(Condition::Regex(regex))
        }
        "$exists" => arg
            .as_bool()
            .map(Condition::Exists)
            .ok_or_else(|| LedgerError::InvalidQuery("$exists needs a boolean".into())),
        "$gt" => Ok(Condition::Compare(Ordering::Greater, false, arg.clone())),
        "$gte" => Ok(Condition::Compare(Ordering::Greater, true, arg.clone())),
        "$lt" => Ok(Condition::Compare(Ordering::Less, false, arg.clone())),
        "$lte" => Ok(Condition::Compare(Ordering::Less, true, arg.clone())),
        other => Err(LedgerError::InvalidQuery(format!(
            "unsupported operator {other}"
        ))),
    }
}

impl Condition {
    fn holds(&self, value: Option<&Value>) -> bool {
        match self {
            Condition::Eq(expected) => value == Some(expected),
            Condition::Ne(expected) => value != Some(expected),
            Condition::Regex(regex) => value
                .and_then(Value::as_str)
                .is_some_and(|s| regex.is_match(s)),
            Condition::Exists(should_exist) => value.is_some() == *should_exist,
            Condition::Compare(direction, or_equal, bound) => value
                .and_then(|v| compare(v, bound))
                .is_some_and(|ord| ord == *direction || (*or_equal && ord == Ordering::Equal)),
        }
    }
}

/// Orders two JSON values. Numbers and numeric strings compare as decimals,
/// other strings lexicographically. Mixed kinds are incomparable.
fn compare(value: &Value, bound: &Value) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (as_decimal(value), as_decimal(bound)) {
        return Some(a.cmp(&b));
    }
    match (value, bound) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s).ok(),
        _ => None,
    }
}

fn lookup<'a>(document: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter()
        .try_fold(document, |current, segment| current.get(segment.as_str()))
}
