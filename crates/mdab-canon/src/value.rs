//! The parsed event tree.
//!
//! `Value` preserves the one distinction `serde_json::Value` folds away: the
//! lexical class of every numeric literal. An integer token stays an integer
//! even when it overflows i64 (kept as its source text), and a fractional or
//! exponent-bearing token is a float even when its value happens to be whole.
//! The numeric policy gate depends on these tags.

use std::collections::BTreeMap;

use crate::numeric::NumericError;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    /// Integer literal within signed 64-bit range.
    Int(i64),
    /// Integer literal outside signed 64-bit range, preserved as written.
    BigInt(String),
    /// Fractional or exponent-bearing literal.
    Float(f64),
    Str(String),
    Array(Vec<Value>),
    /// Keys iterate in byte order, which for UTF-8 equals code-point order.
    /// Duplicates were rejected at parse time.
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Member lookup; `None` for non-objects and absent keys.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// A copy of this object with the named top-level members removed.
    ///
    /// Non-objects are returned unchanged; the caller has already shape-checked.
    pub fn without_members(&self, names: &[&str]) -> Value {
        match self {
            Value::Object(map) => {
                let mut copy = map.clone();
                for name in names {
                    copy.remove(*name);
                }
                Value::Object(copy)
            }
            other => other.clone(),
        }
    }

    /// Convert to the `serde_json` substrate for schema validation.
    ///
    /// Fails on floats and out-of-range integers; the numeric policy gate has
    /// already rejected both by the time any caller reaches this conversion.
    pub fn to_json(&self) -> Result<serde_json::Value, NumericError> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::BigInt(_) => return Err(NumericError::IntOutOfRange),
            Value::Float(_) => return Err(NumericError::FloatForbidden),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(Value::to_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), v.to_json()?)))
                    .collect::<Result<serde_json::Map<_, _>, NumericError>>()?,
            ),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
