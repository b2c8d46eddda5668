//! The numeric policy gate.
//!
//! Runs after parsing and before schema validation. Two full walks over the
//! tree: floats anywhere are reported first, then integers outside signed
//! 64-bit range — a float and an oversized integer on the same line always
//! surface the float, whatever their positions. Booleans are their own tag
//! in [`Value`] and never reach the integer check.

use thiserror::Error;

use crate::value::Value;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NumericError {
    #[error("floating-point values are forbidden")]
    FloatForbidden,

    #[error("integer out of signed 64-bit range")]
    IntOutOfRange,
}

/// Check the whole tree against the numeric policy.
pub fn check(value: &Value) -> Result<(), NumericError> {
    if contains_float(value) {
        return Err(NumericError::FloatForbidden);
    }
    if contains_oversized_int(value) {
        return Err(NumericError::IntOutOfRange);
    }
    Ok(())
}

fn contains_float(value: &Value) -> bool {
    match value {
        Value::Float(_) => true,
        Value::Array(items) => items.iter().any(contains_float),
        Value::Object(map) => map.values().any(contains_float),
        _ => false,
    }
}

fn contains_oversized_int(value: &Value) -> bool {
    match value {
        Value::BigInt(_) => true,
        Value::Array(items) => items.iter().any(contains_oversized_int),
        Value::Object(map) => map.values().any(contains_oversized_int),
        _ => false,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::{check, NumericError};
    use crate::parse::parse_line;

    #[test]
    fn accepts_integer_only_trees() {
        let v = parse_line(r#"{"a":1,"b":[0,-7],"c":{"d":9223372036854775807}}"#).unwrap();
        assert!(check(&v).is_ok());
    }

    #[test]
    fn rejects_floats_at_any_depth() {
        let v = parse_line(r#"{"a":{"b":[{"x":1.0}]}}"#).unwrap();
        assert_eq!(check(&v).unwrap_err(), NumericError::FloatForbidden);
    }

    #[test]
    fn rejects_oversized_integers() {
        let v = parse_line(r#"{"n":[9223372036854775808]}"#).unwrap();
        assert_eq!(check(&v).unwrap_err(), NumericError::IntOutOfRange);

        let v = parse_line(r#"{"n":-9223372036854775809}"#).unwrap();
        assert_eq!(check(&v).unwrap_err(), NumericError::IntOutOfRange);
    }

    /// One beyond each i64 extreme fails; the extremes themselves pass.
    #[test]
    fn int64_boundaries_are_exact() {
        let ok = parse_line(r#"{"min":-9223372036854775808,"max":9223372036854775807}"#).unwrap();
        assert!(check(&ok).is_ok());
    }

    /// A float wins over an oversized integer even when the integer appears
    /// first in the document.
    #[test]
    fn float_takes_precedence_over_int_range() {
        let v = parse_line(r#"{"a":99999999999999999999,"b":2.5}"#).unwrap();
        assert_eq!(check(&v).unwrap_err(), NumericError::FloatForbidden);
    }

    /// Booleans are not integers; they pass the gate untouched.
    #[test]
    fn booleans_are_not_numbers() {
        let v = parse_line(r#"{"flag":true,"other":false}"#).unwrap();
        assert!(check(&v).is_ok());
    }
}
