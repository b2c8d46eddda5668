//! The canonical byte form every hash commits to.
//!
//! Serialization rules (JCS-like):
//!
//! 1. Object keys in lexicographic code-point order.
//! 2. A single `,` between members and elements, a single `:` between key and
//!    value, no whitespace anywhere.
//! 3. Strings use the short escapes for `"`, `\`, backspace, form feed,
//!    newline, carriage return, and tab; other control characters become
//!    `\u00xx`; everything else — non-ASCII included — is emitted literally,
//!    so the byte form is stable across substrates.
//! 4. Integers in minimal decimal form.
//!
//! Floats cannot appear here: the numeric policy gate rejects them before
//! any hash is computed, and this serializer refuses them rather than
//! guessing a representation.

use std::fmt::Write;

use crate::numeric::NumericError;
use crate::value::Value;

/// Serialize `value` into its canonical UTF-8 byte form.
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>, NumericError> {
    let mut out = String::new();
    write_value(&mut out, value)?;
    Ok(out.into_bytes())
}

fn write_value(out: &mut String, value: &Value) -> Result<(), NumericError> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Int(i) => {
            // write! to a String cannot fail.
            let _ = write!(out, "{i}");
        }
        // An oversized integer token is already minimal: the grammar forbids
        // leading zeros and `-0` parses as Int(0).
        Value::BigInt(text) => out.push_str(text),
        Value::Float(_) => return Err(NumericError::FloatForbidden),
        Value::Str(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_value(out, item)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (idx, (key, member)) in map.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, member)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::canonical_bytes;
    use crate::parse::parse_line;
    use crate::value::Value;

    fn canon(line: &str) -> String {
        let v = parse_line(line).unwrap();
        String::from_utf8(canonical_bytes(&v).unwrap()).unwrap()
    }

    #[test]
    fn sorts_keys_and_strips_whitespace() {
        assert_eq!(canon(r#"{ "b" : "x" , "a" : 1 }"#), r#"{"a":1,"b":"x"}"#);
    }

    /// Key order in the input never changes the byte form.
    #[test]
    fn byte_form_is_stable_under_key_permutation() {
        assert_eq!(
            canon(r#"{"a":1,"b":[2,3],"c":{"x":null}}"#),
            canon(r#"{"c":{"x":null},"b":[2,3],"a":1}"#),
        );
    }

    #[test]
    fn nested_containers_serialize_minimally() {
        assert_eq!(
            canon(r#"{"outer":{"list":[1,{"k":true},[]],"empty":{}}}"#),
            r#"{"outer":{"empty":{},"list":[1,{"k":true},[]]}}"#
        );
    }

    #[test]
    fn non_ascii_is_emitted_literally() {
        assert_eq!(canon(r#"{"msg":"héllo"}"#), "{\"msg\":\"héllo\"}");
    }

    #[test]
    fn control_characters_use_short_escapes() {
        let v = parse_line(r#"{"s":"line\nbreak\t\"q\"\\"}"#).unwrap();
        let bytes = canonical_bytes(&v).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"s":"line\nbreak\t\"q\"\\"}"#
        );
    }

    #[test]
    fn rare_control_characters_fall_back_to_u_escapes() {
        let v = parse_line(r#"{"s":"\u0001"}"#).unwrap();
        let bytes = canonical_bytes(&v).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), r#"{"s":"\u0001"}"#);
    }

    #[test]
    fn integers_render_minimally() {
        assert_eq!(
            canon(r#"{"big":-9223372036854775808,"max":9223372036854775807,"z":-0}"#),
            r#"{"big":-9223372036854775808,"max":9223372036854775807,"z":0}"#
        );
    }

    #[test]
    fn floats_are_refused() {
        assert!(canonical_bytes(&Value::Float(1.0)).is_err());
    }
}
