use std::io::Write;

use serde::Serialize;
use serde_json::Value;

/// Encode a value as canonical JSON.
///
/// The encoding is compact (no insignificant whitespace), object keys are
/// emitted in lexicographic byte order at every nesting level, and numbers
/// must be integers. Floating-point numbers are rejected: amounts travel as
/// decimal strings so their text form never depends on a float formatter.
///
/// Key ordering is applied here explicitly rather than relying on the map
/// type `serde_json` happens to be compiled with.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CanonicalError> {
    let value = serde_json::to_value(value).map_err(|e| CanonicalError::Serialization(e.to_string()))?;
    let mut out = Vec::with_capacity(128);
    write_value(&value, &mut out)?;
    Ok(out)
}

fn write_value(value: &Value, out: &mut Vec<u8>) -> Result<(), CanonicalError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => write_scalar(value, out),
        Value::Number(n) => {
            if n.is_f64() {
                return Err(CanonicalError::FloatNotAllowed(n.to_string()));
            }
            write_scalar(value, out)
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(item, out)?;
            }
            out.push(b']');
            Ok(())
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push(b'{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                serde_json::to_writer(&mut *out, key)
                    .map_err(|e| CanonicalError::Serialization(e.to_string()))?;
                out.push(b':');
                write_value(&map[key], out)?;
            }
            out.push(b'}');
            Ok(())
        }
    }
}

fn write_scalar(value: &Value, out: &mut Vec<u8>) -> Result<(), CanonicalError> {
    serde_json::to_writer(&mut *out, value).map_err(|e| CanonicalError::Serialization(e.to_string()))?;
    out.flush().map_err(|e| CanonicalError::Serialization(e.to_string()))
}

/// Errors from canonical encoding.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("floating-point number {0} has no canonical form")]
    FloatNotAllowed(String),
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn keys_are_sorted_at_every_level() {
        let value = json!({"b": 1, "a": {"z": true, "m": null}});
        let bytes = canonical_json(&value).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"a":{"m":null,"z":true},"b":1}"#
        );
    }

    #[test]
    fn struct_field_order_does_not_matter() {
        #[derive(Serialize)]
        struct Forward {
            alpha: u8,
            beta: u8,
        }
        #[derive(Serialize)]
        struct Backward {
            beta: u8,
            alpha: u8,
        }
        let a = canonical_json(&Forward { alpha: 1, beta: 2 }).unwrap();
        let b = canonical_json(&Backward { beta: 2, alpha: 1 }).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn arrays_keep_their_order() {
        let bytes = canonical_json(&json!([3, 1, 2])).unwrap();
        assert_eq!(bytes, b"[3,1,2]");
    }

    #[test]
    fn strings_are_escaped() {
        let bytes = canonical_json(&json!({"k": "a\"b"})).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), r#"{"k":"a\"b"}"#);
    }

    #[test]
    fn floats_are_rejected() {
        let err = canonical_json(&json!({"amount": 1.5})).unwrap_err();
        assert!(matches!(err, CanonicalError::FloatNotAllowed(_)));
    }

    #[test]
    fn negative_integers_are_allowed() {
        let bytes = canonical_json(&json!({"n": -5})).unwrap();
        assert_eq!(bytes, br#"{"n":-5}"#);
    }
}
