//! Conversion between marshalled values and host-side Rust types.
//!
//! Host operations receive their arguments as `serde_json::Value`s and must
//! return one.  Anything that does not fit the shared structural format is
//! reported as [`ErrorKind::InvalidArgument`](crate::error::ErrorKind) rather
//! than passed through in a lossy form.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{OpError, OpResult};

/// Decode the argument at `index` into `T`.
pub fn arg<T: DeserializeOwned>(args: &[Value], index: usize, name: &str) -> OpResult<T> {
    let value = args
        .get(index)
        .ok_or_else(|| OpError::invalid_argument(format!("missing argument `{name}`")))?;
    T::deserialize(value)
        .map_err(|e| OpError::invalid_argument(format!("argument `{name}`: {e}")))
}

/// Encode a host result into the shared value format.
pub fn to_value<T: Serialize>(value: &T) -> OpResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| OpError::invalid_argument(format!("result not representable: {e}")))
}

/// Accept either a string or a byte sequence and return the raw bytes.
pub fn contents_bytes(value: &Value, name: &str) -> OpResult<Vec<u8>> {
    match value {
        Value::String(s) => Ok(s.clone().into_bytes()),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|n| u8::try_from(n).ok())
                    .ok_or_else(|| {
                        OpError::invalid_argument(format!(
                            "argument `{name}`: byte sequence element {item} is not in 0..=255"
                        ))
                    })
            })
            .collect(),
        other => Err(OpError::invalid_argument(format!(
            "argument `{name}`: expected string or byte sequence, got {other}"
        ))),
    }
}

/// Render raw bytes as a string when they are valid UTF-8, otherwise as a
/// byte sequence.
pub fn bytes_value(bytes: Vec<u8>) -> Value {
    match String::from_utf8(bytes) {
        Ok(text) => Value::String(text),
        Err(err) => Value::Array(err.into_bytes().into_iter().map(Value::from).collect()),
    }
}

/// Reject values the shared format cannot carry.
pub fn finite(value: f64, what: &str) -> OpResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(OpError::invalid_argument(format!(
            "{what} is not a finite number"
        )))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn arg_decodes_typed_value() {
        let args = vec![json!("a.txt"), json!(3)];
        let path: String = arg(&args, 0, "path").unwrap();
        let n: i64 = arg(&args, 1, "n").unwrap();
        assert_eq!(path, "a.txt");
        assert_eq!(n, 3);
    }

    #[test]
    fn arg_missing_is_invalid_argument() {
        let err = arg::<String>(&[], 0, "path").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert!(err.message.contains("missing argument `path`"));
    }

    #[test]
    fn arg_wrong_type_is_invalid_argument() {
        let err = arg::<bool>(&[json!("yes")], 0, "flag").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn contents_accepts_string_and_bytes() {
        assert_eq!(contents_bytes(&json!("hi"), "c").unwrap(), b"hi".to_vec());
        assert_eq!(contents_bytes(&json!([104, 105]), "c").unwrap(), b"hi".to_vec());
    }

    #[test]
    fn contents_rejects_out_of_range_bytes() {
        let err = contents_bytes(&json!([1, 300]), "contents").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert!(err.message.contains("300"));
    }

    #[test]
    fn bytes_value_prefers_text() {
        assert_eq!(bytes_value(b"plain".to_vec()), json!("plain"));
        assert_eq!(bytes_value(vec![0xff, 0x00]), json!([255, 0]));
    }

    #[test]
    fn finite_rejects_infinity_and_nan() {
        assert!(finite(1.0, "x").is_ok());
        assert!(finite(f64::INFINITY, "x").is_err());
        assert!(finite(f64::NAN, "x").is_err());
    }
}
