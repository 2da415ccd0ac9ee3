//! Registry error types.
//!
//! Two kinds of failure live here and they must not be confused:
//!
//! - [`OpError`] is a *runtime* failure of a host operation.  It is a plain
//!   structured value (category + message) that crosses the host/script
//!   boundary and becomes the rejection of the script's pending call.
//! - [`RegistryError`] is a *configuration* failure of the host itself (a
//!   duplicate registration, a name the registry does not know).  It never
//!   reaches script code as a rejected call.

use serde::{Deserialize, Serialize};

/// Error category carried by every [`OpError`].
///
/// The variant names are the stable names the script side sees in the
/// `name` field of a rejected call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The referenced file (or other resource) does not exist.
    NotFound,
    /// Any other I/O failure (permissions, medium, interrupted read).
    Io,
    /// Transport-level failure while fetching a URL.
    Network,
    /// The supplied URL could not be parsed or has an unsupported scheme.
    InvalidUrl,
    /// A marshalled value does not match the declared shape, or a result
    /// cannot be represented in the shared value format.
    InvalidArgument,
    /// The requested operation is not present in the registry.
    UnknownOperation,
    /// The host abandoned the operation before delivering a result.
    Cancelled,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NotFound => "NotFound",
            Self::Io => "Io",
            Self::Network => "Network",
            Self::InvalidUrl => "InvalidUrl",
            Self::InvalidArgument => "InvalidArgument",
            Self::UnknownOperation => "UnknownOperation",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

/// Structured error value produced by a host operation.
///
/// Serializes as `{ "name": "<kind>", "message": "<text>" }` so the bridge
/// can reject a script promise with an object that preserves the category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct OpError {
    /// Error category.
    #[serde(rename = "name")]
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl OpError {
    /// Build an error of the given category.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidUrl, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    /// Convert into the marshalled error object handed to script code.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.kind.to_string(),
            "message": self.message,
        })
    }
}

impl From<std::io::Error> for OpError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            _ => Self::io(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for OpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::invalid_url(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<url::ParseError> for OpError {
    fn from(err: url::ParseError) -> Self {
        Self::invalid_url(err.to_string())
    }
}

/// Result alias for host operations.
pub type OpResult<T> = std::result::Result<T, OpError>;

/// Host-side configuration errors raised while building or querying the
/// registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The same operation was registered twice.
    #[error("operation registered twice: {op}")]
    DuplicateOperation { op: String },

    /// The requested operation is not present in the registry.
    #[error("unknown operation: {op}")]
    UnknownOperation { op: String },
}

impl RegistryError {
    /// Error category of this failure as seen from the bridge.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateOperation { .. } => ErrorKind::InvalidArgument,
            Self::UnknownOperation { .. } => ErrorKind::UnknownOperation,
        }
    }
}

/// Convenience alias used by registry construction and lookup.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_error_display() {
        let err = OpError::not_found("missing.txt");
        assert_eq!(err.to_string(), "NotFound: missing.txt");
    }

    #[test]
    fn op_error_serializes_with_name_field() {
        let err = OpError::network("connection refused");
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["name"], "Network");
        assert_eq!(value["message"], "connection refused");
        assert_eq!(value, err.to_value());
    }

    #[test]
    fn op_error_roundtrips_through_value() {
        let err = OpError::invalid_argument("bad shape");
        let back: OpError = serde_json::from_value(err.to_value()).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn io_not_found_maps_to_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(OpError::from(io_err).kind, ErrorKind::NotFound);
    }

    #[test]
    fn other_io_errors_map_to_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = OpError::from(io_err);
        assert_eq!(err.kind, ErrorKind::Io);
        assert!(err.message.contains("denied"));
    }

    #[test]
    fn url_parse_error_maps_to_invalid_url() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        assert_eq!(OpError::from(parse_err).kind, ErrorKind::InvalidUrl);
    }

    #[test]
    fn registry_error_display() {
        let err = RegistryError::UnknownOperation {
            op: "op_nope".into(),
        };
        assert_eq!(err.to_string(), "unknown operation: op_nope");
        assert_eq!(err.kind(), ErrorKind::UnknownOperation);
    }
}
