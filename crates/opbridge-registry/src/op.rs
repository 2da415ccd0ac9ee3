//! Operation names, value shapes, and descriptors.
//!
//! The set of operations the bridge knows about is closed: [`OpName`] is an
//! enum, and string names coming from an engine binding are parsed into it
//! exactly once.  A name that does not parse is an
//! [`UnknownOperation`](crate::error::RegistryError::UnknownOperation), which
//! is a host integration defect rather than a runtime fault.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OpError, OpResult, RegistryError};

// ---------------------------------------------------------------------------
// Operation names
// ---------------------------------------------------------------------------

/// Every operation the bridge can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpName {
    ReadFile,
    WriteFile,
    RemoveFile,
    Fetch,
    StructToStruct,
    #[serde(rename = "struct_to_struct_01")]
    StructToStruct01,
    VecToVec,
    TrueToFalse,
    #[serde(rename = "float_x_3")]
    FloatX3,
    #[serde(rename = "integer_x_3")]
    IntegerX3,
}

impl OpName {
    /// All operations, in namespace order.
    pub const ALL: [OpName; 10] = [
        OpName::ReadFile,
        OpName::WriteFile,
        OpName::RemoveFile,
        OpName::Fetch,
        OpName::StructToStruct,
        OpName::StructToStruct01,
        OpName::VecToVec,
        OpName::TrueToFalse,
        OpName::FloatX3,
        OpName::IntegerX3,
    ];

    /// Host-side op identifier, the key engine bindings dispatch on.
    pub fn op_id(self) -> &'static str {
        match self {
            Self::ReadFile => "op_read_file",
            Self::WriteFile => "op_write_file",
            Self::RemoveFile => "op_remove_file",
            Self::Fetch => "op_fetch",
            Self::StructToStruct => "struct_to_struct",
            Self::StructToStruct01 => "struct_to_struct_01",
            Self::VecToVec => "vec_to_vec",
            Self::TrueToFalse => "true_to_false",
            Self::FloatX3 => "float_x_3",
            Self::IntegerX3 => "integer_x_3",
        }
    }

    /// Member name inside the script-visible capability namespace.
    pub fn script_name(self) -> &'static str {
        match self {
            Self::ReadFile => "readFile",
            Self::WriteFile => "writeFile",
            Self::RemoveFile => "removeFile",
            Self::Fetch => "fetch",
            other => other.op_id(),
        }
    }

    /// Declared parameters, in call order.
    pub fn params(self) -> &'static [ParamSpec] {
        match self {
            Self::ReadFile | Self::RemoveFile => PATH_PARAMS,
            Self::WriteFile => WRITE_PARAMS,
            Self::Fetch => URL_PARAMS,
            Self::StructToStruct | Self::StructToStruct01 => RECORD_PARAMS,
            Self::VecToVec => SEQUENCE_PARAMS,
            Self::TrueToFalse => BOOLEAN_PARAMS,
            Self::FloatX3 => FLOAT_PARAMS,
            Self::IntegerX3 => INTEGER_PARAMS,
        }
    }

    /// Declared result shape.
    pub fn returns(self) -> ValueShape {
        match self {
            Self::ReadFile => ValueShape::StringOrBytes,
            Self::WriteFile | Self::RemoveFile => ValueShape::Unit,
            Self::Fetch => ValueShape::String,
            Self::StructToStruct | Self::StructToStruct01 => ValueShape::Record(PROBE_RECORD_FIELDS),
            Self::VecToVec => ValueShape::Sequence(&ValueShape::Integer),
            Self::TrueToFalse => ValueShape::Boolean,
            Self::FloatX3 => ValueShape::Float,
            Self::IntegerX3 => ValueShape::Integer,
        }
    }
}

impl std::fmt::Display for OpName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.op_id())
    }
}

impl FromStr for OpName {
    type Err = RegistryError;

    /// Accepts either the op identifier (`op_read_file`) or the script member
    /// name (`readFile`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.op_id() == s || op.script_name() == s)
            .ok_or_else(|| RegistryError::UnknownOperation { op: s.to_string() })
    }
}

const PATH_PARAMS: &[ParamSpec] = &[ParamSpec::new("path", ValueShape::String)];
const WRITE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("path", ValueShape::String),
    ParamSpec::new("contents", ValueShape::StringOrBytes),
];
const URL_PARAMS: &[ParamSpec] = &[ParamSpec::new("url", ValueShape::String)];
const RECORD_PARAMS: &[ParamSpec] = &[ParamSpec::new("input", ValueShape::Record(PROBE_RECORD_FIELDS))];
const SEQUENCE_PARAMS: &[ParamSpec] = &[ParamSpec::new("input", ValueShape::Sequence(&ValueShape::Integer))];
const BOOLEAN_PARAMS: &[ParamSpec] = &[ParamSpec::new("input", ValueShape::Boolean)];
const FLOAT_PARAMS: &[ParamSpec] = &[ParamSpec::new("input", ValueShape::Float)];
const INTEGER_PARAMS: &[ParamSpec] = &[ParamSpec::new("input", ValueShape::Integer)];

// ---------------------------------------------------------------------------
// Value shapes
// ---------------------------------------------------------------------------

/// Fields of the record accepted and returned by the struct probes.
pub const PROBE_RECORD_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("label", ValueShape::String),
    FieldSpec::new("count", ValueShape::Integer),
    FieldSpec::new("ratio", ValueShape::Float),
    FieldSpec::new("enabled", ValueShape::Boolean),
    FieldSpec::new("items", ValueShape::Sequence(&ValueShape::Integer)),
];

/// Structural shape of a marshalled value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// `null` / no value.
    Unit,
    Boolean,
    /// A number representable as `i64`.
    Integer,
    /// Any finite number.
    Float,
    String,
    /// A sequence of integers in `0..=255`.
    Bytes,
    /// Either a string or a byte sequence.
    StringOrBytes,
    /// A homogeneous sequence.
    Sequence(&'static ValueShape),
    /// A closed record: exactly these fields, nothing else.
    Record(&'static [FieldSpec]),
}

impl ValueShape {
    /// Whether `value` conforms to this shape.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Unit => value.is_null(),
            Self::Boolean => value.is_boolean(),
            Self::Integer => value.as_i64().is_some(),
            Self::Float => value.as_f64().is_some_and(f64::is_finite),
            Self::String => value.is_string(),
            Self::Bytes => value.as_array().is_some_and(|items| {
                items
                    .iter()
                    .all(|b| b.as_u64().is_some_and(|n| n <= u64::from(u8::MAX)))
            }),
            Self::StringOrBytes => Self::String.matches(value) || Self::Bytes.matches(value),
            Self::Sequence(inner) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| inner.matches(item))),
            Self::Record(fields) => value.as_object().is_some_and(|map| {
                map.len() == fields.len()
                    && fields.iter().all(|field| {
                        map.get(field.name)
                            .is_some_and(|v| field.shape.matches(v))
                    })
            }),
        }
    }

    /// Script-facing type name used in signatures and error messages.
    pub fn type_name(&self) -> String {
        match self {
            Self::Unit => "void".into(),
            Self::Boolean => "boolean".into(),
            Self::Integer => "integer".into(),
            Self::Float => "float".into(),
            Self::String => "string".into(),
            Self::Bytes => "bytes".into(),
            Self::StringOrBytes => "string | bytes".into(),
            Self::Sequence(inner) => format!("{}[]", inner.type_name()),
            Self::Record(fields) => {
                let inner: Vec<String> = fields
                    .iter()
                    .map(|f| format!("{}: {}", f.name, f.shape.type_name()))
                    .collect();
                format!("{{ {} }}", inner.join(", "))
            }
        }
    }
}

/// One named field of a [`ValueShape::Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub shape: ValueShape,
}

impl FieldSpec {
    pub const fn new(name: &'static str, shape: ValueShape) -> Self {
        Self { name, shape }
    }
}

/// One declared parameter of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub shape: ValueShape,
}

impl ParamSpec {
    pub const fn new(name: &'static str, shape: ValueShape) -> Self {
        Self { name, shape }
    }
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// Whether an operation completes inline or off the script thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Synchronicity {
    Sync,
    Async,
}

impl std::fmt::Display for Synchronicity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sync => write!(f, "sync"),
            Self::Async => write!(f, "async"),
        }
    }
}

/// Everything the bridge needs to know about a registered operation apart
/// from its implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpDescriptor {
    pub name: OpName,
    pub synchronicity: Synchronicity,
}

impl OpDescriptor {
    pub fn new(name: OpName, synchronicity: Synchronicity) -> Self {
        Self {
            name,
            synchronicity,
        }
    }

    pub fn params(&self) -> &'static [ParamSpec] {
        self.name.params()
    }

    pub fn returns(&self) -> ValueShape {
        self.name.returns()
    }

    /// Script-facing signature, e.g. `writeFile(path: string, contents:
    /// string | bytes) -> Promise<void>`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .params()
            .iter()
            .map(|p| format!("{}: {}", p.name, p.shape.type_name()))
            .collect();
        let returns = self.returns().type_name();
        let returns = match self.synchronicity {
            Synchronicity::Sync => returns,
            Synchronicity::Async => format!("Promise<{returns}>"),
        };
        format!("{}({}) -> {returns}", self.name.script_name(), params.join(", "))
    }

    /// Check arity and per-parameter shape before the arguments are handed
    /// to the implementation.
    pub fn validate_args(&self, args: &[Value]) -> OpResult<()> {
        let params = self.params();
        if args.len() != params.len() {
            return Err(OpError::invalid_argument(format!(
                "{} expects {} argument(s), got {}",
                self.name.script_name(),
                params.len(),
                args.len()
            )));
        }
        for (param, arg) in params.iter().zip(args) {
            if !param.shape.matches(arg) {
                return Err(OpError::invalid_argument(format!(
                    "argument `{}` of {}: expected {}, got {}",
                    param.name,
                    self.name.script_name(),
                    param.shape.type_name(),
                    describe(arg),
                )));
            }
        }
        Ok(())
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "record",
    }
}
