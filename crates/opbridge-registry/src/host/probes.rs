//! Marshalling probes.
//!
//! Each probe takes one value of a declared shape and returns a
//! deterministic transform of it, so a host can check that values keep their
//! structure and type on the way into the sandbox and back out.  Integer
//! arithmetic is checked; a result that would overflow `i64` or leave the
//! finite `f64` range is an `InvalidArgument`, never a wrapped or rounded
//! value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OpError, OpResult};
use crate::marshal;

/// The record accepted and returned by the struct probes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeRecord {
    pub label: String,
    pub count: i64,
    pub ratio: f64,
    pub enabled: bool,
    pub items: Vec<i64>,
}

impl ProbeRecord {
    /// Field-wise transform used by `struct_to_struct_01`.
    pub fn transformed(&self) -> OpResult<Self> {
        Ok(Self {
            label: self.label.clone(),
            count: times_three(self.count)?,
            ratio: marshal::finite(self.ratio * 3.0, "ratio * 3")?,
            enabled: !self.enabled,
            items: self
                .items
                .iter()
                .map(|&n| times_three(n))
                .collect::<OpResult<_>>()?,
        })
    }
}

fn times_three(n: i64) -> OpResult<i64> {
    n.checked_mul(3)
        .ok_or_else(|| OpError::invalid_argument(format!("{n} * 3 overflows a 64-bit integer")))
}

/// Echo the record field for field.
pub fn struct_to_struct(args: Vec<Value>) -> OpResult<Value> {
    let record: ProbeRecord = marshal::arg(&args, 0, "input")?;
    marshal::to_value(&record)
}

/// Return the record with every numeric field tripled and `enabled` negated.
pub fn struct_to_struct_01(args: Vec<Value>) -> OpResult<Value> {
    let record: ProbeRecord = marshal::arg(&args, 0, "input")?;
    marshal::to_value(&record.transformed()?)
}

pub fn vec_to_vec(args: Vec<Value>) -> OpResult<Value> {
    let values: Vec<i64> = marshal::arg(&args, 0, "input")?;
    let tripled = values
        .into_iter()
        .map(times_three)
        .collect::<OpResult<Vec<_>>>()?;
    marshal::to_value(&tripled)
}

pub fn true_to_false(args: Vec<Value>) -> OpResult<Value> {
    let b: bool = marshal::arg(&args, 0, "input")?;
    Ok(Value::Bool(!b))
}

pub fn float_x_3(args: Vec<Value>) -> OpResult<Value> {
    let n: f64 = marshal::arg(&args, 0, "input")?;
    let result = marshal::finite(n * 3.0, "input * 3")?;
    marshal::to_value(&result)
}

pub fn integer_x_3(args: Vec<Value>) -> OpResult<Value> {
    let n: i64 = marshal::arg(&args, 0, "input")?;
    Ok(Value::from(times_three(n)?))
}
