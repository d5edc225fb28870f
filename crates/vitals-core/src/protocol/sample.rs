//! Ingest sample decoding.
//!
//! Bodies are decoded into a generic JSON object first and every field is
//! type-checked by hand, so an absent or wrong-typed field becomes a
//! `BadRequest` instead of a crash.

use serde_json::{Map, Number, Value};

use crate::error::{Result, VitalsError};

/// One inbound sample. Transient: applied to the store and dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    /// Metric name (store key), never empty.
    pub name: String,
    /// Any JSON value, including `null`.
    pub value: Value,
    /// Lower-bound candidate.
    pub min: Option<Number>,
    /// Upper-bound candidate.
    pub max: Option<Number>,
}

impl MetricSample {
    /// Decode `{"name": string, "value": any, "min"?: number, "max"?: number}`.
    ///
    /// Unknown fields are ignored; a `null` bound counts as absent.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let doc: Value = serde_json::from_slice(body)
            .map_err(|e| VitalsError::BadRequest(format!("invalid json: {e}")))?;
        let Value::Object(mut fields) = doc else {
            return Err(VitalsError::BadRequest("body must be a JSON object".into()));
        };

        let name = match fields.remove("name") {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::String(_)) => {
                return Err(VitalsError::BadRequest("`name` must not be empty".into()))
            }
            Some(_) => return Err(VitalsError::BadRequest("`name` must be a string".into())),
            None => return Err(VitalsError::BadRequest("missing field `name`".into())),
        };

        let value = fields
            .remove("value")
            .ok_or_else(|| VitalsError::BadRequest("missing field `value`".into()))?;

        let min = take_bound(&mut fields, "min")?;
        let max = take_bound(&mut fields, "max")?;

        Ok(Self {
            name,
            value,
            min,
            max,
        })
    }
}

fn take_bound(fields: &mut Map<String, Value>, key: &str) -> Result<Option<Number>> {
    match fields.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n)),
        Some(_) => Err(VitalsError::BadRequest(format!("`{key}` must be a number"))),
    }
}
