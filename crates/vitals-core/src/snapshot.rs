//! Snapshot export format.
//!
//! A snapshot serializes to a bare JSON object keyed by metric name, keys in
//! sorted order:
//!
//! ```json
//! {"temp":{"value":75,"min":10,"max":90}}
//! ```
//!
//! Numbers keep the representation they were ingested with.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

use crate::error::{Result, VitalsError};
use crate::store::MetricRecord;

#[derive(Serialize)]
struct ExportedRecord<'a> {
    value: &'a Value,
    min: Number,
    max: Number,
}

impl Serialize for MetricRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        ExportedRecord {
            value: self.value(),
            min: self.min(),
            max: self.max(),
        }
        .serialize(serializer)
    }
}

/// Immutable, point-in-time copy of the metric store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    records: BTreeMap<String, MetricRecord>,
}

impl Snapshot {
    pub fn get(&self, name: &str) -> Option<&MetricRecord> {
        self.records.get(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Serialize to the canonical export blob.
    pub fn encode(&self) -> Result<Bytes> {
        serde_json::to_vec(self)
            .map(Bytes::from)
            .map_err(|e| VitalsError::Encode(e.to_string()))
    }
}

impl FromIterator<(String, MetricRecord)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, MetricRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
