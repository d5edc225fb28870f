//! Concurrent metric store.
//!
//! Records live in a sharded `DashMap`, so upserts on different keys only
//! contend when they land in the same shard, and upserts on the same key
//! serialize on that key's shard lock.
//!
//! A store-wide fence (`RwLock<()>`) makes snapshots point-in-time: every
//! upsert holds the fence shared while it writes, and `snapshot` holds it
//! exclusively while copying. A snapshot therefore contains exactly the
//! upserts that completed before it started.

use std::cmp::Ordering;
use std::sync::{Arc, PoisonError, RwLock};

use dashmap::DashMap;
use serde::Deserialize;
use serde_json::{Number, Value};

use crate::snapshot::Snapshot;

/// How bound candidates are folded into a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundMode {
    /// The most recently supplied candidate wins.
    #[default]
    Overwrite,
    /// True running minimum / maximum; the first candidate seeds the bound.
    Running,
}

impl BoundMode {
    fn replaces(self, current: Option<&Number>, candidate: &Number, keep_lower: bool) -> bool {
        let (BoundMode::Running, Some(current)) = (self, current) else {
            return true;
        };
        match compare(candidate, current) {
            Some(Ordering::Less) => keep_lower,
            Some(Ordering::Greater) => !keep_lower,
            _ => false,
        }
    }
}

fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Integers compare exactly; anything else goes through `f64`.
fn compare(a: &Number, b: &Number) -> Option<Ordering> {
    match (as_integer(a), as_integer(b)) {
        (Some(a), Some(b)) => Some(a.cmp(&b)),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

/// Latest value and bounds for one metric.
///
/// Cloning a record shares its value instead of copying it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricRecord {
    value: Arc<Value>,
    min: Option<Number>,
    max: Option<Number>,
    updates: u64,
}

impl MetricRecord {
    /// Value from the most recent upsert.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Lower bound, `0` if no candidate was ever supplied.
    pub fn min(&self) -> Number {
        self.min.clone().unwrap_or_else(|| Number::from(0))
    }

    /// Upper bound, `0` if no candidate was ever supplied.
    pub fn max(&self) -> Number {
        self.max.clone().unwrap_or_else(|| Number::from(0))
    }

    /// Number of upserts applied to this record.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    fn apply(&mut self, value: Value, min: Option<Number>, max: Option<Number>, mode: BoundMode) {
        self.value = Arc::new(value);
        if let Some(candidate) = min {
            if mode.replaces(self.min.as_ref(), &candidate, true) {
                self.min = Some(candidate);
            }
        }
        if let Some(candidate) = max {
            if mode.replaces(self.max.as_ref(), &candidate, false) {
                self.max = Some(candidate);
            }
        }
        self.updates = self.updates.saturating_add(1);
    }
}

/// Thread-safe `name -> MetricRecord` map. Records are never removed.
#[derive(Debug, Default)]
pub struct MetricStore {
    records: DashMap<String, MetricRecord>,
    fence: RwLock<()>,
    mode: BoundMode,
}

impl MetricStore {
    pub fn new(mode: BoundMode) -> Self {
        Self {
            records: DashMap::new(),
            fence: RwLock::new(()),
            mode,
        }
    }

    pub fn bound_mode(&self) -> BoundMode {
        self.mode
    }

    /// Create or update the record for `name`.
    ///
    /// `value` always replaces the current value. A bound is only touched when
    /// its candidate is supplied.
    pub fn upsert(&self, name: &str, value: Value, min: Option<Number>, max: Option<Number>) {
        // The fence guards `()`, so a poisoned lock carries no broken state.
        let _shared = self.fence.read().unwrap_or_else(PoisonError::into_inner);

        if let Some(mut record) = self.records.get_mut(name) {
            record.apply(value, min, max, self.mode);
            return;
        }
        self.records
            .entry(name.to_owned())
            .or_default()
            .apply(value, min, max, self.mode);
    }

    /// Point-in-time copy of every record. Values are shared, not deep-copied.
    pub fn snapshot(&self) -> Snapshot {
        let _exclusive = self.fence.write().unwrap_or_else(PoisonError::into_inner);
        self.records
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Copy of a single record.
    pub fn get(&self, name: &str) -> Option<MetricRecord> {
        self.records.get(name).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
