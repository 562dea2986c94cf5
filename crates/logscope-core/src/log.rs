//! In-memory log store.
//!
//! A lean version of the host's log engine: ordered samples per field with
//! at-or-before lookup. Controllers read it concurrently through a shared
//! reference; writes happen outside the tab subsystem.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::types::{LogValue, LogValueSet, LoggableType};

#[derive(Debug, Default)]
struct LogField {
    timestamps: Vec<f64>,
    values: Vec<LogValue>,
    field_type: LoggableType,
}

impl LogField {
    /// Index of the sample at or before `timestamp`. A cursor hint that is
    /// still correct for this timestamp answers without searching; a stale
    /// hint falls back to the binary search.
    fn index_at(&self, timestamp: f64, hint: Option<usize>) -> Option<usize> {
        if let Some(idx) = hint {
            let at_or_before = self.timestamps.get(idx).is_some_and(|t| *t <= timestamp);
            let next_after = self
                .timestamps
                .get(idx + 1)
                .map_or(true, |t| *t > timestamp);
            if at_or_before && next_after {
                return Some(idx);
            }
        }
        let idx = self.timestamps.partition_point(|t| *t <= timestamp);
        if idx == 0 {
            None
        } else {
            Some(idx - 1)
        }
    }
}

/// Log data store keyed by field name.
///
/// Per-subscriber cursors remember the last sample index read for a field so
/// that repeated playback lookups don't re-run the binary search from
/// scratch. Cursors are scoped by the subscriber UUID handed out to each
/// controller instance.
#[derive(Debug, Default)]
pub struct Log {
    fields: HashMap<String, LogField>,
    cursors: Mutex<HashMap<(String, String), usize>>,
}

impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample to a field. Samples arriving out of order are inserted
    /// at their timestamp position.
    pub fn put(&mut self, key: &str, timestamp: f64, value: LogValue) {
        let field = self.fields.entry(key.to_string()).or_default();
        field.field_type = value.loggable_type();
        match field.timestamps.last() {
            Some(last) if *last > timestamp => {
                let idx = field.timestamps.partition_point(|t| *t <= timestamp);
                field.timestamps.insert(idx, timestamp);
                field.values.insert(idx, value);
            }
            _ => {
                field.timestamps.push(timestamp);
                field.values.push(value);
            }
        }
    }

    /// All field keys, unordered.
    pub fn field_keys(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// The type of a field, if it exists.
    pub fn field_type(&self, key: &str) -> Option<LoggableType> {
        self.fields.get(key).map(|f| f.field_type)
    }

    /// The range of timestamps across all fields.
    pub fn timestamp_range(&self) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for field in self.fields.values() {
            if let (Some(first), Some(last)) = (field.timestamps.first(), field.timestamps.last()) {
                min = min.min(*first);
                max = max.max(*last);
            }
        }
        if min > max {
            (0.0, 0.0)
        } else {
            (min, max)
        }
    }

    /// Read samples from `key` in `[start, end]`, plus the sample immediately
    /// before `start` when one exists (so interpolation has a left edge).
    pub fn get_range(&self, key: &str, start: f64, end: f64) -> Option<LogValueSet> {
        let field = self.fields.get(key)?;
        let mut first = field.timestamps.partition_point(|t| *t < start);
        if first > 0 && field.timestamps.get(first) != Some(&start) {
            first -= 1;
        }
        let last = field.timestamps.partition_point(|t| *t <= end);
        Some(LogValueSet {
            timestamps: field.timestamps[first..last].to_vec(),
            values: field.values[first..last].to_vec(),
        })
    }

    /// The most recent sample of `key` at or before `timestamp`, if any.
    /// Subscribed lookups seed the search from the caller's last position.
    pub fn value_at(&self, key: &str, timestamp: f64, subscriber: Option<&str>) -> Option<&LogValue> {
        let field = self.fields.get(key)?;
        let idx = match subscriber {
            Some(subscriber) => {
                let mut cursors = self.cursors.lock().unwrap_or_else(|e| e.into_inner());
                let cursor_key = (subscriber.to_string(), key.to_string());
                let idx = field.index_at(timestamp, cursors.get(&cursor_key).copied())?;
                cursors.insert(cursor_key, idx);
                idx
            }
            None => field.index_at(timestamp, None)?,
        };
        field.values.get(idx)
    }

    /// Look up the latest sample of `key` at or before `timestamp` and return
    /// it as JSON if present and of the expected type, else `default`. Never
    /// fails for a missing field.
    pub fn get_or_default(
        &self,
        key: &str,
        expected: LoggableType,
        timestamp: f64,
        default: Value,
        subscriber: Option<&str>,
    ) -> Value {
        match self.value_at(key, timestamp, subscriber) {
            Some(value) if value.loggable_type() == expected => {
                serde_json::to_value(value).unwrap_or(default)
            }
            _ => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_log() -> Log {
        let mut log = Log::new();
        log.put("/robot/speed", 0.0, LogValue::Number(0.0));
        log.put("/robot/speed", 1.0, LogValue::Number(2.5));
        log.put("/robot/speed", 2.0, LogValue::Number(4.0));
        log.put("/robot/enabled", 0.5, LogValue::Boolean(true));
        log
    }

    #[test]
    fn test_at_or_before_lookup() {
        let log = sample_log();
        assert_eq!(
            log.value_at("/robot/speed", 1.5, None),
            Some(&LogValue::Number(2.5))
        );
        assert_eq!(
            log.value_at("/robot/speed", 2.0, None),
            Some(&LogValue::Number(4.0))
        );
        // Before the first sample there is no value
        assert_eq!(log.value_at("/robot/speed", -1.0, None), None);
    }

    #[test]
    fn test_cursor_seeded_lookups_stay_correct() {
        let log = sample_log();
        let sub = Some("tab-1");
        assert_eq!(
            log.value_at("/robot/speed", 1.2, sub),
            Some(&LogValue::Number(2.5))
        );
        // Same interval: the cursor answers directly
        assert_eq!(
            log.value_at("/robot/speed", 1.9, sub),
            Some(&LogValue::Number(2.5))
        );
        // Advancing past the cursor re-searches forward
        assert_eq!(
            log.value_at("/robot/speed", 5.0, sub),
            Some(&LogValue::Number(4.0))
        );
        // Jumping backward invalidates the cursor
        assert_eq!(
            log.value_at("/robot/speed", 0.5, sub),
            Some(&LogValue::Number(0.0))
        );
        assert_eq!(log.value_at("/robot/speed", -1.0, sub), None);
        // A stale cursor from before the jump never leaks into later reads
        assert_eq!(
            log.value_at("/robot/speed", 2.0, sub),
            Some(&LogValue::Number(4.0))
        );
        // Independent subscribers see the same values
        assert_eq!(
            log.value_at("/robot/speed", 1.2, Some("tab-2")),
            Some(&LogValue::Number(2.5))
        );
    }

    #[test]
    fn test_get_or_default_missing_field() {
        let log = sample_log();
        let value = log.get_or_default("/missing", LoggableType::Number, 1.0, json!(7.0), None);
        assert_eq!(value, json!(7.0));
    }

    #[test]
    fn test_get_or_default_type_mismatch() {
        let log = sample_log();
        // Field exists but is a boolean, not a number
        let value =
            log.get_or_default("/robot/enabled", LoggableType::Number, 1.0, json!(null), None);
        assert_eq!(value, json!(null));
    }

    #[test]
    fn test_get_range_includes_left_edge() {
        let log = sample_log();
        let set = log.get_range("/robot/speed", 0.5, 2.0).unwrap();
        assert_eq!(set.timestamps, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_out_of_order_insert() {
        let mut log = Log::new();
        log.put("/x", 2.0, LogValue::Number(2.0));
        log.put("/x", 1.0, LogValue::Number(1.0));
        let set = log.get_range("/x", 0.0, 3.0).unwrap();
        assert_eq!(set.timestamps, vec![1.0, 2.0]);
    }

    #[test]
    fn test_timestamp_range() {
        let log = sample_log();
        assert_eq!(log.timestamp_range(), (0.0, 2.0));
        assert_eq!(Log::new().timestamp_range(), (0.0, 0.0));
    }
}
