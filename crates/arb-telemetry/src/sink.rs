//! The `TelemetrySink` trait and the in-memory sink.

use std::collections::BTreeMap;
use std::fmt;

use arb_core::Cycle;

use crate::TelemetryResult;

/// One published value.
#[derive(Clone, Debug, PartialEq)]
pub enum TelemetryValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for TelemetryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryValue::Number(n) => write!(f, "{n}"),
            TelemetryValue::Bool(b) => write!(f, "{b}"),
            TelemetryValue::Text(s) => f.write_str(s),
        }
    }
}

/// A one-way key/value display channel.  The robot never reads values back.
///
/// Keys are `/`-separated paths such as `Scheduler/ActiveCount`.
pub trait TelemetrySink {
    fn put(&mut self, cycle: Cycle, key: &str, value: TelemetryValue) -> TelemetryResult<()>;

    fn put_number(&mut self, cycle: Cycle, key: &str, value: f64) -> TelemetryResult<()> {
        self.put(cycle, key, TelemetryValue::Number(value))
    }

    fn put_bool(&mut self, cycle: Cycle, key: &str, value: bool) -> TelemetryResult<()> {
        self.put(cycle, key, TelemetryValue::Bool(value))
    }

    fn put_text(&mut self, cycle: Cycle, key: &str, value: &str) -> TelemetryResult<()> {
        self.put(cycle, key, TelemetryValue::Text(value.to_owned()))
    }

    /// Push buffered values to their destination.  Safe to call repeatedly.
    fn flush(&mut self) -> TelemetryResult<()> {
        Ok(())
    }
}

/// Keeps the latest value of every key.  Useful for tests and for a
/// dashboard that polls.
#[derive(Clone, Debug, Default)]
pub struct MemoryTelemetry {
    values: BTreeMap<String, TelemetryValue>,
    writes: usize,
}

impl MemoryTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&TelemetryValue> {
        self.values.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.values.get(key) {
            Some(TelemetryValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(TelemetryValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(TelemetryValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// All keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Total number of `put` calls, including overwrites.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl TelemetrySink for MemoryTelemetry {
    fn put(&mut self, _cycle: Cycle, key: &str, value: TelemetryValue) -> TelemetryResult<()> {
        self.writes += 1;
        self.values.insert(key.to_owned(), value);
        Ok(())
    }
}
