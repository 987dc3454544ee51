//! CSV telemetry backend.
//!
//! Creates `telemetry.csv` in the configured directory with one
//! `cycle,key,value` row per published value.

use std::fs::File;
use std::path::Path;

use arb_core::Cycle;
use csv::{Writer, WriterBuilder};
use serde::Serialize;

use crate::{TelemetryResult, TelemetrySink, TelemetryValue};

pub const TELEMETRY_FILE: &str = "telemetry.csv";

#[derive(Serialize)]
struct TelemetryRow<'a> {
    cycle: u64,
    key:   &'a str,
    value: String,
}

/// Appends every published value to a CSV log.
pub struct CsvTelemetry {
    rows:    Writer<File>,
    written: u64,
}

impl CsvTelemetry {
    /// Create `telemetry.csv` in `dir` and write the header row.
    pub fn new(dir: &Path) -> TelemetryResult<Self> {
        let mut rows = WriterBuilder::new()
            .has_headers(false)
            .from_path(dir.join(TELEMETRY_FILE))?;
        rows.write_record(["cycle", "key", "value"])?;
        Ok(Self { rows, written: 0 })
    }

    /// Rows written so far, excluding the header.
    pub fn rows_written(&self) -> u64 {
        self.written
    }
}

impl TelemetrySink for CsvTelemetry {
    fn put(&mut self, cycle: Cycle, key: &str, value: TelemetryValue) -> TelemetryResult<()> {
        self.rows.serialize(TelemetryRow { cycle: cycle.0, key, value: value.to_string() })?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> TelemetryResult<()> {
        self.rows.flush()?;
        Ok(())
    }
}
