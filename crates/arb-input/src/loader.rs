//! CSV control-profile loader.
//!
//! # CSV format
//!
//! One row per role.  Optional columns may be left empty.
//!
//! ```csv
//! role,kind,source,threshold,deadband,scale,inverted
//! wrist_up,button,y,,,,
//! elevator_up,axis_above,right_trigger,0.5,,,
//! translation_x,axis,left_y,,0.1,1.0,true
//! ```
//!
//! **`kind`** field:
//!
//! | Value        | Result                                                 |
//! |--------------|--------------------------------------------------------|
//! | `button`     | `Trigger::button(source)`                              |
//! | `axis_above` | `Trigger::axis_above(source, threshold)`               |
//! | `axis_below` | `Trigger::axis_below(source, threshold)`               |
//! | `axis`       | `Axis` with `deadband` (0), `scale` (1), `inverted` (false) |
//!
//! Roles absent from the file are simply unbound.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::{Axis, ControlBindings, InputError, InputResult, Trigger};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct BindingRecord {
    role:      String,
    kind:      String,
    source:    String,
    threshold: Option<f64>,
    deadband:  Option<f64>,
    scale:     Option<f64>,
    inverted:  Option<bool>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a control profile from a CSV file.  The profile is named after the
/// file stem.
pub fn load_bindings_csv(path: &Path) -> InputResult<ControlBindings> {
    let file = std::fs::File::open(path).map_err(InputError::Io)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("profile");
    load_bindings_reader(file, name)
}

/// Like [`load_bindings_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or for profiles embedded in
/// the robot binary.
pub fn load_bindings_reader<R: Read>(reader: R, name: &str) -> InputResult<ControlBindings> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut bindings = ControlBindings::new(name);

    for result in csv_reader.deserialize::<BindingRecord>() {
        let row = result.map_err(|e| InputError::Parse(e.to_string()))?;
        let role = row.role.trim().to_owned();
        if bindings.has_role(&role) {
            return Err(InputError::DuplicateRole(role));
        }
        let source = row.source.trim();

        match row.kind.trim() {
            "button" => {
                bindings.insert_trigger(&role, Trigger::button(source));
            }
            "axis_above" => {
                let threshold = require_threshold(&row, &role)?;
                bindings.insert_trigger(&role, Trigger::axis_above(source, threshold));
            }
            "axis_below" => {
                let threshold = require_threshold(&row, &role)?;
                bindings.insert_trigger(&role, Trigger::axis_below(source, threshold));
            }
            "axis" => {
                let axis = Axis::new(source)
                    .with_deadband(row.deadband.unwrap_or(0.0))
                    .with_scale(row.scale.unwrap_or(1.0))
                    .inverted(row.inverted.unwrap_or(false));
                bindings.insert_axis(&role, axis);
            }
            other => {
                return Err(InputError::Parse(format!(
                    "role {role:?}: invalid kind {other:?}: expected \"button\", \"axis_above\", \"axis_below\" or \"axis\""
                )));
            }
        }
    }

    log::info!("loaded control profile {:?} ({} roles)", bindings.name, bindings.roles().len());
    Ok(bindings)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn require_threshold(row: &BindingRecord, role: &str) -> InputResult<f64> {
    row.threshold.ok_or_else(|| {
        InputError::Parse(format!("role {role:?}: kind {:?} needs a threshold", row.kind.trim()))
    })
}
