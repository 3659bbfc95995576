//! Pure record normalization: date parsing and regiment canonicalization.
//!
//! Nothing in here performs I/O or can fail. Every raw record maps to exactly
//! one output row, however malformed the input.

pub mod date;
pub mod regiment;

use serde_json::Value;

use crate::domain::{CleanedRecord, DatePatch, RawRecord};

pub use date::{normalize_date, normalize_date_iso};
pub use regiment::normalize_regiment;

/// Passthrough text column. Null, absent and whitespace-only values become
/// `None`; numbers keep their literal form.
pub fn text_field(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(_) => None,
    }
}

/// Coordinate column. Accepts numbers and numeric text; every "no value"
/// form (null, NaN, infinities, junk text) becomes `None`.
pub fn coordinate_field(value: Option<&Value>) -> Option<f64> {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Full-rebuild projection: both normalizers applied, columns renamed to the
/// target schema.
pub fn clean_record(record: &RawRecord) -> CleanedRecord {
    CleanedRecord {
        forename: text_field(record.forename.as_ref()),
        surname: text_field(record.surname.as_ref()),
        regiment: normalize_regiment(record.regiment.as_ref()),
        cemetery: text_field(record.cemetery.as_ref()),
        date_of_death: normalize_date(record.date_of_death.as_ref()),
        lat: coordinate_field(record.latitude.as_ref()),
        lng: coordinate_field(record.longitude.as_ref()),
    }
}

/// In-place patch projection: only the date is normalized.
///
/// Returns `None` when the record has no usable identifier, since such a row
/// cannot be matched on upsert.
pub fn date_patch(record: &RawRecord) -> Option<DatePatch> {
    let id = match &record.id {
        None | Some(Value::Null) => return None,
        Some(id) => id.clone(),
    };
    Some(DatePatch {
        id,
        iso_date: normalize_date_iso(record.date_of_death.as_ref()),
    })
}
