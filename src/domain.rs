use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A row of the source table exactly as the REST API returned it.
///
/// Every column is kept as a raw JSON value so that malformed rows still
/// deserialize; the normalizer decides what to make of them. Columns not
/// listed here are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub forename: Option<Value>,
    #[serde(default)]
    pub surname: Option<Value>,
    #[serde(default)]
    pub regiment: Option<Value>,
    #[serde(default)]
    pub cemetery: Option<Value>,
    #[serde(default)]
    pub date_of_death: Option<Value>,
    #[serde(default, rename = "Latitude")]
    pub latitude: Option<Value>,
    #[serde(default, rename = "Longitude")]
    pub longitude: Option<Value>,
}

/// A row of the rebuilt target table.
///
/// Field names match the target schema. `None` serializes as JSON `null`,
/// which is what the store expects for missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub forename: Option<String>,
    pub surname: Option<String>,
    pub regiment: String,
    pub cemetery: Option<String>,
    pub date_of_death: Option<NaiveDate>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// A partial row used to upsert `iso_date` onto an existing source row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatePatch {
    pub id: Value,
    /// Pre-serialized `YYYY-MM-DD`, or `None` when the date was unparseable.
    pub iso_date: Option<String>,
}
