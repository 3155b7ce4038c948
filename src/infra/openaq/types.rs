//! Response schemas for the OpenAQ v3 endpoints the crate consumes.
//!
//! The API is inconsistent across deployments, so every field except
//! [`Location::id`] is optional, lists default to empty and unknown fields
//! are ignored. `/v3/locations/{id}/latest` is decoded with two different
//! schemas: [`LatestResponse`] (container shape) and [`LatestRawResponse`]
//! (raw shape).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/* ---------- Common ---------- */

/// OpenAQ reports `found` as a number, or as a string like `">100"` when the
/// count is capped. Only the numeric form is kept.
fn deserialize_found<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_u64()))
}

/// Pagination metadata attached to every list response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Meta {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_found")]
    pub found: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct Coordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Country {
    pub code: Option<String>,
    pub name: Option<String>,
}

/* ---------- Locations ---------- */

/// A monitoring station.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Location {
    pub id: i64,
    pub name: Option<String>,
    pub locality: Option<String>,
    pub country: Option<Country>,
    pub coordinates: Option<Coordinates>,
}

impl Location {
    /// A station carrying only its id, for callers that know nothing else.
    pub fn from_id(id: i64) -> Self {
        Self {
            id,
            name: None,
            locality: None,
            country: None,
            coordinates: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationsResponse {
    pub meta: Option<Meta>,
    #[serde(default)]
    pub results: Vec<Location>,
}

/* ---------- Latest, container shape ---------- */

/// A UTC / local-offset time pair. Either side may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DateTimePair {
    pub utc: Option<String>,
    pub local: Option<String>,
}

/// One canonical reading. Produced verbatim from the container shape, or
/// assembled from a raw item and its sensor by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestResult {
    pub parameter: Option<String>,
    pub unit: Option<String>,
    pub value: Option<f64>,
    pub quality: Option<String>,
    pub display_name: Option<String>,
    pub entity: Option<String>,
    pub sensor_type: Option<String>,

    // time variants, read in order by `present::reading_timestamp`
    pub datetime: Option<DateTimePair>,
    pub date: Option<DateTimePair>,
    pub last_updated: Option<String>,
}

/// Container entry returned by `/v3/locations/{id}/latest` and `/v3/latest`
/// on deployments that wrap parameter-level readings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LatestContainer {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub country: Option<Country>,
    pub coordinates: Option<Coordinates>,

    // some deployments say "measurements", others "parameters"
    pub measurements: Option<Vec<LatestResult>>,
    pub parameters: Option<Vec<LatestResult>>,
}

impl LatestContainer {
    /// The first non-empty reading list: `measurements`, then `parameters`.
    ///
    /// An empty `measurements` does not hide a populated `parameters`.
    pub fn readings(&self) -> &[LatestResult] {
        self.measurements
            .as_deref()
            .filter(|m| !m.is_empty())
            .or(self.parameters.as_deref())
            .unwrap_or(&[])
    }

    /// Owned form of [`LatestContainer::readings`].
    pub fn into_readings(self) -> Vec<LatestResult> {
        self.measurements
            .filter(|m| !m.is_empty())
            .or(self.parameters)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LatestResponse {
    pub meta: Option<Meta>,
    #[serde(default)]
    pub results: Vec<LatestContainer>,
}

/* ---------- Latest, raw shape ---------- */

/// A bare reading: value and time plus an opaque sensor reference.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestRawItem {
    pub value: Option<f64>,
    pub datetime: Option<DateTimePair>,
    pub date: Option<DateTimePair>,
    pub sensors_id: Option<i64>,
    pub locations_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LatestRawResponse {
    pub meta: Option<Meta>,
    #[serde(default)]
    pub results: Vec<LatestRawItem>,
}

/* ---------- Sensors ---------- */

/// Parameter info as embedded in a sensor. Often partial.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ParameterRef {
    pub id: Option<i64>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub units: Option<String>,
}

/// A sensor at a station. `id` is what raw readings call `sensorsId`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    pub id: Option<i64>,
    pub parameter: Option<ParameterRef>,
    pub unit: Option<String>,
    pub parameters_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SensorsResponse {
    pub meta: Option<Meta>,
    #[serde(default)]
    pub results: Vec<Sensor>,
}

/* ---------- Parameter catalog ---------- */

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ParameterDef {
    pub id: Option<i64>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub units: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParametersResponse {
    pub meta: Option<Meta>,
    #[serde(default)]
    pub results: Vec<ParameterDef>,
}
