//! Export of resolved readings.
//!
//! Supports pretty JSON and CSV append.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use tracing::debug;

use crate::infra::openaq::types::LatestResult;
use crate::present::aqi_category;
use crate::resolver::first_present;

/// One CSV row per reading.
#[derive(Debug, Serialize)]
pub struct ReadingRecord {
    pub fetched_at: DateTime<Utc>,
    pub location_id: i64,
    pub parameter: Option<String>,
    pub display_name: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub time_utc: Option<String>,
    pub time_local: Option<String>,
    pub category: Option<&'static str>,
}

impl ReadingRecord {
    pub fn from_reading(location_id: i64, reading: &LatestResult, fetched_at: DateTime<Utc>) -> Self {
        let current = reading.datetime.as_ref();
        let legacy = reading.date.as_ref();
        Self {
            fetched_at,
            location_id,
            parameter: reading.parameter.clone(),
            display_name: reading.display_name.clone(),
            value: reading.value,
            unit: reading.unit.clone(),
            time_utc: first_present([
                current.and_then(|d| d.utc.clone()),
                legacy.and_then(|d| d.utc.clone()),
                reading.last_updated.clone(),
            ]),
            time_local: first_present([
                current.and_then(|d| d.local.clone()),
                legacy.and_then(|d| d.local.clone()),
            ]),
            category: aqi_category(reading.parameter.as_deref(), reading.value),
        }
    }
}

/// Serializes readings as pretty-printed JSON.
pub fn readings_json(readings: &[LatestResult]) -> Result<String> {
    Ok(serde_json::to_string_pretty(readings)?)
}

/// Appends one row per reading to a CSV file, stamped with the current time.
///
/// Creates the file if needed; the header row is written only into an empty
/// file. Returns the number of rows written.
pub fn append_readings(path: &str, location_id: i64, readings: &[LatestResult]) -> Result<usize> {
    // an empty file left by a zero-row append still needs its header
    let has_content = fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);
    debug!(path, has_content, rows = readings.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!has_content)
        .from_writer(file);

    let fetched_at = Utc::now();
    for reading in readings {
        writer.serialize(ReadingRecord::from_reading(location_id, reading, fetched_at))?;
    }
    writer.flush()?;

    Ok(readings.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::openaq::types::DateTimePair;
    use std::env;
    use std::path::Path;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn pm25(value: f64) -> LatestResult {
        LatestResult {
            parameter: Some("pm25".into()),
            unit: Some("µg/m³".into()),
            value: Some(value),
            datetime: Some(DateTimePair {
                utc: Some("2024-01-01T00:00:00Z".into()),
                local: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_record_from_reading() {
        let record = ReadingRecord::from_reading(7, &pm25(40.0), Utc::now());
        assert_eq!(record.location_id, 7);
        assert_eq!(record.time_utc.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(record.time_local, None);
        assert_eq!(record.category, Some("Unhealthy (Sensitive)"));
    }

    #[test]
    fn test_readings_json_uses_wire_names() {
        let json = readings_json(&[pm25(1.0)]).unwrap();
        assert!(json.contains("\"displayName\""));
        assert!(json.contains("\"pm25\""));
    }

    #[test]
    fn test_append_readings_writes_header_once() {
        let path = temp_path("kenya_air_test_header.csv");
        let _ = fs::remove_file(&path);

        append_readings(&path, 1, &[pm25(10.0)]).unwrap();
        append_readings(&path, 1, &[pm25(11.0), pm25(12.0)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("fetched_at")).count();
        assert_eq!(header_count, 1);
        // 1 header + 3 data rows
        assert_eq!(content.lines().count(), 4);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_empty_creates_file() {
        let path = temp_path("kenya_air_test_empty.csv");
        let _ = fs::remove_file(&path);

        assert_eq!(append_readings(&path, 1, &[]).unwrap(), 0);
        assert!(Path::new(&path).exists());

        fs::remove_file(&path).unwrap();
    }
}
