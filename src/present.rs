//! Human-facing formatting of stations and readings. Pure functions only.

use chrono::{DateTime, TimeZone};

use crate::infra::openaq::types::{LatestResult, Location};

/// Unit assumed when a reading carries none.
pub const DEFAULT_UNIT: &str = "µg/m³";

/// Rendered for any missing value or time.
pub const MISSING: &str = "-";

/// Display name for a pollutant code. Unknown codes are uppercased.
pub fn pollutant_pretty_name(code: Option<&str>) -> String {
    let Some(code) = code else {
        return "Unknown".to_string();
    };
    match code.to_lowercase().as_str() {
        "pm25" | "pm2_5" => "PM2.5 (Fine Particles)".to_string(),
        "pm10" => "PM10 (Coarse Particles)".to_string(),
        "no2" => "Nitrogen Dioxide (NO₂)".to_string(),
        "so2" => "Sulfur Dioxide (SO₂)".to_string(),
        "o3" => "Ozone (O₃)".to_string(),
        "co" => "Carbon Monoxide (CO)".to_string(),
        "bc" => "Black Carbon (BC)".to_string(),
        _ => code.to_uppercase(),
    }
}

/// `12.0` renders as `"12 µg/m³"`, `12.34` as `"12.3 µg/m³"`.
pub fn format_value(value: Option<f64>, unit: Option<&str>) -> String {
    let Some(v) = value else {
        return MISSING.to_string();
    };
    let unit = unit.filter(|u| !u.trim().is_empty()).unwrap_or(DEFAULT_UNIT);
    let num = if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    };
    format!("{num} {unit}")
}

/// The first non-blank time field of a reading.
///
/// Order: `datetime.local`, `datetime.utc`, `date.local`, `date.utc`,
/// `last_updated`.
pub fn reading_timestamp(reading: &LatestResult) -> Option<&str> {
    let current = reading.datetime.as_ref();
    let legacy = reading.date.as_ref();
    [
        current.and_then(|d| d.local.as_deref()),
        current.and_then(|d| d.utc.as_deref()),
        legacy.and_then(|d| d.local.as_deref()),
        legacy.and_then(|d| d.utc.as_deref()),
        reading.last_updated.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find(|s| !s.trim().is_empty())
}

/// Renders an RFC 3339 timestamp in `tz` as `"01 Jan 2024, 03:00"`.
///
/// Absent, blank or unparsable input renders as `"-"`.
pub fn format_timestamp<Tz>(iso: Option<&str>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    iso.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(tz).format("%d %b %Y, %H:%M").to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

/// Display time of a reading in `tz`.
pub fn reading_time<Tz>(reading: &LatestResult, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format_timestamp(reading_timestamp(reading), tz)
}

/// EPA-style category for PM2.5 / PM10 in µg/m³.
///
/// Any other parameter, or a missing value, has no category.
pub fn aqi_category(parameter: Option<&str>, value: Option<f64>) -> Option<&'static str> {
    let v = value?;
    match parameter?.to_lowercase().as_str() {
        "pm25" | "pm2_5" => Some(match v {
            v if v <= 12.0 => "Good",
            v if v <= 35.4 => "Moderate",
            v if v <= 55.4 => "Unhealthy (Sensitive)",
            v if v <= 150.4 => "Unhealthy",
            v if v <= 250.4 => "Very Unhealthy",
            _ => "Hazardous",
        }),
        "pm10" => Some(match v {
            v if v <= 54.0 => "Good",
            v if v <= 154.0 => "Moderate",
            v if v <= 254.0 => "Unhealthy (Sensitive)",
            v if v <= 354.0 => "Unhealthy",
            v if v <= 424.0 => "Very Unhealthy",
            _ => "Hazardous",
        }),
        _ => None,
    }
}

pub fn station_title(station: &Location) -> String {
    station
        .name
        .clone()
        .unwrap_or_else(|| format!("Station {}", station.id))
}

/// `"{locality} • {country}"`, dropping a blank locality. Country is the
/// name, else the code, else `KE`.
pub fn station_subtitle(station: &Location) -> String {
    let country = station
        .country
        .as_ref()
        .and_then(|c| c.name.as_deref().or(c.code.as_deref()))
        .unwrap_or("KE");
    match station.locality.as_deref().filter(|l| !l.trim().is_empty()) {
        Some(locality) => format!("{locality} • {country}"),
        None => country.to_string(),
    }
}

pub fn station_coordinates(station: &Location) -> Option<String> {
    let c = station.coordinates?;
    let fmt = |v: Option<f64>| v.map_or_else(|| "null".to_string(), |v| v.to_string());
    Some(format!("({}, {})", fmt(c.latitude), fmt(c.longitude)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::openaq::types::{Coordinates, Country, DateTimePair};
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_pretty_names() {
        assert_eq!(pollutant_pretty_name(Some("pm25")), "PM2.5 (Fine Particles)");
        assert_eq!(pollutant_pretty_name(Some("PM2_5")), "PM2.5 (Fine Particles)");
        assert_eq!(pollutant_pretty_name(Some("pm10")), "PM10 (Coarse Particles)");
        assert_eq!(pollutant_pretty_name(Some("o3")), "Ozone (O₃)");
        assert_eq!(pollutant_pretty_name(Some("bc")), "Black Carbon (BC)");
        assert_eq!(pollutant_pretty_name(Some("pm1")), "PM1");
        assert_eq!(pollutant_pretty_name(None), "Unknown");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(12.0), Some("µg/m³")), "12 µg/m³");
        assert_eq!(format_value(Some(12.34), Some("µg/m³")), "12.3 µg/m³");
        assert_eq!(format_value(Some(0.5), Some("ppm")), "0.5 ppm");
        assert_eq!(format_value(Some(7.0), None), "7 µg/m³");
        assert_eq!(format_value(Some(7.0), Some("  ")), "7 µg/m³");
        assert_eq!(format_value(None, Some("ppm")), "-");
    }

    fn reading_with_times(
        dt: Option<DateTimePair>,
        date: Option<DateTimePair>,
        last: Option<&str>,
    ) -> LatestResult {
        LatestResult {
            datetime: dt,
            date,
            last_updated: last.map(String::from),
            ..Default::default()
        }
    }

    fn pair(utc: Option<&str>, local: Option<&str>) -> Option<DateTimePair> {
        Some(DateTimePair {
            utc: utc.map(String::from),
            local: local.map(String::from),
        })
    }

    #[test]
    fn test_timestamp_preference_order() {
        let all = reading_with_times(pair(Some("a"), Some("b")), pair(Some("c"), Some("d")), Some("e"));
        assert_eq!(reading_timestamp(&all), Some("b"));

        let no_local = reading_with_times(pair(Some("a"), None), pair(Some("c"), Some("d")), Some("e"));
        assert_eq!(reading_timestamp(&no_local), Some("a"));

        let legacy = reading_with_times(None, pair(Some("c"), Some("d")), Some("e"));
        assert_eq!(reading_timestamp(&legacy), Some("d"));

        let legacy_utc = reading_with_times(pair(None, None), pair(Some("c"), None), Some("e"));
        assert_eq!(reading_timestamp(&legacy_utc), Some("c"));

        let last = reading_with_times(None, None, Some("e"));
        assert_eq!(reading_timestamp(&last), Some("e"));

        assert_eq!(reading_timestamp(&LatestResult::default()), None);
    }

    #[test]
    fn test_timestamp_skips_blank_values() {
        let r = reading_with_times(pair(Some("a"), Some(" ")), None, None);
        assert_eq!(reading_timestamp(&r), Some("a"));
    }

    #[test]
    fn test_format_timestamp() {
        let nairobi = FixedOffset::east_opt(3 * 3600).unwrap();
        assert_eq!(
            format_timestamp(Some("2024-01-01T00:00:00Z"), &nairobi),
            "01 Jan 2024, 03:00"
        );
        assert_eq!(
            format_timestamp(Some("2024-01-01T03:00:00+03:00"), &Utc),
            "01 Jan 2024, 00:00"
        );
        assert_eq!(format_timestamp(Some("yesterday"), &Utc), "-");
        assert_eq!(format_timestamp(Some(""), &Utc), "-");
        assert_eq!(format_timestamp(None, &Utc), "-");
    }

    #[test]
    fn test_reading_time_without_any_field() {
        assert_eq!(reading_time(&LatestResult::default(), &Utc), "-");
    }

    #[test]
    fn test_pm25_categories() {
        let cat = |v| aqi_category(Some("pm25"), Some(v));
        assert_eq!(cat(12.0), Some("Good"));
        assert_eq!(cat(12.1), Some("Moderate"));
        assert_eq!(cat(35.4), Some("Moderate"));
        assert_eq!(cat(35.5), Some("Unhealthy (Sensitive)"));
        assert_eq!(cat(55.4), Some("Unhealthy (Sensitive)"));
        assert_eq!(cat(150.4), Some("Unhealthy"));
        assert_eq!(cat(250.4), Some("Very Unhealthy"));
        assert_eq!(cat(250.5), Some("Hazardous"));
        assert_eq!(aqi_category(Some("PM2_5"), Some(5.0)), Some("Good"));
    }

    #[test]
    fn test_pm10_categories() {
        let cat = |v| aqi_category(Some("pm10"), Some(v));
        assert_eq!(cat(54.0), Some("Good"));
        assert_eq!(cat(154.0), Some("Moderate"));
        assert_eq!(cat(254.0), Some("Unhealthy (Sensitive)"));
        assert_eq!(cat(354.0), Some("Unhealthy"));
        assert_eq!(cat(424.0), Some("Very Unhealthy"));
        assert_eq!(cat(425.0), Some("Hazardous"));
    }

    #[test]
    fn test_no_category_for_other_parameters() {
        assert_eq!(aqi_category(Some("no2"), Some(10.0)), None);
        assert_eq!(aqi_category(None, Some(10.0)), None);
        assert_eq!(aqi_category(Some("pm25"), None), None);
    }

    #[test]
    fn test_station_labels() {
        let mut s = Location::from_id(9);
        assert_eq!(station_title(&s), "Station 9");
        assert_eq!(station_subtitle(&s), "KE");
        assert_eq!(station_coordinates(&s), None);

        s.name = Some("Nairobi CBD".into());
        s.locality = Some("Nairobi".into());
        s.country = Some(Country {
            code: Some("KE".into()),
            name: Some("Kenya".into()),
        });
        s.coordinates = Some(Coordinates {
            latitude: Some(-1.2864),
            longitude: Some(36.8172),
        });
        assert_eq!(station_title(&s), "Nairobi CBD");
        assert_eq!(station_subtitle(&s), "Nairobi • Kenya");
        assert_eq!(station_coordinates(&s).as_deref(), Some("(-1.2864, 36.8172)"));

        s.locality = Some("".into());
        s.country = Some(Country {
            code: Some("UG".into()),
            name: None,
        });
        assert_eq!(station_subtitle(&s), "UG");
    }
}
