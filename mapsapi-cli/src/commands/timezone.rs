use anyhow::{Context, Result};
use mapsapi::{LatLng, TimezoneRequest, TimezoneResult};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use super::ConnectionArgs;

#[derive(Serialize)]
struct TimezoneOutput {
    lat: f64,
    lng: f64,
    timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_zone_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_zone_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    utc_offset: Option<String>,
}

impl TimezoneOutput {
    fn new(location: LatLng, timestamp: u64, result: Option<&TimezoneResult>) -> Self {
        Self {
            lat: location.lat,
            lng: location.lng,
            timestamp,
            time_zone_id: result.map(|tz| tz.time_zone_id.clone()),
            time_zone_name: result.map(|tz| tz.time_zone_name.clone()),
            utc_offset: result.map(|tz| format_offset(tz.utc_offset())),
        }
    }
}

/// `+HH:MM` / `-HH:MM` for an offset in seconds.
fn format_offset(offset: i64) -> String {
    format!(
        "{}{:02}:{:02}",
        if offset < 0 { '-' } else { '+' },
        offset.abs() / 3600,
        offset.abs() % 3600 / 60
    )
}

pub fn run(
    connection: &ConnectionArgs,
    location: String,
    timestamp: Option<u64>,
    language: Option<String>,
    json: bool,
) -> Result<()> {
    let location: LatLng = location
        .parse()
        .with_context(|| format!("Invalid coordinate '{}'", location))?;
    let timestamp = match timestamp {
        Some(t) => t,
        None => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("System clock is before 1970")?
            .as_secs(),
    };

    let ctx = connection.context()?;
    let request = TimezoneRequest {
        location,
        timestamp,
        language,
    };
    let result = request.get(&ctx).context("Failed to get time zone")?;

    if json {
        let output = TimezoneOutput::new(location, timestamp, result.as_ref());
        println!("{}", serde_json::to_string(&output)?);
    } else if let Some(tz) = result {
        println!(
            "{}\t{}\tUTC{}",
            tz.time_zone_id,
            tz.time_zone_name,
            format_offset(tz.utc_offset())
        );
    } else {
        println!("no time zone");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(0), "+00:00");
        assert_eq!(format_offset(-25200), "-07:00");
        assert_eq!(format_offset(19800), "+05:30");
    }

    #[test]
    fn test_json_output() {
        let tz = TimezoneResult {
            dst_offset: 3600,
            raw_offset: -28800,
            time_zone_id: "America/Los_Angeles".to_string(),
            time_zone_name: "Pacific Daylight Time".to_string(),
        };
        let location = LatLng::new(39.6034810, -119.6822510);

        let json = serde_json::to_string(&TimezoneOutput::new(location, 1331161200, Some(&tz)))
            .unwrap();
        assert!(json.contains(r#""time_zone_id":"America/Los_Angeles""#));
        assert!(json.contains(r#""utc_offset":"-07:00""#));

        let empty = serde_json::to_string(&TimezoneOutput::new(location, 1331161200, None))
            .unwrap();
        assert!(!empty.contains("time_zone_id"));
    }
}
