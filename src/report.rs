//! Human-readable and JSON rendering of detected anomalies.

use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;

use crate::model::Anomaly;

/// Display format for anomaly timestamps, e.g. "January 01, 2024 at 3:15 PM".
const DISPLAY_FORMAT: &str = "%B %d, %Y at %-I:%M %p";

/// Naive layouts accepted when the timestamp carries no UTC offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const SEPARATOR: &str = "------------------";

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Jump,
    Drop,
}

impl Direction {
    /// `Jump` only when the later value is strictly higher; equal values
    /// count as a `Drop`.
    pub fn of(anomaly: &Anomaly) -> Self {
        if anomaly.delta() > 0.0 {
            Direction::Jump
        } else {
            Direction::Drop
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Jump => write!(f, "JUMP"),
            Direction::Drop => write!(f, "DROP"),
        }
    }
}

// ---------------------------------------------------------------------------
// Text report
// ---------------------------------------------------------------------------

/// Renders an ISO 8601 timestamp as "Month DD, YYYY at H:MM AM/PM".
///
/// A timestamp with an offset is shown as wall-clock time in that offset,
/// not converted. Strings that do not parse are returned unchanged.
pub fn format_timestamp(timestamp: &str) -> String {
    let trimmed = timestamp.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return dt.naive_local().format(DISPLAY_FORMAT).to_string();
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// One report line for an anomaly.
pub fn format_anomaly(anomaly: &Anomaly) -> String {
    format!(
        "{} in levels found at site {} (site id {}) on {}: {:?} -> {:?}",
        Direction::of(anomaly),
        anomaly.site_name,
        anomaly.site_id,
        format_timestamp(&anomaly.timestamp),
        anomaly.prev_value,
        anomaly.curr_value,
    )
}

/// Full text report: a count header, a separator, then one line per anomaly
/// with a blank line after each.
pub fn render_report(anomalies: &[Anomaly]) -> String {
    let mut out = format!("ANOMALIES FOUND: {}\n{}\n", anomalies.len(), SEPARATOR);
    for anomaly in anomalies {
        out.push_str(&format_anomaly(anomaly));
        out.push_str("\n\n");
    }
    out
}

// ---------------------------------------------------------------------------
// JSON report
// ---------------------------------------------------------------------------

/// Serialized form of an anomaly, as consumed by the web frontend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyRecord<'a> {
    pub site_id: &'a str,
    pub site_name: &'a str,
    pub timestamp: &'a str,
    pub prev_value: f64,
    pub curr_value: f64,
    pub direction: Direction,
}

impl<'a> From<&'a Anomaly> for AnomalyRecord<'a> {
    fn from(anomaly: &'a Anomaly) -> Self {
        AnomalyRecord {
            site_id: &anomaly.site_id,
            site_name: &anomaly.site_name,
            timestamp: &anomaly.timestamp,
            prev_value: anomaly.prev_value,
            curr_value: anomaly.curr_value,
            direction: Direction::of(anomaly),
        }
    }
}

/// Pretty-printed JSON array of anomalies.
pub fn render_json(anomalies: &[Anomaly]) -> Result<String, serde_json::Error> {
    let records: Vec<AnomalyRecord<'_>> = anomalies.iter().map(AnomalyRecord::from).collect();
    serde_json::to_string_pretty(&records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn anomaly(timestamp: &str, prev: f64, curr: f64) -> Anomaly {
        Anomaly {
            site_id: "S1".to_string(),
            site_name: "Test Site".to_string(),
            timestamp: timestamp.to_string(),
            prev_value: prev,
            curr_value: curr,
        }
    }

    // --- Direction ----------------------------------------------------------

    #[test]
    fn test_rise_is_jump_and_fall_is_drop() {
        assert_eq!(Direction::of(&anomaly("t", 10.0, 16.2)), Direction::Jump);
        assert_eq!(Direction::of(&anomaly("t", 16.2, 10.0)), Direction::Drop);
    }

    #[test]
    fn test_equal_values_are_drop() {
        assert_eq!(Direction::of(&anomaly("t", 7.0, 7.0)), Direction::Drop);
    }

    // --- Timestamps ---------------------------------------------------------

    #[test]
    fn test_naive_timestamp_formats_with_twelve_hour_clock() {
        assert_eq!(
            format_timestamp("2024-01-01T00:15:00"),
            "January 01, 2024 at 12:15 AM"
        );
        assert_eq!(
            format_timestamp("2024-07-04T15:05:00"),
            "July 04, 2024 at 3:05 PM"
        );
    }

    #[test]
    fn test_offset_timestamp_keeps_local_wall_clock() {
        // USGS reports Central time; 13:30 at -05:00 stays 1:30 PM.
        assert_eq!(
            format_timestamp("2024-05-01T13:30:00.000-05:00"),
            "May 01, 2024 at 1:30 PM"
        );
    }

    #[test]
    fn test_unparseable_timestamp_is_returned_verbatim() {
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    // --- Lines and report ---------------------------------------------------

    #[test]
    fn test_format_anomaly_line() {
        let line = format_anomaly(&anomaly("2024-01-01T00:15:00", 10.0, 16.2));
        assert_eq!(
            line,
            "JUMP in levels found at site Test Site (site id S1) on \
             January 01, 2024 at 12:15 AM: 10.0 -> 16.2"
        );
    }

    #[test]
    fn test_render_report_header_and_lines() {
        let report = render_report(&[
            anomaly("2024-01-01T00:15:00", 10.0, 16.2),
            anomaly("2024-01-01T00:30:00", 16.2, 3.0),
        ]);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "ANOMALIES FOUND: 2");
        assert_eq!(lines[1], "------------------");
        assert!(lines[2].starts_with("JUMP"));
        assert_eq!(lines[3], "");
        assert!(lines[4].starts_with("DROP"));
        assert!(lines[4].ends_with("16.2 -> 3.0"));
    }

    #[test]
    fn test_render_report_with_no_anomalies() {
        assert_eq!(render_report(&[]), "ANOMALIES FOUND: 0\n------------------\n");
    }

    // --- JSON ---------------------------------------------------------------

    #[test]
    fn test_render_json_includes_direction() {
        let json = render_json(&[anomaly("2024-01-01T00:15:00", 10.0, 16.2)])
            .expect("anomalies should serialize");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(parsed[0]["site_id"], "S1");
        assert_eq!(parsed[0]["site_name"], "Test Site");
        assert_eq!(parsed[0]["timestamp"], "2024-01-01T00:15:00");
        assert_eq!(parsed[0]["prev_value"], 10.0);
        assert_eq!(parsed[0]["curr_value"], 16.2);
        assert_eq!(parsed[0]["direction"], "JUMP");
    }
}
