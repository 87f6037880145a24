/// Reading, SiteRecord, SiteDataset, Anomaly, NwisError
/// core data structures and error handling
///
/// Core data types for the water-level anomaly service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O. `SiteDataset` is the only type with behavior, and that
/// behavior is limited to keeping its records keyed and time-ordered.

use std::collections::btree_map::{self, BTreeMap};

// ---------------------------------------------------------------------------
// Parameter codes and thresholds
// ---------------------------------------------------------------------------

/// USGS parameter code for gage height (stage), in feet.
pub const PARAM_STAGE: &str = "00065";

/// Absolute change between two adjacent readings, in feet, above which the
/// later reading is flagged. The comparison is strict.
pub const ANOMALY_THRESHOLD_FT: f64 = 5.0;

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// A single instantaneous measurement from a USGS gauge station.
///
/// Corresponds to one entry in the `values[0].value[]` array of a USGS
/// IV API response.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: String, // ISO 8601, e.g. "2024-05-01T12:00:00.000-05:00"
    pub value: f64,
}

impl Reading {
    pub fn new(timestamp: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            value,
        }
    }
}

/// All readings reported for one monitoring site, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteRecord {
    pub site_id: String,
    pub site_name: String,
    pub readings: Vec<Reading>,
}

impl SiteRecord {
    pub fn new(site_id: impl Into<String>, site_name: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            site_name: site_name.into(),
            readings: Vec::new(),
        }
    }

    /// Appends readings and restores timestamp order.
    ///
    /// ISO 8601 strings with a common format and offset sort lexicographically
    /// in chronological order. The sort is stable, so readings sharing a
    /// timestamp keep their relative order and are never dropped.
    pub(crate) fn extend_sorted(&mut self, readings: Vec<Reading>) {
        self.readings.extend(readings);
        sort_by_timestamp(&mut self.readings);
    }

    /// Returns `true` if readings are non-decreasing by timestamp.
    pub fn is_time_ordered(&self) -> bool {
        self.readings
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
    }
}

/// Stable ascending sort on the timestamp string.
pub(crate) fn sort_by_timestamp(readings: &mut [Reading]) {
    readings.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// Per-site readings keyed by USGS site code.
///
/// Iteration is ordered by site code, so two datasets holding the same
/// records compare equal and iterate identically regardless of how they
/// were assembled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteDataset {
    sites: BTreeMap<String, SiteRecord>,
}

impl SiteDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, or folds its readings into the record already held
    /// for the same site. The existing site name wins.
    pub(crate) fn absorb(&mut self, record: SiteRecord) {
        match self.sites.entry(record.site_id.clone()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(record);
            }
            btree_map::Entry::Occupied(mut slot) => {
                slot.get_mut().extend_sorted(record.readings);
            }
        }
    }

    pub fn get(&self, site_id: &str) -> Option<&SiteRecord> {
        self.sites.get(site_id)
    }

    pub fn contains(&self, site_id: &str) -> bool {
        self.sites.contains_key(site_id)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &SiteRecord> {
        self.sites.values()
    }

    /// Total number of readings across all sites.
    pub fn reading_count(&self) -> usize {
        self.sites.values().map(|r| r.readings.len()).sum()
    }
}

impl IntoIterator for SiteDataset {
    type Item = SiteRecord;
    type IntoIter = btree_map::IntoValues<String, SiteRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.sites.into_values()
    }
}

// ---------------------------------------------------------------------------
// Anomaly types
// ---------------------------------------------------------------------------

/// Two chronologically adjacent readings at one site whose values differ by
/// more than `ANOMALY_THRESHOLD_FT`. `timestamp` is that of the later reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Anomaly {
    pub site_id: String,
    pub site_name: String,
    pub timestamp: String,
    pub prev_value: f64,
    pub curr_value: f64,
}

impl Anomaly {
    /// Signed change from the earlier to the later reading.
    pub fn delta(&self) -> f64 {
        self.curr_value - self.prev_value
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or processing USGS NWIS data.
#[derive(Debug, PartialEq)]
pub enum NwisError {
    /// Non-2xx HTTP response from the USGS API for a region.
    HttpError { region: String, status: u16 },
    /// The request never produced a response (DNS, TLS, timeout, ...).
    RequestFailed { region: String, message: String },
    /// The response body is not valid JSON.
    ParseError(String),
    /// A field the response must carry is missing or has the wrong type.
    /// `path` is the JSON path of the offending field.
    DataFormat { path: String },
    /// A reading's value could not be read as a number.
    ValueParse {
        site_id: String,
        timestamp: String,
        raw: String,
    },
    /// The region code is not a USGS state code.
    UnknownRegion(String),
}

impl std::fmt::Display for NwisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NwisError::HttpError { region, status } => {
                write!(f, "HTTP error: {} for region {}", status, region)
            }
            NwisError::RequestFailed { region, message } => {
                write!(f, "Request failed for region {}: {}", region, message)
            }
            NwisError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            NwisError::DataFormat { path } => {
                write!(f, "Data format error: missing or invalid field '{}'", path)
            }
            NwisError::ValueParse {
                site_id,
                timestamp,
                raw,
            } => write!(
                f,
                "Value parse error: site {} at {} has non-numeric value '{}'",
                site_id, timestamp, raw
            ),
            NwisError::UnknownRegion(code) => write!(f, "Unknown region code: {}", code),
        }
    }
}

impl std::error::Error for NwisError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(site_id: &str, readings: &[(&str, f64)]) -> SiteRecord {
        SiteRecord {
            site_id: site_id.to_string(),
            site_name: format!("Site {}", site_id),
            readings: readings.iter().map(|(t, v)| Reading::new(*t, *v)).collect(),
        }
    }

    #[test]
    fn test_extend_sorted_keeps_duplicate_timestamps_in_arrival_order() {
        let mut rec = record("S1", &[("2024-01-01T00:00:00", 1.0), ("2024-01-01T00:30:00", 3.0)]);
        rec.extend_sorted(vec![
            Reading::new("2024-01-01T00:30:00", 4.0),
            Reading::new("2024-01-01T00:15:00", 2.0),
        ]);

        let values: Vec<f64> = rec.readings.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
        assert!(rec.is_time_ordered());
    }

    #[test]
    fn test_absorb_keeps_first_site_name() {
        let mut ds = SiteDataset::new();
        ds.absorb(record("S1", &[("2024-01-01T00:00:00", 1.0)]));

        let mut renamed = record("S1", &[("2024-01-02T00:00:00", 2.0)]);
        renamed.site_name = "Another Name".to_string();
        ds.absorb(renamed);

        assert_eq!(ds.len(), 1);
        let s1 = ds.get("S1").expect("S1 should be present");
        assert_eq!(s1.site_name, "Site S1");
        assert_eq!(s1.readings.len(), 2);
    }

    #[test]
    fn test_dataset_iterates_by_site_code() {
        let mut ds = SiteDataset::new();
        ds.absorb(record("08000300", &[]));
        ds.absorb(record("07000100", &[]));
        let ids: Vec<&str> = ds.records().map(|r| r.site_id.as_str()).collect();
        assert_eq!(ids, vec!["07000100", "08000300"]);
    }

    #[test]
    fn test_reading_count_sums_all_sites() {
        let mut ds = SiteDataset::new();
        ds.absorb(record("A", &[("t1", 1.0), ("t2", 2.0)]));
        ds.absorb(record("B", &[("t1", 1.0)]));
        assert_eq!(ds.reading_count(), 3);
    }

    #[test]
    fn test_error_display_names_field_path() {
        let err = NwisError::DataFormat {
            path: "value.timeSeries[0].sourceInfo.siteName".to_string(),
        };
        assert!(err.to_string().contains("value.timeSeries[0].sourceInfo.siteName"));

        let err = NwisError::HttpError {
            region: "tx".to_string(),
            status: 503,
        };
        assert_eq!(err.to_string(), "HTTP error: 503 for region tx");
    }
}
