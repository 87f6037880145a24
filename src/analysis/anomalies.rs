//! Adjacent-reading jump detection.

use crate::model::{Anomaly, SiteDataset, SiteRecord, ANOMALY_THRESHOLD_FT};

/// Scans every site for adjacent readings that differ by more than
/// `ANOMALY_THRESHOLD_FT`.
///
/// Output is ordered by site (dataset iteration order), then by position in
/// the site's readings. Sites with fewer than two readings yield nothing.
pub fn find_anomalies(dataset: &SiteDataset) -> Vec<Anomaly> {
    dataset.records().flat_map(site_anomalies).collect()
}

/// Anomalies for a single site, oldest first.
pub fn site_anomalies(record: &SiteRecord) -> Vec<Anomaly> {
    record
        .readings
        .windows(2)
        .map(|pair| Anomaly {
            site_id: record.site_id.clone(),
            site_name: record.site_name.clone(),
            timestamp: pair[1].timestamp.clone(),
            prev_value: pair[0].value,
            curr_value: pair[1].value,
        })
        .filter(|candidate| exceeds_threshold(candidate.delta()))
        .collect()
}

/// Strictly greater than: a change of exactly the threshold is not flagged.
pub fn exceeds_threshold(delta: f64) -> bool {
    delta.abs() > ANOMALY_THRESHOLD_FT
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
