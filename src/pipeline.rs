//! Sequential fetch → normalize → merge → scan.
//!
//! Regions are processed one at a time in the given order. The fetch step is
//! passed in as a closure so the pipeline can run against canned responses.

use crate::analysis::anomalies::find_anomalies;
use crate::analysis::merge::DatasetBuilder;
use crate::ingest::usgs;
use crate::logging::{self, DataSource};
use crate::model::{Anomaly, NwisError, SiteDataset};

/// What to do when one region cannot be fetched or parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop and return the region's error.
    #[default]
    Abort,
    /// Log the error, leave the region out, carry on.
    SkipRegion,
}

/// Result of a full run.
#[derive(Debug)]
pub struct RunOutcome {
    pub combined: SiteDataset,
    pub anomalies: Vec<Anomaly>,
    /// Regions that contributed data, in query order.
    pub succeeded: Vec<String>,
    /// Regions left out under `FailurePolicy::SkipRegion`, with their errors.
    pub skipped: Vec<(String, NwisError)>,
}

/// Fetches and normalizes every region, then merges the datasets.
///
/// Returns the combined dataset plus the list of succeeded and skipped
/// regions. Under `FailurePolicy::Abort` the first failing region's error is
/// returned and nothing is merged.
pub fn collect_regions<F>(
    regions: &[String],
    policy: FailurePolicy,
    mut fetch: F,
) -> Result<(SiteDataset, Vec<String>, Vec<(String, NwisError)>), NwisError>
where
    F: FnMut(&str) -> Result<String, NwisError>,
{
    let mut builder = DatasetBuilder::new();
    let mut succeeded = Vec::new();
    let mut skipped = Vec::new();

    for region in regions {
        logging::info(
            DataSource::Usgs,
            Some(region.as_str()),
            &format!("Fetching data for {}", region),
        );

        let result = fetch(region.as_str()).and_then(|body| usgs::parse_iv_response(&body));
        match result {
            Ok(dataset) => {
                logging::debug(
                    DataSource::Usgs,
                    Some(region.as_str()),
                    &format!(
                        "{} sites, {} readings",
                        dataset.len(),
                        dataset.reading_count()
                    ),
                );
                builder.push(dataset);
                succeeded.push(region.clone());
                logging::debug(
                    DataSource::Usgs,
                    Some(region.as_str()),
                    &format!("{} region(s) merged so far", builder.source_count()),
                );
            }
            Err(e) => {
                logging::log_usgs_failure(region, "Fetch", &e);
                match policy {
                    FailurePolicy::Abort => return Err(e),
                    FailurePolicy::SkipRegion => skipped.push((region.clone(), e)),
                }
            }
        }
    }

    logging::log_fetch_summary(regions.len(), succeeded.len(), skipped.len());
    Ok((builder.build(), succeeded, skipped))
}

/// Runs the whole pipeline over `regions`.
pub fn run<F>(regions: &[String], policy: FailurePolicy, fetch: F) -> Result<RunOutcome, NwisError>
where
    F: FnMut(&str) -> Result<String, NwisError>,
{
    let (combined, succeeded, skipped) = collect_regions(regions, policy, fetch)?;
    let anomalies = find_anomalies(&combined);

    logging::info(
        DataSource::System,
        None,
        &format!(
            "Scanned {} sites ({} readings), {} anomalies",
            combined.len(),
            combined.reading_count(),
            anomalies.len()
        ),
    );

    Ok(RunOutcome {
        combined,
        anomalies,
        succeeded,
        skipped,
    })
}

/// Runs the pipeline against the live USGS service.
pub fn run_live(
    client: &reqwest::blocking::Client,
    regions: &[String],
    policy: FailurePolicy,
) -> Result<RunOutcome, NwisError> {
    run(regions, policy, |region| usgs::fetch_region(client, region))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(site_id: &str, readings: &[(&str, &str)]) -> String {
        let values: Vec<_> = readings
            .iter()
            .map(|(t, v)| json!({ "dateTime": t, "value": v }))
            .collect();
        json!({ "value": { "timeSeries": [{
            "sourceInfo": { "siteName": "Red River near Gainesville, TX", "siteCode": [{ "value": site_id }] },
            "values": [{ "value": values }]
        }]}})
        .to_string()
    }

    fn regions(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_regions_fetched_in_order() {
        let mut calls = Vec::new();
        let outcome = run(&regions(&["tx", "ok"]), FailurePolicy::Abort, |region| {
            calls.push(region.to_string());
            Ok(body("07316000", &[]))
        })
        .expect("run should succeed");

        assert_eq!(calls, vec!["tx".to_string(), "ok".to_string()]);
        assert_eq!(outcome.succeeded, calls);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_border_site_merged_then_scanned() {
        let outcome = run(&regions(&["tx", "ok"]), FailurePolicy::Abort, |region| {
            Ok(match region {
                "tx" => body("07316000", &[("2024-01-01T00:15:00", "10.0")]),
                _ => body("07316000", &[("2024-01-01T00:00:00", "3.0")]),
            })
        })
        .expect("run should succeed");

        assert_eq!(outcome.combined.len(), 1);
        assert_eq!(outcome.anomalies.len(), 1);
        assert_eq!(outcome.anomalies[0].prev_value, 3.0);
        assert_eq!(outcome.anomalies[0].curr_value, 10.0);
    }

    #[test]
    fn test_abort_policy_returns_first_error() {
        let result = run(&regions(&["tx", "ok"]), FailurePolicy::Abort, |region| {
            Err(NwisError::HttpError { region: region.to_string(), status: 503 })
        });
        assert_eq!(
            result.err(),
            Some(NwisError::HttpError { region: "tx".to_string(), status: 503 })
        );
    }

    #[test]
    fn test_skip_policy_keeps_remaining_regions() {
        let outcome = run(&regions(&["tx", "ok"]), FailurePolicy::SkipRegion, |region| {
            match region {
                "tx" => Ok("{\"value\": {}}".to_string()),
                _ => Ok(body("07331000", &[("2024-01-01T00:00:00", "1.0")])),
            }
        })
        .expect("skip policy should not fail the run");

        assert_eq!(outcome.succeeded, vec!["ok".to_string()]);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].0, "tx");
        assert_eq!(
            outcome.skipped[0].1,
            NwisError::DataFormat { path: "value.timeSeries".to_string() }
        );
        assert!(outcome.combined.contains("07331000"));
    }
}
