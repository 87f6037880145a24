/// Merge and scan stages of the anomaly pipeline.
///
/// Both stages are pure and in-memory: they take normalized datasets and
/// cannot fail. Anything malformed has already been rejected by
/// `ingest::usgs`.
///
/// Submodules:
/// - `merge` — combines per-region datasets into one, keyed by site.
/// - `anomalies` — flags adjacent readings that jump past the threshold.

pub mod anomalies;
pub mod merge;
