//! Multi-region dataset merging.
//!
//! Neighbouring states' queries regularly return the same border gauges, so a
//! site present in more than one regional dataset is the normal case. The
//! builder takes ownership of each regional dataset, so nothing a caller
//! still holds can alias the combined result.

use crate::model::SiteDataset;

/// Accumulates regional datasets into one combined dataset.
///
/// ```
/// use water_anomalies::analysis::merge::DatasetBuilder;
/// use water_anomalies::ingest::usgs::parse_iv_response;
///
/// let texas = parse_iv_response(r#"{"value": {"timeSeries": []}}"#).unwrap();
/// let oklahoma = parse_iv_response(r#"{"value": {"timeSeries": []}}"#).unwrap();
///
/// let combined = DatasetBuilder::new().add(texas).add(oklahoma).build();
/// assert!(combined.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    combined: SiteDataset,
    sources: usize,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one regional dataset in.
    ///
    /// A new site is inserted as-is. For a known site the readings are
    /// appended and the whole sequence is stably re-sorted by timestamp.
    pub fn add(mut self, dataset: SiteDataset) -> Self {
        self.push(dataset);
        self
    }

    /// In-place form of `add`, for loops.
    pub fn push(&mut self, dataset: SiteDataset) {
        for record in dataset {
            self.combined.absorb(record);
        }
        self.sources += 1;
    }

    /// Number of datasets folded in so far.
    pub fn source_count(&self) -> usize {
        self.sources
    }

    pub fn build(self) -> SiteDataset {
        self.combined
    }
}

/// Combines regional datasets, in the given order, into one.
pub fn combine_datasets<I>(datasets: I) -> SiteDataset
where
    I: IntoIterator<Item = SiteDataset>,
{
    let mut builder = DatasetBuilder::new();
    for dataset in datasets {
        builder.push(dataset);
    }
    builder.build()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
