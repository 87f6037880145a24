//! Water-level anomaly detection over USGS instantaneous gage height data.
//!
//! Pipeline: `ingest::usgs` (fetch + normalize) → `analysis::merge` →
//! `analysis::anomalies` → `report`.

pub mod analysis;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod regions;
pub mod report;
