/// Data retrieval from external providers.
///
/// Submodules:
/// - `usgs` — NWIS Instantaneous Values requests and response normalization.

pub mod usgs;
