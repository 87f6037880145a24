/// Region registry: the USGS state codes the IV service accepts in `stateCd`.
///
/// This is the single source of truth for region codes. Configuration and
/// command line input are validated against it before any request is made,
/// so a typo fails fast instead of costing a round trip.

use crate::model::NwisError;

// ---------------------------------------------------------------------------
// Region metadata
// ---------------------------------------------------------------------------

/// A queryable region.
pub struct Region {
    /// Lowercase two-letter postal code, as sent in `stateCd`.
    pub code: &'static str,
    /// State or territory name.
    pub name: &'static str,
}

macro_rules! region {
    ($code:literal, $name:literal) => {
        Region { code: $code, name: $name }
    };
}

/// Every state and territory the IV service can be queried by.
pub static REGION_REGISTRY: &[Region] = &[
    region!("al", "Alabama"),
    region!("ak", "Alaska"),
    region!("az", "Arizona"),
    region!("ar", "Arkansas"),
    region!("ca", "California"),
    region!("co", "Colorado"),
    region!("ct", "Connecticut"),
    region!("de", "Delaware"),
    region!("dc", "District of Columbia"),
    region!("fl", "Florida"),
    region!("ga", "Georgia"),
    region!("hi", "Hawaii"),
    region!("id", "Idaho"),
    region!("il", "Illinois"),
    region!("in", "Indiana"),
    region!("ia", "Iowa"),
    region!("ks", "Kansas"),
    region!("ky", "Kentucky"),
    region!("la", "Louisiana"),
    region!("me", "Maine"),
    region!("md", "Maryland"),
    region!("ma", "Massachusetts"),
    region!("mi", "Michigan"),
    region!("mn", "Minnesota"),
    region!("ms", "Mississippi"),
    region!("mo", "Missouri"),
    region!("mt", "Montana"),
    region!("ne", "Nebraska"),
    region!("nv", "Nevada"),
    region!("nh", "New Hampshire"),
    region!("nj", "New Jersey"),
    region!("nm", "New Mexico"),
    region!("ny", "New York"),
    region!("nc", "North Carolina"),
    region!("nd", "North Dakota"),
    region!("oh", "Ohio"),
    region!("ok", "Oklahoma"),
    region!("or", "Oregon"),
    region!("pa", "Pennsylvania"),
    region!("ri", "Rhode Island"),
    region!("sc", "South Carolina"),
    region!("sd", "South Dakota"),
    region!("tn", "Tennessee"),
    region!("tx", "Texas"),
    region!("ut", "Utah"),
    region!("vt", "Vermont"),
    region!("va", "Virginia"),
    region!("wa", "Washington"),
    region!("wv", "West Virginia"),
    region!("wi", "Wisconsin"),
    region!("wy", "Wyoming"),
    region!("pr", "Puerto Rico"),
    region!("vi", "U.S. Virgin Islands"),
    region!("gu", "Guam"),
    region!("as", "American Samoa"),
    region!("mp", "Northern Mariana Islands"),
];

/// Regions queried when nothing else is configured.
pub const DEFAULT_REGIONS: &[&str] = &["tx", "ok"];

/// Looks up a region by code, case-insensitively. Returns `None` if unknown.
pub fn find_region(code: &str) -> Option<&'static Region> {
    let code = code.trim();
    REGION_REGISTRY
        .iter()
        .find(|r| r.code.eq_ignore_ascii_case(code))
}

/// Normalizes a region code to the registry's lowercase form.
pub fn normalize_region_code(code: &str) -> Result<&'static str, NwisError> {
    find_region(code)
        .map(|r| r.code)
        .ok_or_else(|| NwisError::UnknownRegion(code.trim().to_string()))
}

/// Normalizes a list of codes, preserving order and dropping repeats.
pub fn normalize_region_list<S: AsRef<str>>(codes: &[S]) -> Result<Vec<String>, NwisError> {
    let mut out: Vec<String> = Vec::with_capacity(codes.len());
    for code in codes {
        let normalized = normalize_region_code(code.as_ref())?;
        if !out.iter().any(|c| c == normalized) {
            out.push(normalized.to_string());
        }
    }
    Ok(out)
}

/// Display name for a region code, falling back to the code itself.
pub fn region_name(code: &str) -> &str {
    find_region(code).map(|r| r.name).unwrap_or(code)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
