/// USGS NWIS Instantaneous Values (IV) client and response normalizer.
///
/// Retrieves recent gage height readings for a whole state and turns the
/// JSON response into a `SiteDataset`.
///
/// API Documentation: https://waterservices.usgs.gov/docs/instantaneous-values/

use std::time::Duration;

use serde_json::Value;

use crate::model::{NwisError, Reading, SiteDataset, SiteRecord, sort_by_timestamp, PARAM_STAGE};

const IV_BASE_URL: &str = "https://waterservices.usgs.gov/nwis/iv/";

/// How far back each request reaches (ISO 8601 duration).
pub const DEFAULT_PERIOD: &str = "P3D";

// ============================================================================
// Request
// ============================================================================

/// Builds the IV request URL for every site in a state, active or not.
///
/// # Parameters
/// - `state_code`: two-letter USGS state code, e.g. "tx"
/// - `parameter_code`: USGS parameter code, e.g. `PARAM_STAGE`
/// - `period`: ISO 8601 duration, e.g. "P3D"
pub fn build_iv_url(state_code: &str, parameter_code: &str, period: &str) -> String {
    format!(
        "{}?format=json&stateCd={}&period={}&siteStatus=all&parameterCd={}",
        IV_BASE_URL, state_code, period, parameter_code
    )
}

/// Builds the blocking HTTP client used for every region request.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::blocking::Client, reqwest::Error> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

/// Fetches the raw IV response body for one region.
///
/// No retries. A non-2xx status becomes `NwisError::HttpError` naming the
/// region; transport failures become `NwisError::RequestFailed`.
pub fn fetch_region(
    client: &reqwest::blocking::Client,
    region: &str,
) -> Result<String, NwisError> {
    let url = build_iv_url(region, PARAM_STAGE, DEFAULT_PERIOD);

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .map_err(|e| NwisError::RequestFailed {
            region: region.to_string(),
            message: e.to_string(),
        })?;

    if !response.status().is_success() {
        return Err(NwisError::HttpError {
            region: region.to_string(),
            status: response.status().as_u16(),
        });
    }

    response.text().map_err(|e| NwisError::RequestFailed {
        region: region.to_string(),
        message: e.to_string(),
    })
}

// ============================================================================
// Normalizer
// ============================================================================

/// Parses an IV response body into per-site, time-ordered readings.
///
/// Expected shape:
/// ```text
/// value.timeSeries[i].sourceInfo.siteName
/// value.timeSeries[i].sourceInfo.siteCode[0].value
/// value.timeSeries[i].values[0].value[j].{dateTime, value}
/// ```
///
/// Each block's readings are sorted by timestamp. A site appearing in more
/// than one block (several sensors or methods) is folded into one record.
pub fn parse_iv_response(body: &str) -> Result<SiteDataset, NwisError> {
    let json: Value =
        serde_json::from_str(body).map_err(|e| NwisError::ParseError(e.to_string()))?;
    normalize_response(&json)
}

/// Same as `parse_iv_response`, for a document already decoded to JSON.
pub fn normalize_response(json: &Value) -> Result<SiteDataset, NwisError> {
    let series = field(json, "value", "")
        .and_then(|v| field(v, "timeSeries", "value"))?
        .as_array()
        .ok_or_else(|| missing("value.timeSeries"))?;

    let mut dataset = SiteDataset::new();
    for (i, block) in series.iter().enumerate() {
        let record = parse_block(block, &format!("value.timeSeries[{}]", i))?;
        dataset.absorb(record);
    }
    Ok(dataset)
}

fn parse_block(block: &Value, path: &str) -> Result<SiteRecord, NwisError> {
    let info_path = format!("{}.sourceInfo", path);
    let info = field(block, "sourceInfo", path)?;

    let site_name = string_field(info, "siteName", &info_path)?;
    let code_path = format!("{}.siteCode[0]", info_path);
    let site_id = field(info, "siteCode", &info_path)?
        .get(0)
        .ok_or_else(|| missing(&code_path))
        .and_then(|code| string_field(code, "value", &code_path))?;

    let values_path = format!("{}.values[0]", path);
    let raw_readings = field(block, "values", path)?
        .get(0)
        .ok_or_else(|| missing(&values_path))
        .and_then(|v| field(v, "value", &values_path))?
        .as_array()
        .ok_or_else(|| missing(&format!("{}.value", values_path)))?;

    let mut readings = Vec::with_capacity(raw_readings.len());
    for (j, raw) in raw_readings.iter().enumerate() {
        let reading_path = format!("{}.value[{}]", values_path, j);
        readings.push(parse_reading(raw, &site_id, &reading_path)?);
    }
    sort_by_timestamp(&mut readings);

    Ok(SiteRecord {
        site_id,
        site_name,
        readings,
    })
}

fn parse_reading(raw: &Value, site_id: &str, path: &str) -> Result<Reading, NwisError> {
    let timestamp = string_field(raw, "dateTime", path)?;
    let value_path = format!("{}.value", path);

    let value = match raw.get("value") {
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| NwisError::ValueParse {
            site_id: site_id.to_string(),
            timestamp: timestamp.clone(),
            raw: s.clone(),
        })?,
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| missing(&value_path))?,
        Some(other) => {
            return Err(NwisError::ValueParse {
                site_id: site_id.to_string(),
                timestamp,
                raw: other.to_string(),
            })
        }
        None => return Err(missing(&value_path)),
    };

    Ok(Reading { timestamp, value })
}

// ---------------------------------------------------------------------------
// JSON path helpers
// ---------------------------------------------------------------------------

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn missing(path: &str) -> NwisError {
    NwisError::DataFormat {
        path: path.to_string(),
    }
}

fn field<'a>(value: &'a Value, key: &str, parent: &str) -> Result<&'a Value, NwisError> {
    value.get(key).ok_or_else(|| missing(&join(parent, key)))
}

fn string_field(value: &Value, key: &str, parent: &str) -> Result<String, NwisError> {
    field(value, key, parent)?
        .as_str()
        .map(String::from)
        .ok_or_else(|| missing(&join(parent, key)))
}

// ============================================================================
// Tests
// ============================================================================
