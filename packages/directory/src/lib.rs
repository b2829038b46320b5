#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Seoul open-data parking directory client.
//!
//! Fetches the `GetParkingInfo` dataset for one district per request with a
//! fixed page size and normalizes the rows into
//! [`sparking_models::ParkingLotRecord`]. A response without rows is a
//! valid "no data" result, not an error.
//!
//! Dataset: <http://openapi.seoul.go.kr:8088> (공영주차장 안내 정보)

use serde::Deserialize;
use sparking_models::ParkingLotRecord;

/// Errors that can occur while fetching the parking directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON decoding failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fixed page size: records 1 through 200 of the queried district.
pub const PAGE_SIZE: u32 = 200;

/// Configuration for directory fetches.
#[derive(Debug, Clone)]
pub struct DirectoryConfig<'a> {
    /// API base URL (e.g., `"http://openapi.seoul.go.kr:8088"`).
    pub base_url: &'a str,
    /// Open-data API key, embedded in the request path.
    pub api_key: &'a str,
}

/// Fetches the parking lots of one district.
///
/// Returns an empty list when the district has no records; callers treat
/// that as "no data".
///
/// # Errors
///
/// Returns [`DirectoryError`] if the request fails or the response does not
/// match the expected schema.
pub async fn fetch_parking_lots(
    client: &reqwest::Client,
    config: &DirectoryConfig<'_>,
    district: &str,
) -> Result<Vec<ParkingLotRecord>, DirectoryError> {
    let url = format!(
        "{}/{}/json/GetParkingInfo/1/{PAGE_SIZE}/{district}",
        config.base_url.trim_end_matches('/'),
        config.api_key
    );

    log::info!("Fetching parking directory for {district}");
    let response = client.get(&url).send().await?;
    let body = response.text().await?;

    let records = parse_parking_response(&body)?;
    log::info!("{district}: {} parking lot records", records.len());
    Ok(records)
}

/// Parses a `GetParkingInfo` response body.
///
/// A body without the `GetParkingInfo` object (the API's shape for a
/// zero-record district) or with an empty `row` array yields an empty list.
///
/// # Errors
///
/// Returns [`DirectoryError::Json`] when the body is not the expected shape.
pub fn parse_parking_response(body: &str) -> Result<Vec<ParkingLotRecord>, DirectoryError> {
    let root: Root = serde_json::from_str(body)?;

    let Some(info) = root.get_parking_info else {
        return Ok(Vec::new());
    };

    let mut records = Vec::with_capacity(info.row.len());
    for row in info.row {
        match row.normalize() {
            Some(record) => records.push(record),
            None => log::debug!("skipping directory row without name or address"),
        }
    }
    Ok(records)
}

#[derive(Debug, Deserialize)]
struct Root {
    #[serde(rename = "GetParkingInfo", default)]
    get_parking_info: Option<Body>,
}

#[derive(Debug, Deserialize)]
struct Body {
    #[serde(default)]
    row: Vec<Record>,
}

/// One wire row of the dataset. Fields the app does not use are ignored.
#[derive(Debug, Deserialize)]
struct Record {
    #[serde(rename = "PKLT_NM", default)]
    name: Option<String>,
    #[serde(rename = "ADDR", default)]
    address: Option<String>,
    #[serde(rename = "PAY_YN_NM", default)]
    pay_display: Option<String>,
    #[serde(rename = "BSC_PRK_CRG", default)]
    base_charge: Option<f64>,
    #[serde(rename = "TPKCT", default)]
    capacity: Option<f64>,
    #[serde(rename = "NOW_PRK_VHCL_CNT", default)]
    occupied: Option<f64>,
}

impl Record {
    /// Maps the wire row into the normalized record. Rows without a name or
    /// address cannot be pinned and are dropped.
    fn normalize(self) -> Option<ParkingLotRecord> {
        let name = self.name?;
        let address = self.address?;
        Some(ParkingLotRecord {
            name,
            address,
            fee_display: self.pay_display.unwrap_or_default(),
            base_charge: self.base_charge.unwrap_or(0.0).max(0.0),
            capacity: to_count(self.capacity),
            occupied: to_count(self.occupied),
        })
    }
}

/// Converts an optional wire count to a non-negative integer.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_count(value: Option<f64>) -> u32 {
    value.unwrap_or(0.0).max(0.0) as u32
}
