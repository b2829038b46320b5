//! Kakao Local REST API geocoder.
//!
//! Forward geocoding uses the address search endpoint, reverse geocoding
//! the coord2address endpoint. Both authenticate with a
//! `Authorization: KakaoAK {key}` header and return a `documents` array;
//! an empty array is a miss, not an error.
//!
//! See <https://developers.kakao.com/docs/latest/ko/local/dev-guide>

use async_trait::async_trait;
use sparking_models::Coordinate;

use crate::{GeocodeError, Geocoder};

/// Geocoder backed by the Kakao Local REST API.
#[derive(Debug, Clone)]
pub struct KakaoGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl KakaoGeocoder {
    /// Creates a geocoder using the given shared HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn authorization(&self) -> String {
        format!("KakaoAK {}", self.api_key)
    }
}

#[async_trait]
impl Geocoder for KakaoGeocoder {
    async fn forward(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let url = format!("{}/v2/local/search/address.json", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("query", address), ("size", "1")])
            .header("Authorization", self.authorization())
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(GeocodeError::Parse {
                message: format!("Kakao address search returned status {}", resp.status()),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_forward_response(&body)
    }

    async fn reverse(&self, coordinate: Coordinate) -> Result<Option<String>, GeocodeError> {
        let url = format!("{}/v2/local/geo/coord2address.json", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("x", coordinate.longitude.to_string()),
                ("y", coordinate.latitude.to_string()),
            ])
            .header("Authorization", self.authorization())
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(GeocodeError::Parse {
                message: format!("Kakao coord2address returned status {}", resp.status()),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_reverse_response(&body)
    }
}

/// Parses an address-search response into a coordinate.
///
/// Kakao serializes coordinates as strings: `x` is longitude, `y` latitude.
fn parse_forward_response(body: &serde_json::Value) -> Result<Option<Coordinate>, GeocodeError> {
    let documents = body
        .get("documents")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| GeocodeError::Parse {
            message: "Kakao response missing 'documents' array".to_string(),
        })?;

    let Some(first) = documents.first() else {
        return Ok(None);
    };

    let longitude = first["x"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing x (longitude) in Kakao document".to_string(),
        })?;

    let latitude = first["y"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing y (latitude) in Kakao document".to_string(),
        })?;

    Ok(Some(Coordinate::new(latitude, longitude)))
}

/// Parses a coord2address response into a place description.
fn parse_reverse_response(body: &serde_json::Value) -> Result<Option<String>, GeocodeError> {
    let documents = body
        .get("documents")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| GeocodeError::Parse {
            message: "Kakao response missing 'documents' array".to_string(),
        })?;

    let Some(first) = documents.first() else {
        return Ok(None);
    };

    let address_name = first
        .pointer("/address/address_name")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| GeocodeError::Parse {
            message: "Document missing address.address_name".to_string(),
        })?;

    Ok(Some(address_name.to_string()))
}
