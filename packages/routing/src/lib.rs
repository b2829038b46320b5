#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Kakao Mobility directions client.
//!
//! One request per route, `priority=RECOMMEND`, and only the first returned
//! route is used even when the API offers alternatives. Road geometry
//! arrives as flat `vertexes` arrays of alternating longitude/latitude
//! values — longitude first. That ordering is the API's convention and is
//! preserved exactly by [`decode_vertexes`].
//!
//! See <https://developers.kakaomobility.com/docs/navi-api/directions/>

use serde::Deserialize;
use sparking_models::{Coordinate, RouteSummary};

/// Errors that can occur while fetching or decoding a route.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON decoding failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response carried no routes.
    #[error("No route between the requested points")]
    NoRoute,

    /// A road's vertex array had an odd number of values.
    #[error("Odd vertex array length {len}: vertexes must be (lon, lat) pairs")]
    OddVertexArray {
        /// The offending array length.
        len: usize,
    },
}

/// Configuration for route fetches.
#[derive(Debug, Clone)]
pub struct RoutingConfig<'a> {
    /// API base URL (e.g., `"https://apis-navi.kakaomobility.com"`).
    pub base_url: &'a str,
    /// REST API key, sent as `Authorization: KakaoAK {key}`.
    pub api_key: &'a str,
}

/// Fetches the recommended driving route between two coordinates.
///
/// # Errors
///
/// Returns [`RouteError`] if the request fails, the response does not match
/// the expected schema, or no route exists.
pub async fn fetch_route(
    client: &reqwest::Client,
    config: &RoutingConfig<'_>,
    origin: Coordinate,
    destination: Coordinate,
) -> Result<RouteSummary, RouteError> {
    let url = format!("{}/v1/directions", config.base_url.trim_end_matches('/'));

    log::info!(
        "Fetching route ({}, {}) -> ({}, {})",
        origin.latitude,
        origin.longitude,
        destination.latitude,
        destination.longitude
    );

    let response = client
        .get(&url)
        .query(&[
            ("origin", format!("{},{}", origin.longitude, origin.latitude)),
            (
                "destination",
                format!("{},{}", destination.longitude, destination.latitude),
            ),
            ("priority", "RECOMMEND".to_string()),
        ])
        .header("Authorization", format!("KakaoAK {}", config.api_key))
        .send()
        .await?;

    let body = response.text().await?;
    parse_route_response(&body)
}

/// Parses a directions response body into a [`RouteSummary`].
///
/// Only the first route is used.
///
/// # Errors
///
/// Returns [`RouteError`] on schema mismatch, an empty `routes` array, or
/// an odd-length vertex array.
pub fn parse_route_response(body: &str) -> Result<RouteSummary, RouteError> {
    let root: DirectionsRoot = serde_json::from_str(body)?;
    let route = root.routes.into_iter().next().ok_or(RouteError::NoRoute)?;

    let mut roads = Vec::new();
    for section in route.sections {
        for road in section.roads {
            roads.push(decode_vertexes(&road.vertexes)?);
        }
    }

    Ok(RouteSummary {
        duration_secs: route.summary.duration,
        roads,
    })
}

/// Decodes a flat vertex array of alternating `(longitude, latitude)`
/// values into coordinates.
///
/// # Errors
///
/// Returns [`RouteError::OddVertexArray`] when the array length is odd.
pub fn decode_vertexes(vertexes: &[f64]) -> Result<Vec<Coordinate>, RouteError> {
    if vertexes.len() % 2 != 0 {
        return Err(RouteError::OddVertexArray {
            len: vertexes.len(),
        });
    }

    Ok(vertexes
        .chunks_exact(2)
        .map(|pair| Coordinate::new(pair[1], pair[0]))
        .collect())
}

#[derive(Debug, Deserialize)]
struct DirectionsRoot {
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    summary: Summary,
    #[serde(default)]
    sections: Vec<Section>,
}

#[derive(Debug, Deserialize)]
struct Summary {
    duration: u64,
}

#[derive(Debug, Deserialize)]
struct Section {
    #[serde(default)]
    roads: Vec<Road>,
}

#[derive(Debug, Deserialize)]
struct Road {
    #[serde(default)]
    vertexes: Vec<f64>,
}
