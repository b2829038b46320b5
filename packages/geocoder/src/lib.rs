#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Forward and reverse geocoding for the parking map.
//!
//! Geocoding is best-effort: a miss (`Ok(None)`) means "skip this record",
//! never "retry". The [`Geocoder`] trait is the seam between the
//! reconciliation core and the concrete provider, so the core can be tested
//! with a scripted fake.
//!
//! The concrete provider is the Kakao Local REST API ([`kakao`]). Address
//! cleaning utilities for the Seoul parking directory live in [`address`].

pub mod address;
pub mod kakao;

use async_trait::async_trait;
use sparking_models::Coordinate;
use thiserror::Error;

/// Errors from geocoding operations.
///
/// A zero-result lookup is *not* an error; it is `Ok(None)` on the trait
/// methods.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

/// A forward/reverse geocoding provider.
///
/// Calls are independent of each other: no ordering is guaranteed between
/// concurrent lookups, and implementations must tolerate an unbounded
/// number of in-flight calls.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolves a free-text address to a coordinate.
    ///
    /// Returns `Ok(None)` when the provider has no placemark for the
    /// address. Callers must treat that as "skip", not as retryable.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing fails.
    async fn forward(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError>;

    /// Resolves a coordinate to a human-readable address.
    ///
    /// Returns `Ok(None)` when the provider has no address for the point.
    /// On failure or miss, callers keep their previously known address.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing fails.
    async fn reverse(&self, coordinate: Coordinate) -> Result<Option<String>, GeocodeError>;
}
