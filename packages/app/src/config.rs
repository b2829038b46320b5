//! Endpoint and credential configuration.
//!
//! Endpoint base URLs are embedded at compile time from `endpoints.toml`;
//! API keys come from the environment and are never persisted.

use serde::Deserialize;

/// Base URLs of the three external services, loaded from the embedded
/// `endpoints.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Endpoints {
    /// Seoul open-data API (parking directory).
    pub directory_base_url: String,
    /// Kakao Mobility directions API.
    pub routing_base_url: String,
    /// Kakao Local API (geocoding).
    pub geocoder_base_url: String,
}

const ENDPOINTS_TOML: &str = include_str!("../endpoints.toml");

impl Endpoints {
    /// Returns the compiled-in endpoint configuration.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (a compile-time guarantee,
    /// since the file ships with the crate).
    #[must_use]
    pub fn embedded() -> Self {
        toml::from_str(ENDPOINTS_TOML).expect("embedded endpoints.toml is valid")
    }
}

/// API keys read from environment variables.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Seoul open-data key (`SEOUL_OPEN_API_KEY`), embedded in the
    /// directory request path.
    pub seoul_api_key: String,
    /// Kakao REST key (`KAKAO_REST_API_KEY`), sent as the `KakaoAK`
    /// authorization header to both Kakao services.
    pub kakao_rest_key: String,
}

impl Credentials {
    /// Reads credentials from the environment.
    ///
    /// Returns `Some` only when **both** `SEOUL_OPEN_API_KEY` and
    /// `KAKAO_REST_API_KEY` are set and non-empty.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let seoul_api_key = std::env::var("SEOUL_OPEN_API_KEY").ok()?;
        let kakao_rest_key = std::env::var("KAKAO_REST_API_KEY").ok()?;
        if seoul_api_key.is_empty() || kakao_rest_key.is_empty() {
            return None;
        }
        Some(Self {
            seoul_api_key,
            kakao_rest_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_endpoints_parse() {
        let endpoints = Endpoints::embedded();
        assert!(endpoints.directory_base_url.starts_with("http"));
        assert!(endpoints.routing_base_url.starts_with("https"));
        assert!(endpoints.geocoder_base_url.starts_with("https"));
    }

    #[test]
    fn credentials_from_env_returns_none_when_unset() {
        // Safety: test-only; no other threads depend on these env vars.
        unsafe {
            std::env::remove_var("SEOUL_OPEN_API_KEY");
            std::env::remove_var("KAKAO_REST_API_KEY");
        }
        assert!(Credentials::from_env().is_none());
    }
}
