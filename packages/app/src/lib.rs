#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Application wiring for the parking map.
//!
//! [`App`] connects the external clients to the presenter: device location
//! updates and map taps drive reverse geocoding and district-scoped
//! directory queries, search input drives a forward-geocoded recenter plus
//! the same query, and a selected lot drives the navigate flow. All display
//! state ends up in the [`MapPresenter`] owned by the app.
//!
//! A UI shell embeds this crate, forwards its events into these methods,
//! and renders the presenter's snapshots.

pub mod config;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sparking_directory::{DirectoryConfig, DirectoryError, fetch_parking_lots};
use sparking_geocoder::kakao::KakaoGeocoder;
use sparking_geocoder::{GeocodeError, Geocoder as _, address};
use sparking_map::MapPresenter;
use sparking_models::{Coordinate, ParkingLotRecord, Region, RouteSummary};
use sparking_reconciler::{BatchOutcome, Reconciler};
use sparking_routing::{RouteError, RoutingConfig, fetch_route};

pub use config::{Credentials, Endpoints};

/// District queried on first launch, before any location fix arrives —
/// City Hall sits in 중구.
pub const DEFAULT_DISTRICT: &str = "중구";

/// Errors surfaced by the app flows.
///
/// Flow-internal geocode misses are handled by skipping, not by error:
/// only transport/decode failures and an unresolvable navigation
/// destination reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Geocoding failed.
    #[error("Geocoding error: {0}")]
    Geocode(#[from] GeocodeError),

    /// Directory fetch failed.
    #[error("Parking directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Route fetch failed.
    #[error("Routing error: {0}")]
    Route(#[from] RouteError),

    /// The selected lot's address could not be resolved to a coordinate.
    #[error("Destination address could not be resolved: {address}")]
    DestinationNotFound {
        /// The unresolvable raw address.
        address: String,
    },

    /// Navigation was requested before any location fix.
    #[error("No known current location")]
    NoCurrentLocation,
}

/// The wired-up application: shared HTTP client, clients, reconciler, and
/// presenter.
pub struct App {
    http: reqwest::Client,
    endpoints: Endpoints,
    credentials: Credentials,
    geocoder: Arc<KakaoGeocoder>,
    presenter: Arc<MapPresenter>,
    reconciler: Reconciler<KakaoGeocoder, MapPresenter>,
    district: Mutex<Option<String>>,
}

impl App {
    /// Builds the app with the embedded endpoints and the given keys.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self::with_endpoints(Endpoints::embedded(), credentials)
    }

    /// Builds the app against explicit endpoints (used to point the
    /// clients at test servers).
    #[must_use]
    pub fn with_endpoints(endpoints: Endpoints, credentials: Credentials) -> Self {
        let http = reqwest::Client::new();
        let geocoder = Arc::new(KakaoGeocoder::new(
            http.clone(),
            &endpoints.geocoder_base_url,
            &credentials.kakao_rest_key,
        ));
        let presenter = Arc::new(MapPresenter::new());
        let reconciler = Reconciler::new(Arc::clone(&geocoder), Arc::clone(&presenter));
        Self {
            http,
            endpoints,
            credentials,
            geocoder,
            presenter,
            reconciler,
            district: Mutex::new(None),
        }
    }

    /// The presenter holding everything the map screen displays.
    #[must_use]
    pub fn presenter(&self) -> Arc<MapPresenter> {
        Arc::clone(&self.presenter)
    }

    /// The district whose lots are currently queried, if any.
    pub fn current_district(&self) -> Option<String> {
        self.district().clone()
    }

    fn district(&self) -> MutexGuard<'_, Option<String>> {
        self.district.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// First launch: center on City Hall and load the default district.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] if the directory fetch fails.
    pub async fn start(&self) -> Result<BatchOutcome, AppError> {
        self.presenter.update_current_location(Coordinate::CITY_HALL);
        self.query_district(DEFAULT_DISTRICT).await
    }

    /// Location permission was denied: fall back to City Hall.
    pub fn location_permission_denied(&self) {
        log::info!("location permission denied, falling back to City Hall");
        self.presenter.update_current_location(Coordinate::CITY_HALL);
    }

    /// A location update or map tap moved the user's position.
    ///
    /// Recenters on the new position, reverse geocodes it, and when the
    /// extracted district differs from the current one, re-queries the
    /// directory. Reverse-geocode failures and misses keep the prior
    /// district; an unchanged district skips the query. Returns the batch
    /// outcome when a query ran.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] if the directory fetch for a changed district
    /// fails.
    pub async fn location_changed(
        &self,
        coordinate: Coordinate,
    ) -> Result<Option<BatchOutcome>, AppError> {
        self.presenter.update_current_location(coordinate);

        let description = match self.geocoder.reverse(coordinate).await {
            Ok(Some(description)) => description,
            Ok(None) => {
                log::debug!("no address for the new position");
                return Ok(None);
            }
            Err(e) => {
                log::warn!("reverse geocode failed: {e}");
                return Ok(None);
            }
        };

        let Some(district) = address::district_from_address(&description) else {
            log::debug!("no district in '{description}'");
            return Ok(None);
        };

        if self.district().as_deref() == Some(district.as_str()) {
            log::debug!("district unchanged ({district}), skipping query");
            return Ok(None);
        }

        self.query_district(&district).await.map(Some)
    }

    /// Search-bar submission: recenter on the district and load its lots.
    ///
    /// Empty input is ignored. When the district name cannot be forward
    /// geocoded, nothing changes and no query runs.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] if the forward geocode or directory fetch
    /// fails.
    pub async fn search_district(&self, query: &str) -> Result<Option<BatchOutcome>, AppError> {
        let district = query.trim();
        if district.is_empty() {
            return Ok(None);
        }

        let full_address = address::with_city_prefix(district);
        match self.geocoder.forward(&full_address).await? {
            Some(center) => {
                self.presenter
                    .set_region(Region::with_meters(center, 3000.0, 3000.0));
            }
            None => {
                log::warn!("search address could not be resolved: {full_address}");
                return Ok(None);
            }
        }

        self.query_district(district).await.map(Some)
    }

    /// Fetches one district's lots and reconciles them into the pin set.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] if the directory fetch fails; prior display
    /// state is left untouched in that case.
    pub async fn query_district(&self, district: &str) -> Result<BatchOutcome, AppError> {
        let config = DirectoryConfig {
            base_url: &self.endpoints.directory_base_url,
            api_key: &self.credentials.seoul_api_key,
        };
        let records = fetch_parking_lots(&self.http, &config, district).await?;

        *self.district() = Some(district.to_string());
        Ok(self.reconciler.reconcile(records).await)
    }

    /// Navigate flow: geocode the selected lot, fetch a route from the
    /// current location, and hand it to the presenter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when there is no location fix, the destination
    /// cannot be resolved, or the route fetch fails. The previous display
    /// state stays intact on failure.
    pub async fn navigate_to(&self, record: &ParkingLotRecord) -> Result<RouteSummary, AppError> {
        let origin = self
            .presenter
            .current_location()
            .ok_or(AppError::NoCurrentLocation)?;

        let query = address::with_city_prefix(&address::strip_parenthetical(&record.address));
        let destination = self.geocoder.forward(&query).await?.ok_or_else(|| {
            AppError::DestinationNotFound {
                address: record.address.clone(),
            }
        })?;

        let config = RoutingConfig {
            base_url: &self.endpoints.routing_base_url,
            api_key: &self.credentials.kakao_rest_key,
        };
        let summary = fetch_route(&self.http, &config, origin, destination).await?;

        self.presenter.show_route(origin, destination, &summary);
        Ok(summary)
    }
}

/// Initializes process-wide logging for embedders.
///
/// Call once from the shell that hosts the app; honors `RUST_LOG`.
pub fn init_logging() {
    pretty_env_logger::init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        App::new(Credentials {
            seoul_api_key: "test-seoul-key".to_string(),
            kakao_rest_key: "test-kakao-key".to_string(),
        })
    }

    #[test]
    fn new_app_has_no_district_and_nothing_committed() {
        let app = test_app();
        assert_eq!(app.current_district(), None);
        assert!(!app.presenter().has_committed());
    }

    #[test]
    fn permission_denial_falls_back_to_city_hall() {
        let app = test_app();
        app.location_permission_denied();
        assert_eq!(
            app.presenter().current_location(),
            Some(Coordinate::CITY_HALL)
        );
    }
}
