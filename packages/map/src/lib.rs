#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map presentation state.
//!
//! [`MapPresenter`] owns everything the map screen displays: the visible
//! region, the single current-location pin, the committed parking pin set,
//! and at most one route overlay. It is purely reactive — the clients and
//! the reconciler produce data, the presenter holds the latest consistent
//! snapshot of it. Rendering is someone else's job.
//!
//! All state lives behind one mutex because commits arrive from the
//! reconciler's task while flows on other tasks read and recenter.

use std::sync::{Mutex, MutexGuard, PoisonError};

use sparking_models::{Coordinate, GeocodedPin, Pin, Region, RouteSummary};
use sparking_reconciler::PinSink;

/// The active route drawn on the map: endpoint pins, one polyline per
/// road, and the user-facing ETA text.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOverlay {
    /// Start marker (현재 위치).
    pub origin: Pin,
    /// End marker (도착지).
    pub destination: Pin,
    /// Per-road polylines, in travel order.
    pub polylines: Vec<Vec<Coordinate>>,
    /// ETA label, e.g. `"예상 소요 시간: 약 31분"`.
    pub eta_text: String,
}

#[derive(Debug)]
struct State {
    region: Region,
    current_location: Option<Coordinate>,
    parking_pins: Vec<GeocodedPin>,
    committed_generation: Option<u64>,
    route: Option<RouteOverlay>,
}

/// Holds the map screen's displayed state.
#[derive(Debug)]
pub struct MapPresenter {
    state: Mutex<State>,
}

impl MapPresenter {
    /// Creates a presenter centered on City Hall with nothing displayed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                region: Region::around(Coordinate::CITY_HALL),
                current_location: None,
                parking_pins: Vec::new(),
                committed_generation: None,
                route: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the current-location pin and recenters the region on it.
    /// There is only ever one such pin.
    pub fn update_current_location(&self, coordinate: Coordinate) {
        let mut state = self.state();
        state.current_location = Some(coordinate);
        state.region = Region::around(coordinate);
    }

    /// The last known current location, if any.
    pub fn current_location(&self) -> Option<Coordinate> {
        self.state().current_location
    }

    /// The visible region.
    pub fn region(&self) -> Region {
        self.state().region
    }

    /// Recenters the region without touching any pins.
    pub fn set_region(&self, region: Region) {
        self.state().region = region;
    }

    /// Snapshot of the committed parking pins.
    pub fn parking_pins(&self) -> Vec<GeocodedPin> {
        self.state().parking_pins.clone()
    }

    /// Whether any batch has ever committed. A committed empty set (a
    /// district with no geocodable lots) returns `true`, unlike the
    /// never-queried initial state.
    pub fn has_committed(&self) -> bool {
        self.state().committed_generation.is_some()
    }

    /// Generation of the last committed batch.
    pub fn committed_generation(&self) -> Option<u64> {
        self.state().committed_generation
    }

    /// Installs a route overlay, clearing any previous one first. Only one
    /// route is shown at a time.
    pub fn show_route(&self, origin: Coordinate, destination: Coordinate, summary: &RouteSummary) {
        let overlay = RouteOverlay {
            origin: Pin::RouteEndpoint {
                coordinate: origin,
                label: "현재 위치".to_string(),
            },
            destination: Pin::RouteEndpoint {
                coordinate: destination,
                label: "도착지".to_string(),
            },
            polylines: summary.roads.clone(),
            eta_text: format!("예상 소요 시간: 약 {}분", summary.duration_minutes()),
        };

        let mut state = self.state();
        state.route = Some(overlay);
        state.region = Region::with_meters(origin, 1000.0, 1000.0);
    }

    /// Removes the route overlay, if present.
    pub fn clear_route(&self) {
        self.state().route = None;
    }

    /// Snapshot of the active route overlay.
    pub fn route(&self) -> Option<RouteOverlay> {
        self.state().route.clone()
    }

    /// Everything currently pinned on the map, as tagged pins.
    pub fn pins(&self) -> Vec<Pin> {
        let state = self.state();
        let mut pins = Vec::with_capacity(state.parking_pins.len() + 3);
        if let Some(coordinate) = state.current_location {
            pins.push(Pin::CurrentLocation(coordinate));
        }
        pins.extend(state.parking_pins.iter().cloned().map(Pin::Parking));
        if let Some(route) = &state.route {
            pins.push(route.origin.clone());
            pins.push(route.destination.clone());
        }
        pins
    }
}

impl Default for MapPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl PinSink for MapPresenter {
    /// Swaps the whole parking pin set. Generations only move forward: a
    /// commit at or below the last committed generation is a stale batch
    /// racing the one that superseded it, and is dropped.
    fn commit_pins(&self, generation: u64, pins: Vec<GeocodedPin>) {
        let mut state = self.state();
        if state.committed_generation.is_some_and(|g| g >= generation) {
            log::debug!("dropping stale pin commit for batch {generation}");
            return;
        }
        state.committed_generation = Some(generation);
        state.parking_pins = pins;
    }
}
