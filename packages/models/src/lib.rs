#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared domain types for the sparking parking map.
//!
//! Every other crate in the workspace builds on these: coordinates and map
//! regions, the normalized parking-lot record produced by the directory
//! client, resolved map pins, and decoded route summaries.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Meters per degree of latitude (WGS84, good enough for map spans).
const METERS_PER_DEGREE: f64 = 111_320.0;

/// A WGS84 coordinate in floating-point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Seoul City Hall — the fallback position when no device location is
    /// available (e.g., location permission denied).
    pub const CITY_HALL: Self = Self {
        latitude: 37.5665,
        longitude: 126.9780,
    };

    /// Creates a coordinate from latitude and longitude degrees.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A map viewport: a center plus latitude/longitude spans in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Center of the viewport.
    pub center: Coordinate,
    /// North-south span in degrees.
    pub latitude_delta: f64,
    /// East-west span in degrees.
    pub longitude_delta: f64,
}

impl Region {
    /// Default span used when centering on the user's location.
    pub const DEFAULT_SPAN: f64 = 0.01;

    /// Creates a region around `center` with the default span.
    #[must_use]
    pub const fn around(center: Coordinate) -> Self {
        Self {
            center,
            latitude_delta: Self::DEFAULT_SPAN,
            longitude_delta: Self::DEFAULT_SPAN,
        }
    }

    /// Creates a region around `center` spanning the given number of meters
    /// in each direction. Longitude is cosine-corrected for the center's
    /// latitude.
    #[must_use]
    pub fn with_meters(center: Coordinate, lat_meters: f64, lon_meters: f64) -> Self {
        let latitude_delta = lat_meters / METERS_PER_DEGREE;
        let longitude_delta =
            lon_meters / (METERS_PER_DEGREE * center.latitude.to_radians().cos());
        Self {
            center,
            latitude_delta,
            longitude_delta,
        }
    }
}

/// Whether a parking lot charges a fee.
///
/// The directory API carries this as a display string (`"무료"` / `"유료"`);
/// [`ParkingLotRecord::fee_type`] parses it into this enum.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum FeeType {
    /// No charge.
    #[strum(serialize = "무료")]
    #[serde(rename = "무료")]
    Free,
    /// Paid parking.
    #[strum(serialize = "유료")]
    #[serde(rename = "유료")]
    Paid,
}

/// A parking lot as returned by the municipal directory, normalized from
/// the wire format. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingLotRecord {
    /// Lot name.
    pub name: String,
    /// Raw address. May embed parenthetical notes that break geocoding;
    /// strip them before submitting to a geocoder.
    pub address: String,
    /// Fee classification display string, carried verbatim from the API.
    pub fee_display: String,
    /// Base charge in won.
    pub base_charge: f64,
    /// Total capacity.
    pub capacity: u32,
    /// Currently occupied count. May exceed `capacity` when the upstream
    /// data is stale.
    pub occupied: u32,
}

impl ParkingLotRecord {
    /// Number of free spots, clamped at zero when the occupied count
    /// exceeds capacity.
    #[must_use]
    pub const fn available_spots(&self) -> u32 {
        self.capacity.saturating_sub(self.occupied)
    }

    /// Parses the fee display string into a [`FeeType`], if recognized.
    #[must_use]
    pub fn fee_type(&self) -> Option<FeeType> {
        self.fee_display.parse().ok()
    }
}

/// A resolved map marker. Created only after a successful geocode; one pin
/// maps to at most one source record.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPin {
    /// Resolved coordinate.
    pub coordinate: Coordinate,
    /// Marker title.
    pub title: String,
    /// Marker subtitle (fee, base charge, availability).
    pub subtitle: String,
    /// The originating directory record, if any.
    pub record: Option<ParkingLotRecord>,
}

impl GeocodedPin {
    /// Builds the callout pin for a parking lot at its geocoded coordinate.
    #[must_use]
    pub fn for_lot(record: &ParkingLotRecord, coordinate: Coordinate) -> Self {
        let subtitle = format!(
            "{} • 기본요금 {:.0}원 • 가능 차량 {}대",
            record.fee_display,
            record.base_charge,
            record.available_spots()
        );
        Self {
            coordinate,
            title: record.name.clone(),
            subtitle,
            record: Some(record.clone()),
        }
    }
}

/// The kinds of pin the presenter can hold, as an explicit tagged type.
#[derive(Debug, Clone, PartialEq)]
pub enum Pin {
    /// The single "current location" pin. Replaced, never accumulated.
    CurrentLocation(Coordinate),
    /// A parking lot pin from a committed reconciliation batch.
    Parking(GeocodedPin),
    /// A start/end marker of the active route overlay.
    RouteEndpoint {
        /// Marker position.
        coordinate: Coordinate,
        /// Marker label (e.g., `"현재 위치"`, `"도착지"`).
        label: String,
    },
}

impl Pin {
    /// Returns the pin's position regardless of kind.
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        match self {
            Self::CurrentLocation(coordinate)
            | Self::RouteEndpoint { coordinate, .. } => *coordinate,
            Self::Parking(pin) => pin.coordinate,
        }
    }
}

/// A decoded driving route: total duration plus per-road polylines.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    /// Total expected duration in seconds.
    pub duration_secs: u64,
    /// One polyline per road segment, in travel order.
    pub roads: Vec<Vec<Coordinate>>,
}

impl RouteSummary {
    /// Duration rounded down to whole minutes, as shown to the user.
    #[must_use]
    pub const fn duration_minutes(&self) -> u64 {
        self.duration_secs / 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(capacity: u32, occupied: u32) -> ParkingLotRecord {
        ParkingLotRecord {
            name: "세종로 공영주차장".to_string(),
            address: "종로구 세종로 80-1".to_string(),
            fee_display: "유료".to_string(),
            base_charge: 430.0,
            capacity,
            occupied,
        }
    }

    #[test]
    fn available_spots_subtracts_occupied() {
        assert_eq!(record(100, 37).available_spots(), 63);
    }

    #[test]
    fn available_spots_clamps_stale_occupancy() {
        assert_eq!(record(50, 80).available_spots(), 0);
    }

    #[test]
    fn parses_fee_display() {
        assert_eq!(record(1, 0).fee_type(), Some(FeeType::Paid));
        let mut free = record(1, 0);
        free.fee_display = "무료".to_string();
        assert_eq!(free.fee_type(), Some(FeeType::Free));
        free.fee_display = "요금정보없음".to_string();
        assert_eq!(free.fee_type(), None);
    }

    #[test]
    fn fee_type_displays_korean() {
        assert_eq!(FeeType::Free.to_string(), "무료");
        assert_eq!(FeeType::Paid.to_string(), "유료");
    }

    #[test]
    fn pin_subtitle_includes_charge_and_availability() {
        let pin = GeocodedPin::for_lot(&record(100, 37), Coordinate::new(37.57, 126.98));
        assert_eq!(pin.title, "세종로 공영주차장");
        assert_eq!(pin.subtitle, "유료 • 기본요금 430원 • 가능 차량 63대");
        assert!(pin.record.is_some());
    }

    #[test]
    fn region_meters_conversion_is_cosine_corrected() {
        let region = Region::with_meters(Coordinate::CITY_HALL, 3000.0, 3000.0);
        assert!((region.latitude_delta - 0.026_949).abs() < 1e-4);
        // At ~37.5°N a longitude degree is shorter, so the delta is larger.
        assert!(region.longitude_delta > region.latitude_delta);
    }

    #[test]
    fn duration_rounds_down_to_minutes() {
        let summary = RouteSummary {
            duration_secs: 1399,
            roads: vec![],
        };
        assert_eq!(summary.duration_minutes(), 23);
    }
}
