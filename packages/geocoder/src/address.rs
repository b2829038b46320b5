//! Address cleaning for the Seoul parking directory.
//!
//! Directory addresses come in forms that trip up geocoders:
//! - Parenthetical notes: `"중구 세종대로 110(시청)"`
//! - District-led addresses missing the city: `"종로구 세종로 80-1"`
//!
//! This module strips the noise and builds geocodable full addresses, and
//! extracts the administrative district (구) from forward addresses or
//! reverse-geocoded place descriptions.

use regex::Regex;
use std::sync::LazyLock;

/// City name prepended to district-led addresses.
pub const CITY_PREFIX: &str = "서울특별시";

/// Regex for a run of Hangul syllables ending in the district suffix 구.
static DISTRICT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[가-힣]+구").expect("valid regex"));

/// Extracts the first district name (e.g., `"강남구"`) from an address or
/// place description. Returns `None` when no district-suffixed token is
/// present.
#[must_use]
pub fn district_from_address(address: &str) -> Option<String> {
    DISTRICT_RE.find(address).map(|m| m.as_str().to_string())
}

/// Returns the address up to the first opening parenthesis, trimmed.
///
/// The directory API embeds free-text notes in parentheses that break
/// geocoding; everything from the first `(` on is dropped. Input without a
/// parenthesis is returned trimmed but otherwise unchanged.
#[must_use]
pub fn strip_parenthetical(address: &str) -> String {
    match address.find('(') {
        Some(idx) => address[..idx].trim().to_string(),
        None => address.trim().to_string(),
    }
}

/// Prepends the city name to a district name or district-led address,
/// producing a full geocodable address.
#[must_use]
pub fn with_city_prefix(address: &str) -> String {
    format!("{CITY_PREFIX} {}", address.trim())
}
