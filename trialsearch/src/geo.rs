//! Geographic types, great-circle distance, and the post-search distance
//! filter.
//!
//! The vector index ranks purely by similarity, so distance filtering runs
//! after the search over the stored `lat_lon` payload field. That field is
//! a string-encoded list: empty for trials with no site coordinates, a
//! single `[lat, lon]` pair, or a list of pairs for multi-site studies.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::trial::SearchHit;

/// Mean Earth radius in miles, for [`haversine_miles`].
pub const EARTH_RADIUS_MILES: f64 = 3956.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

/// Maps a free-text place description to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Geocode a location, returning `Ok(None)` when it cannot be found.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::GeocodeError`](crate::SearchError::GeocodeError)
    /// on transport or decoding failure. Callers treat both a not-found and
    /// an error as "skip distance filtering", never as a request failure.
    async fn geocode(&self, location: &str) -> Result<Option<GeoPoint>>;
}

/// Great-circle distance between two points in miles, via the haversine
/// formula.
pub fn haversine_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

/// Parse a stored `lat_lon` payload value into a list of coordinate pairs.
///
/// Accepts the empty list, a single bare pair, or a list of pairs; returns
/// `None` for anything else so the caller can drop that one candidate
/// without failing the batch.
pub fn parse_lat_lon(raw: &str) -> Option<Vec<GeoPoint>> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let items = value.as_array()?;
    if items.is_empty() {
        return Some(Vec::new());
    }

    // A bare pair of numbers is a single-site trial.
    if items.iter().all(serde_json::Value::is_number) {
        if items.len() != 2 {
            return None;
        }
        return Some(vec![GeoPoint { lat: items[0].as_f64()?, lon: items[1].as_f64()? }]);
    }

    let mut points = Vec::with_capacity(items.len());
    for item in items {
        let pair = item.as_array()?;
        if pair.len() != 2 {
            return None;
        }
        points.push(GeoPoint { lat: pair[0].as_f64()?, lon: pair[1].as_f64()? });
    }
    Some(points)
}

/// Whether a hit has at least one site within `radius_miles` of `center`.
///
/// A hit with a missing, malformed, or empty coordinate field is not within
/// any radius.
pub fn within_radius(hit: &SearchHit, center: GeoPoint, radius_miles: f64) -> bool {
    let Some(raw) = hit.payload.get("lat_lon") else {
        debug!(id = %hit.id, "hit has no coordinates, dropping from distance filter");
        return false;
    };
    let Some(sites) = parse_lat_lon(raw) else {
        debug!(id = %hit.id, raw = %raw, "unparseable coordinates, dropping from distance filter");
        return false;
    };
    sites.iter().any(|site| haversine_miles(*site, center) <= radius_miles)
}

/// Keep only hits with a site within `radius_miles` of `center`, preserving
/// score order.
pub fn filter_by_distance(
    hits: Vec<SearchHit>,
    center: GeoPoint,
    radius_miles: f64,
) -> Vec<SearchHit> {
    hits.into_iter().filter(|hit| within_radius(hit, center, radius_miles)).collect()
}
