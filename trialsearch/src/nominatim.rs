//! Nominatim geocoding backend.
//!
//! Resolves free-text locations against the OpenStreetMap
//! [Nominatim](https://nominatim.org/release-docs/latest/api/Search/) search
//! API. This module is only available when the `nominatim` feature is
//! enabled.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, SearchError};
use crate::geo::{GeoPoint, Geocoder};

/// The Nominatim search endpoint.
const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Identifies this client to the service, which rejects anonymous requests.
const USER_AGENT: &str = concat!("trialsearch/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// A [`Geocoder`] backed by the public Nominatim API.
///
/// Requests the single best match for the location text; an empty result
/// list is reported as not-found, which the pipeline treats as "skip the
/// distance filter".
pub struct NominatimGeocoder {
    client: reqwest::Client,
}

impl NominatimGeocoder {
    /// Create a new geocoder.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::GeocodeError`] if the HTTP client cannot be
    /// constructed.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build().map_err(|e| {
            SearchError::GeocodeError {
                provider: "Nominatim".into(),
                message: format!("failed to build HTTP client: {e}"),
            }
        })?;
        Ok(Self { client })
    }

    fn map_err(e: impl std::fmt::Display) -> SearchError {
        SearchError::GeocodeError { provider: "Nominatim".into(), message: e.to_string() }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, location: &str) -> Result<Option<GeoPoint>> {
        debug!(provider = "Nominatim", location, "geocoding location");

        let response = self
            .client
            .get(NOMINATIM_SEARCH_URL)
            .query(&[("q", location), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(Self::map_err)?;

        if !response.status().is_success() {
            return Err(Self::map_err(format!("API returned {}", response.status())));
        }

        let places: Vec<Place> = response.json().await.map_err(Self::map_err)?;
        let Some(place) = places.into_iter().next() else {
            debug!(provider = "Nominatim", location, "location not found");
            return Ok(None);
        };

        let lat = place.lat.parse::<f64>().map_err(Self::map_err)?;
        let lon = place.lon.parse::<f64>().map_err(Self::map_err)?;
        Ok(Some(GeoPoint { lat, lon }))
    }
}
