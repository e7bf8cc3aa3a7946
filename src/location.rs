use reqwest::Client;

use crate::constants::US_REGIONS;
use crate::error::Error;
use crate::models::{GeoCoordinate, GeocodeResult};
use crate::Result;

/// Geocodes place names through Nominatim and rejects anything NWS cannot serve
#[derive(Clone)]
pub struct LocationResolver {
    client: Client,
    base_url: String,
}

impl LocationResolver {
    /// `client` must already carry the User-Agent Nominatim's usage policy requires.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Geocodes `location` and checks it lies inside a US region.
    pub async fn resolve(&self, location: &str) -> Result<GeoCoordinate> {
        let geo = self
            .geocode(location)
            .await
            .map_err(|e| e.context("geocoding location"))?;

        let coord = parse_coordinate(location, &geo)?;
        if !is_us_location(coord) {
            return Err(Error::OutOfCoverage {
                query: location.to_string(),
            });
        }

        tracing::debug!(
            "Resolved '{}' to {} at {:.4}, {:.4}",
            location,
            geo.display_name.as_deref().unwrap_or("unnamed place"),
            coord.latitude,
            coord.longitude
        );
        Ok(coord)
    }

    async fn geocode(&self, location: &str) -> Result<GeocodeResult> {
        let url = format!("{}/search", self.base_url);
        tracing::debug!("Geocoding '{}' via {}", location, url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", location), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| Error::http("geocoding request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(
                "geocoding service returned an error",
                status.as_u16(),
                &body,
            ));
        }

        let results: Vec<GeocodeResult> = response
            .json()
            .await
            .map_err(|e| Error::http("decoding geocode response", e))?;

        results
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("location not found: {location}")))
    }
}

fn parse_coordinate(query: &str, geo: &GeocodeResult) -> Result<GeoCoordinate> {
    match (geo.lat.trim().parse::<f64>(), geo.lon.trim().parse::<f64>()) {
        (Ok(latitude), Ok(longitude)) => Ok(GeoCoordinate {
            latitude,
            longitude,
        }),
        _ => Err(Error::InvalidCoordinates {
            query: query.to_string(),
            lat: geo.lat.clone(),
            lon: geo.lon.clone(),
        }),
    }
}

/// Continental US, Alaska or Hawaii, inclusive on every edge
pub fn is_us_location(coord: GeoCoordinate) -> bool {
    US_REGIONS.iter().any(|region| region.contains(coord))
}
