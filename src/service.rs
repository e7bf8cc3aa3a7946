use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::location::LocationResolver;
use crate::models::{
    GeoCoordinate, GridPoint, Measurement, Observation, ObservationResponse, PointsResponse,
    StationsResponse,
};
use crate::Result;

const METERS_PER_MILE: f64 = 1609.344;

/// Anything that can turn a place name into current conditions
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<Observation>;
}

/// Current conditions from the National Weather Service observation network
#[derive(Clone)]
pub struct NwsService {
    client: Client,
    base_url: String,
    resolver: LocationResolver,
}

impl NwsService {
    /// Creates a new NWS client; `client` must carry a User-Agent, NWS rejects anonymous requests
    pub fn new(client: Client, base_url: impl Into<String>, resolver: LocationResolver) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            resolver,
        }
    }

    /// Maps a coordinate to its forecast grid cell
    pub async fn grid_lookup(&self, coord: GeoCoordinate) -> Result<GridPoint> {
        let url = format!(
            "{}/points/{},{}",
            self.base_url, coord.latitude, coord.longitude
        );
        let points: PointsResponse = self.make_request(&url).await?;

        Ok(GridPoint {
            grid_id: points.properties.grid_id,
            grid_x: points.properties.grid_x,
            grid_y: points.properties.grid_y,
        })
    }

    /// Returns the first station NWS lists for the grid cell
    pub async fn station_lookup(&self, grid: &GridPoint) -> Result<String> {
        let url = format!(
            "{}/gridpoints/{}/{},{}/stations",
            self.base_url, grid.grid_id, grid.grid_x, grid.grid_y
        );
        let stations: StationsResponse = self.make_request(&url).await?;

        let station = stations
            .features
            .into_iter()
            .next()
            .map(|feature| feature.properties)
            .ok_or_else(|| Error::NotFound("no weather stations found".to_string()))?;

        tracing::debug!(
            "Nearest station {} ({})",
            station.station_identifier,
            station.name.as_deref().unwrap_or("unnamed")
        );
        Ok(station.station_identifier)
    }

    /// Fetches and normalizes the station's most recent observation
    pub async fn latest_observation(&self, station_id: &str) -> Result<Observation> {
        let url = format!(
            "{}/stations/{}/observations/latest",
            self.base_url, station_id
        );
        let raw: ObservationResponse = self.make_request(&url).await?;

        Ok(convert_observation(raw))
    }

    /// Makes an HTTP GET request and deserializes the JSON response
    async fn make_request<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/geo+json")
            .send()
            .await
            .map_err(|e| Error::http("making request", e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http("reading response", e))?;

        if status != 200 {
            return Err(Error::upstream("request failed", status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("Failed to decode {}: {}", url, e);
            Error::upstream(format!("decoding response: {e}"), status, &body)
        })
    }
}

#[async_trait]
impl WeatherSource for NwsService {
    async fn fetch(&self, location: &str) -> Result<Observation> {
        tracing::info!("Fetching NWS observation for {}", location);

        let coord = self.resolver.resolve(location).await?;

        let grid = self
            .grid_lookup(coord)
            .await
            .map_err(|e| e.context("getting points data"))?;

        let station = self
            .station_lookup(&grid)
            .await
            .map_err(|e| e.context("finding station"))?;
        tracing::debug!(
            "Using station {} for grid {}/{},{}",
            station,
            grid.grid_id,
            grid.grid_x,
            grid.grid_y
        );

        self.latest_observation(&station)
            .await
            .map_err(|e| e.context(&format!("getting observations for {station}")))
    }
}

/// Normalizes an NWS observation to imperial units
pub fn convert_observation(raw: ObservationResponse) -> Observation {
    let props = raw.properties;

    let feels_like = props
        .heat_index
        .value
        .or(props.wind_chill.value)
        .map(celsius_to_fahrenheit)
        .unwrap_or_default();

    Observation {
        temperature: temperature_f(&props.temperature),
        feels_like,
        conditions: props.text_description.unwrap_or_default(),
        humidity: props.relative_humidity.value.unwrap_or_default().trunc() as i32,
        wind_speed: props.wind_speed.value.unwrap_or_default(),
        wind_speed_unit: props.wind_speed.unit_code.unwrap_or_default(),
        wind_direction: props
            .wind_direction
            .value
            .map(|deg| degrees_to_cardinal(deg).to_string())
            .unwrap_or_default(),
        wind_gust: props.wind_gust.value.unwrap_or_default(),
        visibility: props
            .visibility
            .value
            .map(|m| m / METERS_PER_MILE)
            .unwrap_or_default(),
        pressure: props
            .barometric_pressure
            .value
            .map(|pa| pa / 100.0)
            .unwrap_or_default(),
        dew_point: props
            .dewpoint
            .value
            .map(celsius_to_fahrenheit)
            .unwrap_or_default(),
        uv_index: 0.0,
        cloud_cover: 0,
        precipitation_chance: 0,
        quality_control: props.temperature.quality_control.unwrap_or_default(),
        timestamp: props.timestamp.unwrap_or_default(),
    }
}

fn temperature_f(m: &Measurement) -> f64 {
    let value = m.value.unwrap_or_default();
    match m.unit_code.as_deref() {
        Some(unit) if unit.ends_with("degF") => value,
        _ => celsius_to_fahrenheit(value),
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// 16-point compass name for a bearing in degrees
pub fn degrees_to_cardinal(degrees: f64) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized / 22.5) + 0.5).floor() as usize % POINTS.len();
    POINTS[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ObservationProperties;

    fn measurement(value: f64, unit: &str) -> Measurement {
        Measurement {
            value: Some(value),
            unit_code: Some(unit.to_string()),
            quality_control: Some("V".to_string()),
        }
    }

    #[test]
    fn test_celsius_conversion() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
    }

    #[test]
    fn test_convert_observation_core_fields() {
        let raw = ObservationResponse {
            properties: ObservationProperties {
                temperature: measurement(100.0, "wmoUnit:degC"),
                relative_humidity: measurement(65.9, "wmoUnit:percent"),
                wind_speed: measurement(14.8, "wmoUnit:km_h-1"),
                text_description: Some("Mostly Cloudy".to_string()),
                timestamp: Some("2024-05-01T12:53:00+00:00".to_string()),
                ..Default::default()
            },
        };
        let obs = convert_observation(raw);
        assert_eq!(obs.temperature, 212.0);
        assert_eq!(obs.humidity, 65);
        assert_eq!(obs.wind_speed, 14.8);
        assert_eq!(obs.wind_speed_unit, "wmoUnit:km_h-1");
        assert_eq!(obs.conditions, "Mostly Cloudy");
        assert_eq!(obs.quality_control, "V");
        assert_eq!(obs.timestamp, "2024-05-01T12:53:00+00:00");
    }

    #[test]
    fn test_convert_observation_missing_fields_default_to_zero() {
        let raw = ObservationResponse {
            properties: ObservationProperties {
                temperature: measurement(0.0, "wmoUnit:degC"),
                ..Default::default()
            },
        };
        let obs = convert_observation(raw);
        assert_eq!(obs.temperature, 32.0);
        assert_eq!(obs.feels_like, 0.0);
        assert_eq!(obs.wind_gust, 0.0);
        assert_eq!(obs.visibility, 0.0);
        assert_eq!(obs.humidity, 0);
        assert!(obs.wind_direction.is_empty());
    }

    #[test]
    fn test_convert_observation_supplementary_units() {
        let raw = ObservationResponse {
            properties: ObservationProperties {
                temperature: measurement(30.0, "wmoUnit:degC"),
                heat_index: measurement(35.0, "wmoUnit:degC"),
                wind_chill: measurement(-5.0, "wmoUnit:degC"),
                visibility: measurement(16093.44, "wmoUnit:m"),
                barometric_pressure: measurement(101_320.0, "wmoUnit:Pa"),
                dewpoint: measurement(20.0, "wmoUnit:degC"),
                wind_direction: measurement(225.0, "wmoUnit:degree_(angle)"),
                ..Default::default()
            },
        };
        let obs = convert_observation(raw);
        assert_eq!(obs.feels_like, 95.0);
        assert!((obs.visibility - 10.0).abs() < 1e-9);
        assert!((obs.pressure - 1013.2).abs() < 1e-9);
        assert_eq!(obs.dew_point, 68.0);
        assert_eq!(obs.wind_direction, "SW");
    }

    #[test]
    fn test_degrees_to_cardinal() {
        assert_eq!(degrees_to_cardinal(0.0), "N");
        assert_eq!(degrees_to_cardinal(359.0), "N");
        assert_eq!(degrees_to_cardinal(360.0), "N");
        assert_eq!(degrees_to_cardinal(90.0), "E");
        assert_eq!(degrees_to_cardinal(200.0), "SSW");
        assert_eq!(degrees_to_cardinal(-90.0), "W");
    }
}
