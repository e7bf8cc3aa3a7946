use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Pipeline Models
// ============================================================================

/// A point in decimal degrees, as returned by the geocoder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Axis-aligned latitude/longitude rectangle, inclusive on every edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRegion {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingRegion {
    pub fn contains(&self, coord: GeoCoordinate) -> bool {
        coord.latitude >= self.min_lat
            && coord.latitude <= self.max_lat
            && coord.longitude >= self.min_lon
            && coord.longitude <= self.max_lon
    }
}

/// NWS forecast grid cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPoint {
    pub grid_id: String,
    pub grid_x: i32,
    pub grid_y: i32,
}

/// Normalized weather snapshot.
///
/// Optional numeric fields are zero when upstream omits them; zero and
/// "not reported" cannot be told apart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Air temperature in °F
    pub temperature: f64,
    /// Heat index or wind chill in °F
    pub feels_like: f64,
    pub conditions: String,
    /// Relative humidity, truncated to a whole percent
    pub humidity: i32,
    pub wind_speed: f64,
    pub wind_speed_unit: String,
    pub wind_direction: String,
    pub wind_gust: f64,
    /// Miles
    pub visibility: f64,
    /// Millibars
    pub pressure: f64,
    /// °F
    pub dew_point: f64,
    pub uv_index: f64,
    pub cloud_cover: i32,
    pub precipitation_chance: i32,
    pub quality_control: String,
    pub timestamp: String,
}

/// Observation plus the model's description of it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub weather: Observation,
    pub description: String,
}

// ============================================================================
// Nominatim Geocoder Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

// ============================================================================
// National Weather Service API Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PointsResponse {
    pub properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
pub struct PointsProperties {
    #[serde(rename = "gridId")]
    pub grid_id: String,
    #[serde(rename = "gridX")]
    pub grid_x: i32,
    #[serde(rename = "gridY")]
    pub grid_y: i32,
}

#[derive(Debug, Deserialize)]
pub struct StationsResponse {
    pub features: Vec<StationFeature>,
}

#[derive(Debug, Deserialize)]
pub struct StationFeature {
    pub properties: StationProperties,
}

#[derive(Debug, Deserialize)]
pub struct StationProperties {
    #[serde(rename = "stationIdentifier")]
    pub station_identifier: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ObservationResponse {
    pub properties: ObservationProperties,
}

#[derive(Debug, Default, Deserialize)]
pub struct ObservationProperties {
    #[serde(default)]
    pub temperature: Measurement,
    #[serde(default, rename = "relativeHumidity")]
    pub relative_humidity: Measurement,
    #[serde(default, rename = "windSpeed")]
    pub wind_speed: Measurement,
    #[serde(default, rename = "windDirection")]
    pub wind_direction: Measurement,
    #[serde(default, rename = "windGust")]
    pub wind_gust: Measurement,
    #[serde(default)]
    pub visibility: Measurement,
    #[serde(default, rename = "barometricPressure")]
    pub barometric_pressure: Measurement,
    #[serde(default)]
    pub dewpoint: Measurement,
    #[serde(default, rename = "heatIndex")]
    pub heat_index: Measurement,
    #[serde(default, rename = "windChill")]
    pub wind_chill: Measurement,
    #[serde(default, rename = "textDescription")]
    pub text_description: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A single NWS quantitative value; `value` is `null` when the sensor did not report
#[derive(Debug, Default, Deserialize)]
pub struct Measurement {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default, rename = "unitCode")]
    pub unit_code: Option<String>,
    #[serde(default, rename = "qualityControl")]
    pub quality_control: Option<String>,
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetWeatherRequest {
    /// Free-text question, e.g. "What's the weather in Miami?"
    pub query: String,
}
