use crate::models::BoundingRegion;
use std::time::Duration;

/// User agent string for HTTP requests
pub const USER_AGENT: &str = concat!("weather-assistant/", env!("CARGO_PKG_VERSION"));

/// National Weather Service API base URL
pub const NWS_API_BASE: &str = "https://api.weather.gov";

/// Nominatim (OpenStreetMap) geocoder base URL
pub const GEOCODER_API_BASE: &str = "https://nominatim.openstreetmap.org";

/// Local Ollama chat API base URL
pub const OLLAMA_API_BASE: &str = "http://localhost:11434/api";

/// Default chat model
pub const OLLAMA_MODEL: &str = "phi4";

/// Timeout for geocoder and NWS requests
pub const WEATHER_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for a single chat request
pub const AI_TIMEOUT: Duration = Duration::from_secs(30);

/// Tokens a fresh rate-limiter bucket starts with
pub const RATE_LIMIT_BURST: u32 = 3;

/// Upstream error bodies are cut to this many bytes
pub const MAX_ERROR_BODY: usize = 512;

/// Lower 48 states
pub const CONTINENTAL_US: BoundingRegion = BoundingRegion {
    min_lat: 24.396308,
    max_lat: 49.384358,
    min_lon: -125.0,
    max_lon: -66.934570,
};

pub const ALASKA: BoundingRegion = BoundingRegion {
    min_lat: 51.214183,
    max_lat: 71.365162,
    min_lon: -179.148909,
    max_lon: -130.977806,
};

pub const HAWAII: BoundingRegion = BoundingRegion {
    min_lat: 18.910361,
    max_lat: 22.236428,
    min_lon: -160.236068,
    max_lon: -154.808063,
};

/// Regions served by the NWS observation network
pub const US_REGIONS: [BoundingRegion; 3] = [CONTINENTAL_US, ALASKA, HAWAII];
