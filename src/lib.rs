//! Weather assistant: answers free-text questions about current US weather.
//!
//! A query goes through Ollama to extract a place name, Nominatim to geocode
//! it, the National Weather Service to find the nearest station's latest
//! observation, and Ollama again to describe that observation.

pub mod assistant;
pub mod config;
pub mod constants;
pub mod error;
pub mod formatters;
pub mod http;
pub mod location;
pub mod mcp;
pub mod models;
pub mod ollama;
pub mod rate_limit;
pub mod retry;
pub mod service;

pub use assistant::Assistant;
pub use config::Config;
pub use error::Error;
pub use location::{is_us_location, LocationResolver};
pub use models::{GeoCoordinate, GridPoint, Observation, WeatherReport};
pub use ollama::OllamaClient;
pub use rate_limit::RateLimiter;
pub use retry::RetryPolicy;
pub use service::{NwsService, WeatherSource};

pub type Result<T> = std::result::Result<T, Error>;
