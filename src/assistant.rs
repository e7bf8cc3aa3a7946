use std::sync::Arc;

use reqwest::Client;

use crate::config::Config;
use crate::constants::{AI_TIMEOUT, WEATHER_TIMEOUT};
use crate::location::LocationResolver;
use crate::models::WeatherReport;
use crate::ollama::OllamaClient;
use crate::retry::RetryPolicy;
use crate::service::{NwsService, WeatherSource};
use crate::Result;

/// Answers free-text weather questions
#[derive(Clone)]
pub struct Assistant {
    ai: OllamaClient,
    weather: Arc<dyn WeatherSource>,
}

impl Assistant {
    pub fn new(ai: OllamaClient, weather: Arc<dyn WeatherSource>) -> Self {
        Self { ai, weather }
    }

    /// Wires the NWS, Nominatim and Ollama clients from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let weather_client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(WEATHER_TIMEOUT)
            .build()
            .map_err(|e| crate::Error::http("building weather client", e))?;

        let ai_client = Client::builder()
            .timeout(AI_TIMEOUT)
            .build()
            .map_err(|e| crate::Error::http("building ollama client", e))?;

        let resolver = LocationResolver::new(weather_client.clone(), &config.geocoder_url);
        let nws = NwsService::new(weather_client, &config.nws_url, resolver);
        let ai = OllamaClient::new(
            ai_client,
            &config.ollama_url,
            &config.ollama_model,
            RetryPolicy::new(config.max_retries),
        );

        Ok(Self::new(ai, Arc::new(nws)))
    }

    /// Runs the whole pipeline for `query`
    pub async fn ask(&self, query: &str) -> Result<WeatherReport> {
        tracing::info!("Handling query: {}", query);

        let location = self.ai.extract_location(query).await?;
        self.report_for(&location).await
    }

    /// Fetches weather for an already-extracted location and describes it
    pub async fn report_for(&self, location: &str) -> Result<WeatherReport> {
        let weather = self.weather.fetch(location).await?;
        let description = self.ai.describe(location, &weather).await?;

        Ok(WeatherReport {
            weather,
            description,
        })
    }
}
