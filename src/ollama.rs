use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::Observation;
use crate::retry::{AttemptOutcome, RetryPolicy, RetryState, Step};
use crate::Result;

const EXTRACTION_PROMPT: &str = "You are a location extractor. Extract only the city and \
state/country from the query. Format: \"City, State\" or \"City, Country\". If no location is \
found, say \"no location\".";

const DESCRIPTION_PROMPT: &str = "You are a weather assistant. Provide a natural, concise \
description of the weather conditions. Focus on temperature, conditions, and humidity.";

const NO_LOCATION: &str = "no location";
const SEED: i64 = 42;

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ChatOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling settings; fixed per call site so answers are repeatable
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChatOptions {
    pub temperature: f64,
    pub seed: i64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ChatMessage>,
    #[serde(default)]
    done: bool,
}

/// Client for a local Ollama `/api/chat` endpoint
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl OllamaClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            retry,
        }
    }

    /// Pulls "City, State" out of a free-text question
    pub async fn extract_location(&self, query: &str) -> Result<String> {
        let request = self.chat_request(
            vec![
                ChatMessage::system(EXTRACTION_PROMPT),
                ChatMessage::user(query.trim()),
            ],
            0.1,
        );

        let location = self.chat(&request, self.retry).await?;
        let location = location.trim().trim_matches('"').trim();
        if location.is_empty() || location.eq_ignore_ascii_case(NO_LOCATION) {
            return Err(Error::NoLocationFound);
        }

        tracing::info!("Extracted location: {}", location);
        Ok(location.to_string())
    }

    /// Asks the model to summarize an observation in plain language
    pub async fn describe(&self, location: &str, weather: &Observation) -> Result<String> {
        let weather_json = serde_json::to_string(weather)
            .map_err(|e| Error::Encode(e.to_string()))?;

        let request = self.chat_request(
            vec![
                ChatMessage::system(DESCRIPTION_PROMPT),
                ChatMessage::user(format!(
                    "Describe the weather in {location} based on this data: {weather_json}"
                )),
            ],
            0.7,
        );

        self.chat(&request, self.retry).await
    }

    fn chat_request(&self, messages: Vec<ChatMessage>, temperature: f64) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages,
            stream: false,
            options: Some(ChatOptions {
                temperature,
                seed: SEED,
            }),
        }
    }

    /// Sends `request`, retrying per `policy`, and returns the reply content
    pub async fn chat(&self, request: &ChatRequest, policy: RetryPolicy) -> Result<String> {
        let url = format!("{}/chat", self.base_url);
        let mut state = RetryState::new(policy);

        loop {
            let delay = state.backoff();
            if !delay.is_zero() {
                tracing::warn!(
                    "Retry attempt {} of {}, waiting {:?}",
                    state.attempt(),
                    state.max_retries(),
                    delay
                );
                tokio::time::sleep(delay).await;
            }

            let outcome = self.attempt(&url, request).await;
            match state.classify(outcome) {
                Step::Done(content) => return Ok(content),
                Step::Fail(err) => return Err(err),
                Step::Retry => {
                    if !state.advance() {
                        break;
                    }
                }
            }
        }

        tracing::error!("All {} chat attempts exhausted", policy.max_retries + 1);
        Err(Error::RetriesExhausted)
    }

    async fn attempt(&self, url: &str, request: &ChatRequest) -> AttemptOutcome {
        let response = match self.client.post(url).json(request).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Chat request failed: {}", e);
                return AttemptOutcome::Transport(e);
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return AttemptOutcome::Transport(e),
        };

        if status != 200 {
            return AttemptOutcome::Status { status, body };
        }

        match serde_json::from_str::<ChatResponse>(&body) {
            Err(e) => AttemptOutcome::Undecodable(e.to_string()),
            Ok(reply) if !reply.done => AttemptOutcome::Incomplete,
            Ok(reply) => match reply.message {
                Some(message) if !message.content.trim().is_empty() => {
                    AttemptOutcome::Content(message.content)
                }
                _ => AttemptOutcome::Empty,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OllamaClient {
        OllamaClient::new(
            Client::new(),
            "http://localhost:11434/api/",
            "phi4",
            RetryPolicy::new(3),
        )
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        assert_eq!(client().base_url, "http://localhost:11434/api");
    }

    #[test]
    fn test_chat_request_shape() {
        let request = client().chat_request(vec![ChatMessage::user("hi")], 0.1);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "phi4");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["temperature"], 0.1);
        assert_eq!(json["options"]["seed"], 42);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_options_omitted_when_none() {
        let request = ChatRequest {
            model: "phi4".into(),
            messages: vec![],
            stream: false,
            options: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("options").is_none());
    }
}
