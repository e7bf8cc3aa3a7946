use thiserror::Error;

use crate::constants::MAX_ERROR_BODY;

/// Everything that can go wrong between a free-text query and a weather report.
#[derive(Error, Debug)]
pub enum Error {
    /// Geocoder or station lookup had no match
    #[error("{0}")]
    NotFound(String),

    /// Coordinate resolved fine but lies outside US coverage
    #[error(
        "location '{query}' is outside US coverage area.\n\
         This API only supports US locations like:\n\
         - San Francisco, CA\n\
         - New York, NY\n\
         - Miami, FL\n\
         - Chicago, IL"
    )]
    OutOfCoverage { query: String },

    /// Geocoder returned coordinates that are not numbers
    #[error("geocoder returned unparsable coordinates for '{query}': lat={lat:?}, lon={lon:?}")]
    InvalidCoordinates {
        query: String,
        lat: String,
        lon: String,
    },

    /// Non-200 or undecodable response from the geocoder or NWS
    #[error("{context}: unexpected status: {status}, body: {body}")]
    Upstream {
        context: String,
        status: u16,
        body: String,
    },

    /// Transport failure talking to the geocoder or NWS
    #[error("{context}: {source}")]
    Http {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// Chat backend unreachable after the last attempt
    #[error("failed to connect to ollama server (is it running?): {source}")]
    Connection {
        #[source]
        source: reqwest::Error,
    },

    /// Chat backend answered with a non-200 status
    #[error("ollama server error (status {status}): {body}")]
    Server { status: u16, body: String },

    /// Chat response could not be decoded on the last attempt
    #[error("decoding ollama response: {0}")]
    Decode(String),

    /// Observation could not be serialized for the description prompt
    #[error("encoding weather data: {0}")]
    Encode(String),

    /// Chat turn completed with no content on the last attempt
    #[error("empty response from model")]
    EmptyResponse,

    /// Every attempt ended in an incomplete turn
    #[error("max retries reached - please ensure ollama is running and the model is installed")]
    RetriesExhausted,

    /// The model ran but found no place in the query
    #[error("no location found in query")]
    NoLocationFound,

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    #[error("unauthorized")]
    Unauthorized,

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn upstream(context: impl Into<String>, status: u16, body: &str) -> Self {
        Self::Upstream {
            context: context.into(),
            status,
            body: truncate(body, MAX_ERROR_BODY).to_string(),
        }
    }

    pub(crate) fn http(context: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            context: context.into(),
            source,
        }
    }

    /// Wrap an error with the stage that produced it, keeping the variant.
    pub(crate) fn context(self, ctx: &str) -> Self {
        match self {
            Self::Upstream {
                context,
                status,
                body,
            } => Self::Upstream {
                context: format!("{ctx}: {context}"),
                status,
                body,
            },
            Self::Http { context, source } => Self::Http {
                context: format!("{ctx}: {context}"),
                source,
            },
            Self::NotFound(message) => Self::NotFound(format!("{ctx}: {message}")),
            other => other,
        }
    }

    /// HTTP status code the network surface answers with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::OutOfCoverage { .. } | Self::NoLocationFound => 422,
            Self::InvalidCoordinates { .. } | Self::Upstream { .. } | Self::Http { .. } => 502,
            Self::Connection { .. }
            | Self::Server { .. }
            | Self::Decode(_)
            | Self::EmptyResponse
            | Self::RetriesExhausted => 503,
            Self::RateLimitExceeded => 429,
            Self::Unauthorized => 401,
            Self::Encode(_) | Self::Config(_) => 500,
        }
    }

    /// True for failures caused by what the user asked rather than a broken upstream.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::OutOfCoverage { .. } | Self::NoLocationFound
        )
    }
}

/// Cut `s` to at most `max` bytes on a char boundary.
pub(crate) fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
