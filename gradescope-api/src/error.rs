use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::transport::GsResponse;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Responses are quoted in errors so markup drift can be diagnosed, but only this much of them.
const RESPONSE_EXCERPT_CHARS: usize = 1000;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to log in: {reason}")]
    Auth { reason: String },

    #[error("{context}: {target} responded with status {status}\nresponse: {body}")]
    Request {
        context: &'static str,
        status: StatusCode,
        target: String,
        body: String,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("could not decode {what}")]
    Decode {
        what: String,
        #[source]
        source: BoxError,
    },

    #[error("invalid session state: {0}")]
    InvalidState(&'static str),

    #[error("{0} not supported")]
    Unsupported(&'static str),

    #[error("request to {target} failed")]
    Transport {
        target: String,
        #[source]
        source: BoxError,
    },

    #[error("request to {target} timed out after {timeout:?}")]
    Timeout { target: String, timeout: Duration },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid URL `{url}`")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl Error {
    pub(crate) fn request(context: &'static str, response: &GsResponse) -> Self {
        Self::Request {
            context,
            status: response.status(),
            target: response.url().to_string(),
            body: response.text().chars().take(RESPONSE_EXCERPT_CHARS).collect(),
        }
    }

    pub(crate) fn decode(what: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Decode {
            what: what.into(),
            source: source.into(),
        }
    }

    pub(crate) fn closed() -> Self {
        Self::InvalidState("session has been shut down")
    }
}
