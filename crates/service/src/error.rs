use axum::http::StatusCode;
use thiserror::Error;

/// Ways a handler can end without a 200.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("simulated client error")]
    SimulatedClient,

    #[error("simulated server error")]
    SimulatedServer,

    #[error("{0}")]
    DownstreamUnavailable(String),
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::SimulatedClient => StatusCode::BAD_REQUEST,
            Self::SimulatedServer => StatusCode::INTERNAL_SERVER_ERROR,
            Self::DownstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        Self::DownstreamUnavailable(error_chain(&err))
    }
}

/// `err` followed by each of its sources, `: `-separated. reqwest's own
/// message names only the URL; the cause sits further down the chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
