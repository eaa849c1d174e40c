use std::borrow::Cow;

use axum::Json;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tierchain_core::model::payload::ErrorBody;
use tierchain_core::outcome::{Outcome, classify};

use crate::downstream::fetch_json;
use crate::endpoint::{Endpoint, Reply};
use crate::error::RequestError;
use crate::propagation::extract_parent;
use crate::router::AppState;
use crate::span::SpanGuard;

/// Runs one traced request against `endpoint`.
///
/// The span opens before anything else and is owned by a [`SpanGuard`], so
/// it is closed on every way out of this function, including the future
/// being dropped mid-flight. Exactly one response is produced.
pub async fn handle(state: &AppState, endpoint: &Endpoint, headers: &HeaderMap) -> Response {
    let parent = extract_parent(headers);
    let mut span = SpanGuard::start(state.tracer(), endpoint.operation, &parent);
    let log = state.request_log(span.correlation());
    log.info(endpoint.started);

    tokio::time::sleep(state.outcomes().latency()).await;
    let outcome = classify(state.outcomes().roll());
    span.record_request("GET", endpoint.route, outcome.status_code());

    match respond(state, endpoint, outcome, &span).await {
        Ok(reply) => {
            log.info(&reply.summary);
            span.succeed();
            (StatusCode::OK, Json(reply.body)).into_response()
        }
        Err(err) => {
            let failure = describe(endpoint, &err);
            match &err {
                RequestError::SimulatedClient => log.warn(&failure.log),
                RequestError::SimulatedServer | RequestError::DownstreamUnavailable(_) => {
                    log.error(&failure.log)
                }
            }
            span.fail(failure.span_message);
            (err.status(), Json(ErrorBody::new(failure.body))).into_response()
        }
    }
}

async fn respond(
    state: &AppState,
    endpoint: &Endpoint,
    outcome: Outcome,
    span: &SpanGuard,
) -> Result<Reply, RequestError> {
    match outcome {
        Outcome::ServerError => return Err(RequestError::SimulatedServer),
        Outcome::ClientError => return Err(RequestError::SimulatedClient),
        Outcome::Success => {}
    }

    let upstream = match &endpoint.downstream {
        Some(next) => {
            let url = state.config().downstream_url(next.tier, next.path);
            Some(fetch_json(state.client(), &url, &span.context()).await?)
        }
        None => None,
    };
    Ok((endpoint.compose)(upstream))
}

struct Failure {
    log: Cow<'static, str>,
    span_message: Cow<'static, str>,
    body: &'static str,
}

fn describe(endpoint: &Endpoint, err: &RequestError) -> Failure {
    match err {
        RequestError::SimulatedServer => Failure {
            log: Cow::Borrowed(endpoint.server_error.log),
            span_message: Cow::Borrowed(endpoint.server_error.message),
            body: endpoint.server_error.message,
        },
        RequestError::SimulatedClient => Failure {
            log: Cow::Borrowed(endpoint.client_error.log),
            span_message: Cow::Borrowed(endpoint.client_error.message),
            body: endpoint.client_error.message,
        },
        RequestError::DownstreamUnavailable(message) => {
            let (prefix, body) = endpoint
                .downstream
                .map(|next| (next.failure_log, next.unavailable))
                .unwrap_or(("Error calling downstream service", "Service unavailable"));
            Failure {
                log: Cow::Owned(format!("{prefix}: {message}")),
                span_message: Cow::Owned(message.clone()),
                body,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{PROFILES, SETTINGS, USERS};

    #[test]
    fn simulated_failures_use_endpoint_messages() {
        let failure = describe(&PROFILES, &RequestError::SimulatedClient);
        assert_eq!(failure.log, "Invalid profile request");
        assert_eq!(failure.span_message, "Invalid request");
        assert_eq!(failure.body, "Invalid request");

        let failure = describe(&SETTINGS, &RequestError::SimulatedServer);
        assert_eq!(failure.log, "Settings service database error");
        assert_eq!(failure.body, "Database error");
    }

    #[test]
    fn downstream_failure_keeps_transport_message() {
        let err = RequestError::DownstreamUnavailable("connection refused".to_string());
        let failure = describe(&USERS, &err);
        assert_eq!(failure.log, "Error calling profile service: connection refused");
        assert_eq!(failure.span_message, "connection refused");
        assert_eq!(failure.body, "Service unavailable");
    }
}
