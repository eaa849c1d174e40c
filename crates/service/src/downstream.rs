use opentelemetry::Context;
use reqwest::Client;
use serde_json::Value;

use crate::error::RequestError;
use crate::propagation::inject_context;

/// GETs `url` with the caller's trace context attached and decodes the JSON
/// body. Connection failures, non-2xx statuses and undecodable bodies all
/// come back as [`RequestError::DownstreamUnavailable`].
///
/// No timeout is applied: a peer that never answers stalls the caller.
pub async fn fetch_json(client: &Client, url: &str, cx: &Context) -> Result<Value, RequestError> {
    let response = client
        .get(url)
        .headers(inject_context(cx))
        .send()
        .await?
        .error_for_status()?;
    Ok(response.json::<Value>().await?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn decodes_peer_body() {
        let stub = testkit::StubServer::json(200, json!({"theme": "dark"})).await;
        let body = fetch_json(&Client::new(), &stub.url("/api/settings"), &Context::new())
            .await
            .unwrap();
        assert_eq!(body, json!({"theme": "dark"}));
        assert_eq!(stub.hits(), 1);
    }

    #[tokio::test]
    async fn non_success_status_is_unavailable() {
        let stub = testkit::StubServer::json(500, json!({"error": "Database error"})).await;
        let err = fetch_json(&Client::new(), &stub.url("/api/settings"), &Context::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::DownstreamUnavailable(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn refused_connection_is_unavailable() {
        let port = testkit::free_port();
        let err = fetch_json(
            &Client::new(),
            &format!("http://127.0.0.1:{port}/api/profiles"),
            &Context::new(),
        )
        .await
        .unwrap_err();
        let RequestError::DownstreamUnavailable(message) = err else {
            panic!("expected unavailable, got {err:?}");
        };
        assert!(
            message.to_lowercase().contains("connection refused"),
            "cause missing from {message:?}"
        );
    }
}
