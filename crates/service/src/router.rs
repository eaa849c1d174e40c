use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::get;
use opentelemetry_sdk::trace::Tracer;
use reqwest::Client;
use tierchain_core::config::Config;
use tierchain_core::ids::Correlation;
use tierchain_core::model::health::Health;
use tierchain_core::outcome::OutcomeSource;
use tierchain_core::time::now_timestamp;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::endpoint::{PROFILES, SETTINGS, USERS};
use crate::handler::handle;
use crate::log::RequestLog;

/// Immutable per-process state shared by every request.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    service: Arc<str>,
    tracer: Tracer,
    outcomes: Arc<dyn OutcomeSource>,
    client: Client,
}

impl AppState {
    pub fn new(config: Config, tracer: Tracer, outcomes: Arc<dyn OutcomeSource>) -> Self {
        let service = Arc::from(config.service_name.as_str());
        Self {
            config: Arc::new(config),
            service,
            tracer,
            outcomes,
            client: Client::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    pub fn outcomes(&self) -> &dyn OutcomeSource {
        self.outcomes.as_ref()
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn request_log(&self, correlation: Correlation) -> RequestLog {
        RequestLog::new(self.service.clone(), correlation)
    }
}

/// All three chain endpoints plus `/health`, whatever role this process
/// plays.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(USERS.route, get(get_users))
        .route(PROFILES.route, get(get_profiles))
        .route(SETTINGS.route, get(get_settings))
        .route("/health", get(health))
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .with_state(state)
}

async fn get_users(State(state): State<AppState>, headers: HeaderMap) -> Response {
    handle(&state, &USERS, &headers).await
}

async fn get_profiles(State(state): State<AppState>, headers: HeaderMap) -> Response {
    handle(&state, &PROFILES, &headers).await
}

async fn get_settings(State(state): State<AppState>, headers: HeaderMap) -> Response {
    handle(&state, &SETTINGS, &headers).await
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health::healthy(&*state.service, now_timestamp()))
}
