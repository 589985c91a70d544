use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crosscart_core::Environment;
use crosscart_scraper::{AnalysisResponse, Analyzer, Fetch, ScrapeError};

use crate::middleware::{request_id, RequestId};

pub struct AppState<F: Fetch> {
    pub analyzer: Arc<Analyzer<F>>,
    pub environment: Environment,
}

impl<F: Fetch> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            analyzer: Arc::clone(&self.analyzer),
            environment: self.environment.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

/// Wire shape of a successful analysis: the pipeline payload plus a
/// server-side timestamp.
#[derive(Debug, Serialize)]
struct AnalyzeOk {
    #[serde(flatten)]
    body: AnalysisResponse,
    analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct AnalyzeFailed {
    success: bool,
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    service: &'static str,
    environment: String,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app<F>(state: AppState<F>) -> Router
where
    F: Fetch + Send + Sync + 'static,
{
    Router::new()
        .route("/api/health", get(health::<F>))
        .route("/api/analyze", post(analyze::<F>))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health<F>(State(state): State<AppState<F>>) -> impl IntoResponse
where
    F: Fetch + Send + Sync + 'static,
{
    Json(HealthData {
        status: "healthy",
        service: "crosscart",
        environment: state.environment.to_string(),
    })
}

async fn analyze<F>(
    State(state): State<AppState<F>>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<AnalyzeRequest>,
) -> Response
where
    F: Fetch + Send + Sync + 'static,
{
    tracing::info!(request_id = %req_id.0, url = %request.url, "analyze request");

    match state.analyzer.analyze(&request.url).await {
        Ok(body) => (
            StatusCode::OK,
            Json(AnalyzeOk {
                body,
                analyzed_at: Utc::now(),
            }),
        )
            .into_response(),
        Err(error) => {
            tracing::warn!(request_id = %req_id.0, error = %error, "analysis failed");
            (
                status_for(&error),
                Json(AnalyzeFailed {
                    success: false,
                    error: error.to_string(),
                }),
            )
                .into_response()
        }
    }
}

fn status_for(error: &ScrapeError) -> StatusCode {
    match error {
        ScrapeError::UnsupportedUrl { .. } | ScrapeError::ExtractionFailed { .. } => {
            StatusCode::BAD_REQUEST
        }
        ScrapeError::NotFound { .. } => StatusCode::NOT_FOUND,
        ScrapeError::Blocked { .. } | ScrapeError::NetworkFailure { .. } | ScrapeError::Http(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}
