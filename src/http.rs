//! HTTP front end: `/health` and `/viewing-data`.

use axum::{
    extract::{Query, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::{AstroError, AstroResult};
use crate::night::ViewingPlanner;
use crate::request::{RequestDefaults, ViewingDataQuery};

/// Shared state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub planner: ViewingPlanner,
    pub defaults: RequestDefaults,
}

/// API error response body
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl ApiError {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            example: None,
        }
    }
}

impl IntoResponse for AstroError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AstroError::InvalidParameter { field, message } if field == "parameters" => {
                let mut body = ApiError::new("Invalid parameters", message.clone());
                body.example =
                    Some("/viewing-data?latitude=47.6062&longitude=-122.3321&elevation=50".to_string());
                (StatusCode::BAD_REQUEST, body)
            }
            AstroError::InvalidParameter { field, message } => (
                StatusCode::BAD_REQUEST,
                ApiError::new(format!("Invalid {}", field), message.clone()),
            ),
            AstroError::Configuration(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("Configuration error", message.clone()),
            ),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("Internal server error", other.to_string()),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", any(health_check))
        .route("/viewing-data", get(viewing_data).fallback(not_found))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Reads either `key=value` pairs or a single JSON-encoded object key
fn parse_query(uri: &Uri) -> AstroResult<ViewingDataQuery> {
    if let Some(key) = uri.query().and_then(ViewingDataQuery::json_encoded_key) {
        return ViewingDataQuery::from_json_key(key);
    }
    Query::<ViewingDataQuery>::try_from_uri(uri)
        .map(|Query(query)| query)
        .map_err(|rejection| AstroError::invalid("parameters", rejection.body_text()))
}

async fn viewing_data(State(state): State<AppState>, uri: Uri) -> Result<Response, AstroError> {
    let request = parse_query(&uri)
        .and_then(|query| query.into_request(&state.defaults))
        .map_err(|e| {
            tracing::warn!("Rejected request: {}", e);
            e
        })?;

    let report = state.planner.get_viewing_data(&request).await;
    let body = serde_json::to_string_pretty(&report)
        .map_err(|e| AstroError::UpstreamData(format!("failed to serialize report: {}", e)))?;

    Ok(([(axum::http::header::CONTENT_TYPE, "application/json")], body).into_response())
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(
            "Not found",
            "Available endpoints: /viewing-data, /health",
        )),
    )
}
