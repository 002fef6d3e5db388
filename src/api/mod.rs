use std::sync::Arc;

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    CloseEscapeError, UpstreamErrorKind,
    models::{Location, Suggestion, lenient, SuggestionBatch, SuggestionRequest},
    service::SuggestionService,
};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SuggestionService>,
}

impl AppState {
    pub fn new(service: SuggestionService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiSuggestRequest {
    /// Free-text prompt from the page; logged, the structured prompt is used instead
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub budget: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub distance: f64,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub location: Location,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiSuggestResponse {
    pub suggestions: Vec<Suggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl From<SuggestionBatch> for ApiSuggestResponse {
    fn from(batch: SuggestionBatch) -> Self {
        Self {
            note: batch.note().map(str::to_string),
            suggestions: batch.suggestions,
        }
    }
}

#[derive(Serialize)]
pub struct ApiHealth {
    pub status: &'static str,
    pub version: &'static str,
    pub model_configured: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

impl ApiErrorBody {
    pub fn response(status: StatusCode, error: impl Into<String>) -> Response {
        (
            status,
            Json(Self {
                error: error.into(),
            }),
        )
            .into_response()
    }
}

/// Handler error rendered as `{ "error": ... }` with a classified status
#[derive(Debug)]
pub enum ApiError {
    Service(CloseEscapeError),
    /// The body could not be read or parsed; carries the extractor's status
    Rejected(StatusCode, String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Rejected(status, _) => *status,
            ApiError::Service(CloseEscapeError::Upstream { kind, .. }) => match kind {
                UpstreamErrorKind::Timeout => StatusCode::SERVICE_UNAVAILABLE,
                UpstreamErrorKind::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
                UpstreamErrorKind::InvalidCredentials | UpstreamErrorKind::Other => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CloseEscapeError> for ApiError {
    fn from(err: CloseEscapeError) -> Self {
        ApiError::Service(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            ApiError::Service(err) => err.user_message(),
            ApiError::Rejected(_, message) => message,
        };
        ApiErrorBody::response(status, error)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/gemini", post(suggest))
        .route("/suggestions", post(suggest))
        .route("/health", get(health))
        .with_state(state)
}

async fn suggest(
    State(state): State<AppState>,
    payload: Result<Json<ApiSuggestRequest>, JsonRejection>,
) -> Result<Json<ApiSuggestResponse>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!("Rejected suggestion request body: {}", rejection.body_text());
        ApiError::Rejected(
            rejection.status(),
            format!("Invalid request body: {}", rejection.body_text()),
        )
    })?;

    if let Some(prompt) = &payload.prompt {
        debug!("Caller prompt (not forwarded): {}", prompt);
    }

    let request =
        SuggestionRequest::from_location(payload.budget, payload.distance, &payload.location);
    let batch = state.service.suggest(request).await?;
    Ok(Json(batch.into()))
}

async fn health(State(state): State<AppState>) -> Json<ApiHealth> {
    Json(ApiHealth {
        status: "ok",
        version: crate::VERSION,
        model_configured: state.service.is_ready(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (CloseEscapeError::config("no key"), StatusCode::INTERNAL_SERVER_ERROR),
            (
                CloseEscapeError::upstream("API key not valid"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                CloseEscapeError::upstream("Request timed out"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                CloseEscapeError::upstream("quota exceeded"),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (CloseEscapeError::upstream("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_request_defaults_missing_fields() {
        let request: ApiSuggestRequest = serde_json::from_str(r#"{"location":{"city":"Agra"}}"#).unwrap();
        assert_eq!(request.budget, 0.0);
        assert_eq!(request.distance, 0.0);
        assert!(request.prompt.is_none());
        assert_eq!(request.location.city.as_deref(), Some("Agra"));
    }

    #[test]
    fn test_request_tolerates_null_and_string_numbers() {
        let request: ApiSuggestRequest = serde_json::from_str(
            r#"{"budget":null,"distance":"30","location":null}"#,
        )
        .unwrap();
        assert_eq!(request.budget, 0.0);
        assert_eq!(request.distance, 30.0);
        assert_eq!(request.location, Location::default());
    }

    #[test]
    fn test_response_note_only_for_fallback() {
        let model: ApiSuggestResponse = SuggestionBatch::from_model(vec![]).into();
        let value = serde_json::to_value(&model).unwrap();
        assert!(value.get("note").is_none());

        let fallback: ApiSuggestResponse = SuggestionBatch::fallback(vec![]).into();
        let value = serde_json::to_value(&fallback).unwrap();
        assert_eq!(value["note"], crate::models::FALLBACK_NOTE);
    }
}
