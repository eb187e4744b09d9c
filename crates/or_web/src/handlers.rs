use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use or_analysis::BatchPolicy;
use or_core::Error;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default, alias = "focusKeyword")]
    pub keyword: String,
    #[serde(default)]
    pub allow_partial: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: message.to_string(),
                kind: "invalid_request".to_string(),
                details: None,
            },
        }
    }

    fn from_error(error: &Error, dev_mode: bool) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                error: error.to_string(),
                kind: error.kind().to_string(),
                details: dev_mode.then(|| format!("{:?}", error)),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Response, ApiError> {
    let urls: Vec<String> = request
        .urls
        .iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect();
    if urls.is_empty() {
        return Err(ApiError::bad_request("urls must contain at least one URL"));
    }
    if request.keyword.trim().is_empty() {
        return Err(ApiError::bad_request("keyword must not be empty"));
    }

    let policy = if request.allow_partial {
        BatchPolicy::Partial
    } else {
        state.runner.config().policy
    };
    tracing::info!("📥 analyze request: {} URLs, keyword '{}'", urls.len(), request.keyword);

    match state.runner.run_with_policy(&urls, request.keyword.trim(), policy).await {
        Ok(batch) => Ok(Json(batch).into_response()),
        Err(e) => {
            tracing::error!("❌ analyze failed: {}", e);
            Err(ApiError::from_error(&e, state.dev_mode))
        }
    }
}

pub async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}
