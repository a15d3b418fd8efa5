use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

/// One entry of a 422 response body, located by field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    #[serde(rename = "type")]
    pub kind: String,
    pub loc: Vec<String>,
    pub msg: String,
}

impl ValidationIssue {
    pub fn new(kind: &str, loc: &[&str], msg: &str) -> Self {
        Self {
            kind: kind.to_string(),
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.to_string(),
        }
    }

    pub fn missing(loc: &[&str]) -> Self {
        Self::new("missing", loc, "Field required")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not Found")]
    NotFound,

    #[error("Validation failed with {} issue(s)", .0.len())]
    Validation(Vec<ValidationIssue>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(rusqlite::Error::SqliteFailure(failure, message)) =
            err.downcast_ref::<rusqlite::Error>()
        {
            if failure.code == rusqlite::ErrorCode::ConstraintViolation {
                let message = message.as_deref().unwrap_or_default();
                let detail = if message.contains("people.discord_id") {
                    "A person with this discord_id already exists"
                } else {
                    "Conflicts with an existing record"
                };
                return Self::Conflict(detail.to_string());
            }
        }
        Self::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                Json(serde_json::json!({ "detail": "Unauthorized" })),
            )
                .into_response(),
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "detail": "Not Found" })),
            )
                .into_response(),
            Self::Validation(issues) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "detail": issues })),
            )
                .into_response(),
            Self::Conflict(detail) => (
                StatusCode::CONFLICT,
                Json(serde_json::json!({ "detail": detail })),
            )
                .into_response(),
            Self::Internal(err) => {
                tracing::error!("Application error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "detail": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
