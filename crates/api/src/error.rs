use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sched_core::{ConfigurationError, ValidationError};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Vec<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            details: vec![],
        }
    }

    pub fn not_ready(id: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: format!("job {id} has no result yet"),
            details: vec![],
        }
    }

    pub fn not_found(what: &str, id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("{what} {id} not found"),
            details: vec![],
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "invalid instance".into(),
            details: e.0.iter().map(ToString::to_string).collect(),
        }
    }
}

impl From<ConfigurationError> for ApiError {
    fn from(e: ConfigurationError) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message, "details": self.details });
        (self.status, Json(body)).into_response()
    }
}
