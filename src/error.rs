use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error("Patient not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl IntoResponse for ClinicError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ClinicError::NotFound => (StatusCode::NOT_FOUND, "not-found", self.to_string()),
            ClinicError::DatabaseError(e) => {
                tracing::error!(error = %e, "Persistence failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "exception",
                    "Database error occurred".to_string(),
                )
            }
            ClinicError::Template(e) => {
                tracing::error!(error = %e, "Template rendering failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "exception",
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(error_body(code, &message))).into_response()
    }
}

fn error_body(code: &str, message: &str) -> serde_json::Value {
    json!({
        "error": code,
        "message": message
    })
}

pub type Result<T> = std::result::Result<T, ClinicError>;
