use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::services::archive::ArchiveError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server start failure: {0}")]
    StartServer(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("persistence error: {0}")]
    Persistence(#[from] ArchiveError),
}

impl AppError {
    /// Returns HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::BadRequest(_) => 400,
            AppError::Config(_) | AppError::StartServer(_) | AppError::Persistence(_) => 500,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let error = match &self {
            AppError::BadRequest(_) => "validation_error",
            AppError::Persistence(_) => "persistence_error",
            AppError::Config(_) | AppError::StartServer(_) => "server_error",
        };
        let body = Json(serde_json::json!({
            "error": error,
            "message": self.to_string(),
            "status": status.as_u16(),
        }));
        (status, body).into_response()
    }
}
