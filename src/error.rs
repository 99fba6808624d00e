use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Typed errors returned by the service layer. Each variant maps to one HTTP
/// status in the `ResponseError` impl below, so handlers can use `?` and let
/// actix render the response.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("You cannot follow yourself")]
    SelfFollow,

    #[error("{0}")]
    Unauthenticated(&'static str),

    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Media upload failed")]
    Media(#[from] reqwest::Error),
}

impl ServiceError {
    /// Collapses a unique-constraint violation into `Conflict`. A writer that
    /// races past an application-level existence check still answers 409
    /// instead of surfacing the store error as 500.
    pub fn conflict_on_unique(err: sea_orm::DbErr, message: &str) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
                ServiceError::Conflict(message.to_string())
            }
            _ => ServiceError::Database(err),
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) | ServiceError::SelfFollow => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Media(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::Database(err) => log::error!("Database error: {:?}", err),
            ServiceError::Media(err) => log::error!("Media upload error: {:?}", err),
            _ => {}
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
