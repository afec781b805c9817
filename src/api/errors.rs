use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::controller::ControllerError;

/// Every error leaves the service as `{ "message": ... }`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Controller(ControllerError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Controller(e) if e.is_invalid_input() => StatusCode::BAD_REQUEST,
            ApiError::Controller(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "message": self.to_string() }))
    }
}
