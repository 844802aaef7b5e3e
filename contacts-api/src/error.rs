//! The single place where failures become HTTP responses.
//!
//! Handlers return [`ApiError`]; extractor failures are routed here through
//! [`json_config`], [`path_config`] and [`query_config`], and unmatched routes
//! through [`not_found`]. Internal details are logged, never sent.

use actix_web::{error, http::StatusCode, web, HttpRequest, HttpResponse, ResponseError};
use shared_types::{ErrorResponse, ValidationErrors};
use thiserror::Error;

use crate::database::contacts::ContactDbError;

pub const CONTACT_NOT_FOUND: &str = "Contact not found";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn contact_not_found() -> Self {
        ApiError::NotFound(CONTACT_NOT_FOUND.to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<ContactDbError> for ApiError {
    fn from(e: ContactDbError) -> Self {
        match e {
            ContactDbError::DuplicateEmail => ApiError::Conflict(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Validation(errors) => ErrorResponse {
                error: "Validation failed".to_string(),
                details: Some(errors.errors().to_vec()),
            },
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Conflict(msg) => {
                ErrorResponse::new(msg.clone())
            }
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::new("Internal server error")
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        tracing::debug!("Rejected JSON body: {}", err);
        let api_error = match err {
            error::JsonPayloadError::ContentType => {
                ApiError::BadRequest("Content-Type must be application/json".to_string())
            }
            _ => ApiError::BadRequest("Invalid JSON body".to_string()),
        };
        api_error.into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req: &HttpRequest| {
        tracing::debug!("Rejected path: {}", err);
        ApiError::BadRequest("Invalid contact id".to_string()).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req: &HttpRequest| {
        tracing::debug!("Rejected query string: {}", err);
        ApiError::BadRequest("Invalid query string".to_string()).into()
    })
}

pub async fn not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound("Not found".to_string()))
}
