use crate::signup_service::SignupError;
use crate::signup_validator::ValidationError;
use crate::waitlist_store::StoreError;
use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const PANIC_MESSAGE: &str = "Something went wrong!";

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Too many requests from this IP, please try again later.")]
    RateLimited { retry_after: Duration },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(#[from] StoreError),
}

/// Body of every error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub error: &'static str,
}

impl AppError {
    /// Machine-readable kind exposed alongside the message
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::DuplicateEmail => "duplicate_email",
            AppError::RateLimited { .. } => "rate_limited",
            AppError::Unauthorized => "unauthorized",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::DuplicateEmail => StatusCode::BAD_REQUEST,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SignupError> for AppError {
    fn from(err: SignupError) -> Self {
        match err {
            SignupError::Validation(e) => AppError::Validation(e),
            SignupError::DuplicateEmail => AppError::DuplicateEmail,
            SignupError::Store(e) => AppError::Internal(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Store failures never reach the client verbatim.
        let message = match &self {
            AppError::Internal(e) => {
                error!("Internal error: {}", e);
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            message,
            error: self.kind(),
        };
        let mut response = (status, Json(body)).into_response();

        if let AppError::RateLimited { retry_after } = self {
            let seconds = retry_after.as_secs().max(1);
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }

        response
    }
}
