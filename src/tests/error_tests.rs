use crate::error::{AppError, INTERNAL_ERROR_MESSAGE};
use crate::rate_limit_manager::RATE_LIMITED_MESSAGE;
use crate::signup_service::SignupError;
use crate::signup_validator::ValidationError;
use crate::waitlist_store::StoreError;
use axum::http::{header::RETRY_AFTER, StatusCode};
use axum::response::IntoResponse;
use std::time::Duration;

#[test]
fn test_status_codes() {
    assert_eq!(
        AppError::Validation(ValidationError::MissingField("email")).status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(AppError::DuplicateEmail.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        AppError::RateLimited {
            retry_after: Duration::from_secs(1)
        }
        .status(),
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        AppError::Internal(StoreError::CorruptRow {
            id: 1,
            reason: "bad".to_string()
        })
        .status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn test_messages() {
    assert_eq!(
        AppError::Validation(ValidationError::MissingField("name")).to_string(),
        "All fields are required"
    );
    assert_eq!(
        AppError::DuplicateEmail.to_string(),
        "Email already registered"
    );
    assert_eq!(
        AppError::RateLimited {
            retry_after: Duration::ZERO
        }
        .to_string(),
        RATE_LIMITED_MESSAGE
    );
}

#[test]
fn test_signup_errors_map_to_http_taxonomy() {
    assert!(matches!(
        AppError::from(SignupError::DuplicateEmail),
        AppError::DuplicateEmail
    ));
    assert!(matches!(
        AppError::from(SignupError::Validation(ValidationError::MalformedPayload)),
        AppError::Validation(ValidationError::MalformedPayload)
    ));
    assert!(matches!(
        AppError::from(SignupError::Store(StoreError::CorruptRow {
            id: 7,
            reason: "bad".to_string()
        })),
        AppError::Internal(_)
    ));
}

#[test]
fn test_rate_limited_response_sets_retry_after() {
    let response = AppError::RateLimited {
        retry_after: Duration::from_secs(42),
    }
    .into_response();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "42");
}

#[tokio::test]
async fn test_internal_error_body_hides_cause() {
    let response = AppError::Internal(StoreError::CorruptRow {
        id: 3,
        reason: "farm_type: unknown value 'x'".to_string(),
    })
    .into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
    assert_eq!(body["error"], "internal_error");
}

#[test]
fn test_store_duplicate_surfaces_as_duplicate_email() {
    let signup_err = SignupError::from(StoreError::DuplicateEmail);
    assert!(matches!(signup_err, SignupError::DuplicateEmail));
    assert!(matches!(
        AppError::from(signup_err),
        AppError::DuplicateEmail
    ));
}
