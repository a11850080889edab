//! HTTP surface: route table, handlers and the signup rate-limit gate

use crate::error::{AppError, ErrorBody, PANIC_MESSAGE};
use crate::signup_service::SignupReceipt;
use crate::signup_validator::{SignupRequest, ValidationError};
use crate::state::AppState;
use crate::stats_service::WaitlistStats;
use crate::waitlist_entry::WaitlistEntry;
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::Path;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
}

/// Build the full application router. Static landing content from
/// `static_dir` is served for every path not claimed by the API.
pub fn router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // The rate limit guards the signup route only.
    let signup = post(join_waitlist_handler).route_layer(middleware::from_fn_with_state(
        state.clone(),
        signup_rate_limit,
    ));

    let static_files = ServeDir::new(static_dir).append_index_html_on_directories(true);

    Router::new()
        .route("/api/waitlist", signup)
        .route("/api/waitlist/stats", get(stats_handler))
        .route("/api/waitlist/entries", get(entries_handler))
        .route("/api/health", get(health_handler))
        .fallback_service(static_files)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn signup_rate_limit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    state
        .signup_rate_limiter
        .check_rate_limit(&addr.ip())
        .map_err(|retry_after| AppError::RateLimited { retry_after })?;

    Ok(next.run(request).await)
}

async fn join_waitlist_handler(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SignupReceipt>), AppError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!("Rejecting signup body: {}", rejection);
        ValidationError::MalformedPayload
    })?;

    let receipt = state.signups.join(&request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn stats_handler(State(state): State<AppState>) -> Result<Json<WaitlistStats>, AppError> {
    Ok(Json(state.stats.stats().await?))
}

async fn entries_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<WaitlistEntry>>, AppError> {
    if let Some(expected) = state.admin_token.as_deref() {
        authorize(&headers, expected)?;
    }

    let entries = state.listing.list_entries().await?;
    info!("Listing {} waitlist entries", entries.len());
    Ok(Json(entries))
}

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "OK",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

pub(crate) fn authorize(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim());

    match presented {
        Some(token) if tokens_match(token.as_bytes(), expected.as_bytes()) => Ok(()),
        _ => {
            debug!("Rejecting entries listing: missing or wrong admin token");
            Err(AppError::Unauthorized)
        }
    }
}

/// Compares every byte of `expected` regardless of where the first mismatch is.
pub(crate) fn tokens_match(presented: &[u8], expected: &[u8]) -> bool {
    let mut diff = presented.len() ^ expected.len();
    for (i, byte) in expected.iter().enumerate() {
        let other = presented.get(i).copied().unwrap_or(0);
        diff |= usize::from(byte ^ other);
    }
    diff == 0
}

fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", detail);

    let body = ErrorBody {
        message: PANIC_MESSAGE.to_string(),
        error: "internal_error",
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
