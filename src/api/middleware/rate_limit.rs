//! Rate limiting middleware.
//!
//! Provides rate limiting for API endpoints using the governor crate.

use axum::Json;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::models::ApiEnvelope;

/// Rate limiter state
pub type RateLimiterState = Arc<
    RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
>;

/// Create a rate limiter allowing `requests_per_minute` (at least 1)
pub fn create_rate_limiter_with_quota(requests_per_minute: u32) -> RateLimiterState {
    let quota = Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiterState>,
    request: Request,
    next: Next,
) -> Response {
    match limiter.check() {
        Ok(_) => next.run(request).await,
        Err(_) => {
            tracing::warn!("Rate limit exceeded for request: {}", request.uri());
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ApiEnvelope::failure("Too many requests, please try again later")),
            )
                .into_response()
        }
    }
}
