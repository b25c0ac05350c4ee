use crate::error::AppError;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use burrow_limiter::RateLimiter;
use std::net::SocketAddr;

/// Rejects clients that exceed the rate limit, keyed by peer IP.
///
/// Requests without peer information share one bucket.
pub async fn rate_limit(State(limiter): State<RateLimiter>, request: Request, next: Next) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if !limiter.admit(&client).await {
        return AppError::RateLimited.into_response();
    }

    next.run(request).await
}
