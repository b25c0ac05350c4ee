use crate::model::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use burrow_shortener::ShortenerError;
use tracing::{debug, warn};

pub type Result<T> = std::result::Result<T, AppError>;

/// Failures as the client sees them.
///
/// Every variant maps to a fixed message; the underlying error is logged
/// and never written to the response.
#[derive(Debug)]
pub enum AppError {
    /// The body was not valid JSON or the URL was rejected.
    InvalidInput,
    /// The short code in the path is empty or malformed.
    InvalidShortCode,
    Create(ShortenerError),
    Resolve(ShortenerError),
    Count(ShortenerError),
    Delete(ShortenerError),
    RateLimited,
}

impl AppError {
    /// Errors from the create route. URL validation failures are the
    /// client's fault and stay 400.
    pub fn create(err: ShortenerError) -> Self {
        match err {
            ShortenerError::InvalidUrl(_) => AppError::InvalidInput,
            other => AppError::Create(other),
        }
    }

    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::InvalidInput => (StatusCode::BAD_REQUEST, "Invalid input"),
            AppError::InvalidShortCode => (StatusCode::BAD_REQUEST, "Short URL is required"),
            AppError::Create(ShortenerError::Collision(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate short URL, URL may already exist",
            ),
            AppError::Create(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to add data to the database",
            ),
            AppError::Resolve(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "The short URL does not exist",
            ),
            AppError::Count(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to retrieve count for short URL",
            ),
            AppError::Delete(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to delete short URL, it may not exist",
            ),
            AppError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        match &self {
            AppError::Create(e) | AppError::Resolve(e) | AppError::Count(e) | AppError::Delete(e) => {
                match e {
                    ShortenerError::NotFound(_) | ShortenerError::Collision(_) => {
                        debug!(error = %e, %status, "Request failed")
                    }
                    _ => warn!(error = %e, %status, "Request failed"),
                }
            }
            _ => debug!(%status, message, "Request rejected"),
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_is_a_bad_request() {
        let err = AppError::create(ShortenerError::InvalidUrl("ftp://x".into()));
        assert_eq!(err.status_and_message().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn service_failures_are_generic_500s() {
        let (status, message) =
            AppError::create(ShortenerError::Collision("abc".into())).status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Failed to generate short URL, URL may already exist");

        let (status, message) =
            AppError::Resolve(ShortenerError::Timeout("5000ms".into())).status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("5000ms"));
    }

    #[test]
    fn rate_limited_is_429() {
        let response = AppError::RateLimited.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
