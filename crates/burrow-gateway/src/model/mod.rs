mod url;

pub use url::{CountResponse, CreateUrlRequest, CreateUrlResponse, DeleteUrlResponse, GetUrlResponse};

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}
