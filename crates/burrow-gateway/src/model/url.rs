use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateUrlRequest {
    pub original_url: String,
}

#[derive(Debug, Serialize)]
pub struct CreateUrlResponse {
    pub id: i64,
    pub short_url: String,
    pub original_url: String,
}

#[derive(Debug, Serialize)]
pub struct GetUrlResponse {
    pub original_url: String,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    /// The short code the count belongs to.
    pub url: String,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct DeleteUrlResponse {
    pub message: &'static str,
}
