use crate::shortcode::ShortCode;
use serde::{Deserialize, Serialize};

/// A stored mapping from a short code to the URL it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortLink {
    /// Identifier assigned by the store on insert.
    pub id: i64,
    pub short_code: ShortCode,
    pub original_url: String,
}

/// Bookkeeping row held by the index store for every live short code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub short_code: ShortCode,
    /// Number of successful resolutions, including cache hits.
    pub hit_count: u64,
}
