pub mod hash;

pub use hash::{HashGenerator, HashGeneratorSettings};

use burrow_core::ShortCode;

/// Derives a candidate short code from a URL.
///
/// Implementations are pure and never touch storage; whether the candidate
/// is still free is decided by the caller against the index.
pub trait Generator: Send + Sync + 'static {
    fn generate(&self, original_url: &str) -> ShortCode;
}
