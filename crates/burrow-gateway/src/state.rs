use burrow_core::ShortCode;
use burrow_limiter::RateLimiter;
use burrow_shortener::Shortener;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    base_url: Option<String>,
    limiter: Option<RateLimiter>,
}

impl AppState {
    pub fn new(shortener: Arc<dyn Shortener>) -> Self {
        Self {
            shortener,
            base_url: None,
            limiter: None,
        }
    }

    /// Short URLs in responses are joined to this base.
    pub fn with_public_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Every request is checked against `limiter` before it is handled.
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    pub fn limiter(&self) -> Option<&RateLimiter> {
        self.limiter.as_ref()
    }

    pub fn short_url(&self, code: &ShortCode) -> String {
        match &self.base_url {
            Some(base) => code.to_url(base),
            None => code.to_string(),
        }
    }
}
