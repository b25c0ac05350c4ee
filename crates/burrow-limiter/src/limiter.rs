use crate::clock::{Clock, SystemClock};
use crate::window::WindowStore;
use burrow_core::LimiterError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, TypedBuilder)]
pub struct RateLimitSettings {
    /// Requests admitted per client inside one window.
    #[builder(default = 5)]
    pub limit: u64,
    #[builder(default = Duration::from_secs(30))]
    pub window: Duration,
    /// How long to wait on the backend before admitting anyway.
    #[builder(default = Duration::from_secs(1))]
    pub backend_timeout: Duration,
    #[builder(default = "burrow:rate:".to_string(), setter(into))]
    pub key_prefix: String,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Sliding-window rate limiter.
///
/// Every call records an event for the client, rejected calls included, so a
/// client that keeps retrying stays limited until it backs off for a whole
/// window. Backend failures admit the request.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn WindowStore>,
    clock: Arc<dyn Clock>,
    settings: RateLimitSettings,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn WindowStore>, settings: RateLimitSettings) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), settings)
    }

    pub fn with_clock(
        store: Arc<dyn WindowStore>,
        clock: Arc<dyn Clock>,
        settings: RateLimitSettings,
    ) -> Self {
        Self {
            store,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &RateLimitSettings {
        &self.settings
    }

    /// Returns whether a request from `client_key` may proceed.
    pub async fn admit(&self, client_key: &str) -> bool {
        let key = format!("{}{}", self.settings.key_prefix, client_key);
        let now_ms = self.clock.now().as_millisecond();

        let result = tokio::time::timeout(
            self.settings.backend_timeout,
            self.store.record_and_count(&key, now_ms, self.settings.window),
        )
        .await
        .unwrap_or_else(|_| {
            Err(LimiterError::Timeout(format!(
                "window update did not finish within {}ms",
                self.settings.backend_timeout.as_millis()
            )))
        });

        match result {
            Ok(count) if count > self.settings.limit => {
                debug!(
                    client = client_key,
                    count,
                    limit = self.settings.limit,
                    "Rate limit exceeded"
                );
                false
            }
            Ok(_) => true,
            Err(e) => {
                warn!(client = client_key, error = %e, "Rate limiter backend failed, admitting request");
                true
            }
        }
    }
}
