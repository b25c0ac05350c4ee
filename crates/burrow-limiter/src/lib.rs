//! Sliding-window request rate limiting keyed by client identity.

pub mod clock;
pub mod limiter;
pub mod memory;
pub mod redis;
pub mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use limiter::{RateLimitSettings, RateLimiter};
pub use memory::MokaWindowStore;
pub use self::redis::RedisWindowStore;
pub use window::WindowStore;
