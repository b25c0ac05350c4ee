use thiserror::Error;

/// Result type for durable store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("short code already exists: {0}")]
    Conflict(String),
    #[error("storage is misconfigured: {0}")]
    Configuration(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation timed out: {0}")]
    Timeout(String),
    #[error("cache value is invalid: {0}")]
    InvalidData(String),
    #[error("cache initialization failed: {0}")]
    Initialization(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
}

#[derive(Debug, Clone, Error)]
pub enum LimiterError {
    #[error("rate limiter backend unavailable: {0}")]
    Unavailable(String),
    #[error("rate limiter operation timed out: {0}")]
    Timeout(String),
    #[error("rate limiter operation failed: {0}")]
    Operation(String),
}

/// Errors surfaced by the shortener operations.
///
/// Cache and rate limiter failures never appear here: they are recovered
/// where they happen.
#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
    #[error("short code already registered: {0}")]
    Collision(String),
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("failed to register short code {0} in the index")]
    Registration(String),
    #[error("link {0} was removed but its index entry was not; manual cleanup required")]
    IndexCleanup(String),
    #[error("operation timed out: {0}")]
    Timeout(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for ShortenerError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Conflict(code) => Self::Collision(code),
            StorageError::Timeout(message) => Self::Timeout(message),
            StorageError::Configuration(message) => Self::Configuration(message),
            other => Self::Storage(other.to_string()),
        }
    }
}
