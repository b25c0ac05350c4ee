use burrow_core::error::{Result, StorageError};
use std::future::Future;
use std::time::Duration;

/// Runs a store operation, failing with [`StorageError::Timeout`] once `limit` passes.
pub async fn bounded<T, F>(limit: Duration, operation: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(StorageError::Timeout(format!(
            "{operation} did not finish within {}ms",
            limit.as_millis()
        ))),
    }
}
