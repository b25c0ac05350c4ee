use burrow_storage::{ExistencePolicy, StorageSettings};
use std::time::Duration;
use typed_builder::TypedBuilder;

/// Tunables for [`LinkService`](crate::LinkService).
#[derive(Debug, Clone, TypedBuilder)]
pub struct ServiceSettings {
    /// Upper bound for every durable operation.
    #[builder(default = Duration::from_secs(5))]
    pub operation_timeout: Duration,
    /// How long a resolved URL stays cached.
    #[builder(default = Duration::from_secs(30 * 60))]
    pub cache_ttl: Duration,
    /// Total attempts for inserting an index entry.
    #[builder(default = 3)]
    pub register_attempts: usize,
    #[builder(default)]
    pub existence_policy: ExistencePolicy,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ServiceSettings {
    pub fn storage(&self) -> StorageSettings {
        StorageSettings::builder()
            .operation_timeout(self.operation_timeout)
            .register_attempts(self.register_attempts)
            .existence_policy(self.existence_policy)
            .build()
    }
}
