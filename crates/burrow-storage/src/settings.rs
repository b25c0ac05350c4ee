use std::time::Duration;
use typed_builder::TypedBuilder;

/// What the registry answers when the index store cannot be queried
/// during an existence check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExistencePolicy {
    /// Report the code as absent and let generation proceed.
    #[default]
    FailOpen,
    /// Surface the error and stop generation.
    FailClosed,
}

/// Tunables shared by the routed repositories.
#[derive(Debug, Clone, TypedBuilder)]
pub struct StorageSettings {
    /// Upper bound for every durable operation.
    #[builder(default = Duration::from_secs(5))]
    pub operation_timeout: Duration,
    /// Total attempts for inserting an index entry.
    #[builder(default = 3)]
    pub register_attempts: usize,
    #[builder(default)]
    pub existence_policy: ExistencePolicy,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}
