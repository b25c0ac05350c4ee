use burrow_gateway::telemetry::LogFormat;
use burrow_storage::ExistencePolicy;
use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "BURROW_LISTEN_ADDR";
pub const PUBLIC_BASE_URL_ENV: &str = "BURROW_PUBLIC_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "BURROW_STORAGE_BACKEND";
pub const INIT_SCHEMA_ENV: &str = "BURROW_INIT_SCHEMA";
pub const REDIS_URL_ENV: &str = "BURROW_REDIS_URL";
pub const RATE_LIMIT_ENV: &str = "BURROW_RATE_LIMIT";
pub const EXISTENCE_POLICY_ENV: &str = "BURROW_EXISTENCE_POLICY";
pub const LOG_FORMAT_ENV: &str = "BURROW_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "postgres")]
    Postgres,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Postgres => write!(f, "postgres"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExistencePolicyArg {
    #[value(name = "fail-open")]
    FailOpen,
    #[value(name = "fail-closed")]
    FailClosed,
}

impl Display for ExistencePolicyArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExistencePolicyArg::FailOpen => write!(f, "fail-open"),
            ExistencePolicyArg::FailClosed => write!(f, "fail-closed"),
        }
    }
}

impl From<ExistencePolicyArg> for ExistencePolicy {
    fn from(value: ExistencePolicyArg) -> Self {
        match value {
            ExistencePolicyArg::FailOpen => ExistencePolicy::FailOpen,
            ExistencePolicyArg::FailClosed => ExistencePolicy::FailClosed,
        }
    }
}

/// Database pools are configured from `DATABASE_URL`, or from
/// `DATABASE_SHARD_{n}_URL`, `DATABASE_SHARD_{n}_REPLICA_URL` and
/// `DATABASE_INDEX_URL` for a sharded deployment.
#[derive(Debug, Parser)]
#[command(name = "burrow-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Base joined to short codes in create responses.
    #[arg(long, env = PUBLIC_BASE_URL_ENV)]
    pub public_base_url: Option<String>,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    /// Create the tables on every writable pool before serving.
    #[arg(long, env = INIT_SCHEMA_ENV, default_value_t = false)]
    pub init_schema: bool,

    /// Shared cache and rate windows. In-process ones are used when unset.
    #[arg(long, env = REDIS_URL_ENV)]
    pub redis_url: Option<String>,

    #[arg(long, env = RATE_LIMIT_ENV, default_value_t = false)]
    pub rate_limit: bool,

    #[arg(
        long,
        env = EXISTENCE_POLICY_ENV,
        value_enum,
        default_value_t = ExistencePolicyArg::FailOpen
    )]
    pub existence_policy: ExistencePolicyArg,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = CLI::try_parse_from(["burrow-gateway"]).unwrap();
        assert_eq!(cli.listen_addr, DEFAULT_LISTEN_ADDR.parse().unwrap());
        assert_eq!(cli.storage, StorageBackendArg::InMemory);
        assert_eq!(cli.existence_policy, ExistencePolicyArg::FailOpen);
        assert_eq!(cli.log_format, LogFormat::Text);
        assert!(!cli.rate_limit);
        assert!(!cli.init_schema);
        assert!(cli.redis_url.is_none());
        assert!(cli.public_base_url.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = CLI::try_parse_from([
            "burrow-gateway",
            "--listen-addr",
            "0.0.0.0:9000",
            "--storage",
            "postgres",
            "--rate-limit",
            "--existence-policy",
            "fail-closed",
            "--log-format",
            "json",
            "--redis-url",
            "redis://127.0.0.1:6379",
        ])
        .unwrap();
        assert_eq!(cli.listen_addr.port(), 9000);
        assert_eq!(cli.storage, StorageBackendArg::Postgres);
        assert!(cli.rate_limit);
        assert_eq!(
            ExistencePolicy::from(cli.existence_policy),
            ExistencePolicy::FailClosed
        );
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.redis_url.as_deref(), Some("redis://127.0.0.1:6379"));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(CLI::try_parse_from(["burrow-gateway", "--storage", "mysql"]).is_err());
    }
}
