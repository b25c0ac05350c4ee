mod cli;

use crate::cli::{StorageBackendArg, CLI};
use anyhow::Context;
use burrow_cache::{MokaUrlCache, RedisUrlCache};
use burrow_core::{Store, UrlCache};
use burrow_gateway::{telemetry, App, AppState};
use burrow_generator::HashGenerator;
use burrow_limiter::{
    MokaWindowStore, RateLimitSettings, RateLimiter, RedisWindowStore, WindowStore,
};
use burrow_shortener::{LinkService, ServiceSettings, Shortener};
use burrow_storage::{topology, InMemoryStore, ShardRouter};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// How long a request waits for a pooled database connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::try_parse()?;
    telemetry::init(config.log_format)?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        existence_policy = %config.existence_policy,
        rate_limit = config.rate_limit,
        shared_backend = config.redis_url.is_some(),
        "starting burrow gateway"
    );

    let settings = ServiceSettings::builder()
        .existence_policy(config.existence_policy.into())
        .build();
    let cache = build_cache(config.redis_url.as_deref()).await?;

    let shortener = match config.storage {
        StorageBackendArg::InMemory => {
            build_shortener(ShardRouter::single(InMemoryStore::new()), cache, settings)
        }
        StorageBackendArg::Postgres => {
            let topology = topology::from_env().context("invalid database topology")?;
            let router = topology::connect_lazy(topology, ACQUIRE_TIMEOUT)?;
            if config.init_schema {
                for store in router.writable_handles() {
                    store
                        .ensure_schema()
                        .await
                        .context("failed to create database schema")?;
                }
                info!("database schema ready");
            }
            build_shortener(router, cache, settings)
        }
    };

    let mut state = AppState::new(shortener);
    if let Some(base_url) = config.public_base_url {
        state = state.with_public_base_url(base_url);
    }
    if config.rate_limit {
        state = state.with_rate_limiter(build_limiter(config.redis_url.as_deref()).await?);
    }

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(
        listener,
        App::router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("gateway stopped");
    Ok(())
}

fn build_shortener<S: Store>(
    router: ShardRouter<S>,
    cache: Arc<dyn UrlCache>,
    settings: ServiceSettings,
) -> Arc<dyn Shortener> {
    Arc::new(LinkService::new(
        router,
        cache,
        HashGenerator::default(),
        settings,
    ))
}

async fn build_cache(redis_url: Option<&str>) -> anyhow::Result<Arc<dyn UrlCache>> {
    Ok(match redis_url {
        Some(url) => Arc::new(
            RedisUrlCache::connect(url)
                .await
                .context("failed to connect URL cache")?,
        ),
        None => Arc::new(MokaUrlCache::new()),
    })
}

async fn build_limiter(redis_url: Option<&str>) -> anyhow::Result<RateLimiter> {
    let settings = RateLimitSettings::default();
    let store: Arc<dyn WindowStore> = match redis_url {
        Some(url) => Arc::new(
            RedisWindowStore::connect(url)
                .await
                .context("failed to connect rate limiter")?,
        ),
        None => Arc::new(MokaWindowStore::new(settings.window)),
    };
    Ok(RateLimiter::new(store, settings))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
