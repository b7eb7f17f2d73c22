pub mod admin;
pub mod api;
pub mod cache;
pub mod cached_resolver;
pub mod config;
pub mod id_resolver;
pub mod merger;
pub mod metrics_defs;
pub mod overrides;
pub mod result_map;
pub mod sources;
pub mod types;

#[cfg(test)]
mod testutils;

use admin::AdminService;
use api::{ApiError, ResolveService};
use cache::{CacheError, build_cache};
use config::{Config, ValidationError};
use id_resolver::IdResolver;
use shared::http::run_http_service;
use sources::SourceError;

#[derive(thiserror::Error, Debug)]
pub enum ResolverError {
    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("source setup failed: {0}")]
    Source(#[from] SourceError),

    #[error("server error: {0}")]
    Api(#[from] ApiError),
}

/// Serves the resolver and its admin endpoints until either listener fails.
pub async fn run(config: Config) -> Result<(), ResolverError> {
    config.validate()?;

    let cache = build_cache(&config.cache.backend).await?;
    let resolver = IdResolver::from_config(&config, cache.clone())?;
    tracing::info!(
        cache = cache.name(),
        on_deadline = ?config.resolver.on_deadline,
        "Resolver ready"
    );

    let api_task = run_http_service(
        &config.listener.host,
        config.listener.port,
        ResolveService::new(resolver, config.resolver.clone()),
    );
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        AdminService::<ApiError>::new(cache),
    );

    tokio::try_join!(api_task, admin_task)?;
    Ok(())
}
