use crate::cache::CacheStore;
use crate::metrics_defs::{CACHE_HIT, CACHE_MISS, SOURCE_UNKNOWN};
use crate::result_map::ResultMap;
use crate::sources::SourceResolver;
use crate::types::{Field, FieldRecord, ResolverOutcome, cache_key};
use async_trait::async_trait;
use shared::counter;
use std::sync::Arc;

/// A lookup the coordinator can run for one identifier. Implementations
/// write whatever fields they learn into the shared result map.
#[async_trait]
pub trait FieldLookup: Send + Sync {
    fn source(&self) -> &'static str;

    async fn lookup(&self, identifier: &str, results: &ResultMap);
}

/// Puts a cache in front of a source.
///
/// The source is only queried if any of its fields is missing from the
/// cache. Definitive answers, empty ones included, are written back with the
/// configured TTL. Unknown outcomes and errors are never cached.
pub struct CachedResolver<R> {
    resolver: R,
    cache: Arc<dyn CacheStore>,
    ttl_secs: u64,
}

impl<R: SourceResolver> CachedResolver<R> {
    pub fn new(resolver: R, cache: Arc<dyn CacheStore>, ttl_secs: u64) -> Self {
        CachedResolver {
            resolver,
            cache,
            ttl_secs,
        }
    }

    /// All fields of this source from the cache, or None if any is missing.
    async fn cached_values(&self, identifier: &str) -> Option<Vec<(Field, String)>> {
        let fields = <R::Record as FieldRecord>::FIELDS;
        let mut values = Vec::with_capacity(fields.len());

        for &field in fields {
            match self.cache.get(&cache_key(identifier, field)).await {
                Ok(Some(value)) => values.push((field, value)),
                Ok(None) => return None,
                Err(e) => {
                    tracing::warn!(cache = self.cache.name(), "Cache read failed: {e}");
                    return None;
                }
            }
        }

        Some(values)
    }

    async fn store(&self, identifier: &str, values: &[(Field, String)]) {
        for (field, value) in values {
            if let Err(e) = self
                .cache
                .set_with_ttl(&cache_key(identifier, *field), value, self.ttl_secs)
                .await
            {
                tracing::warn!(cache = self.cache.name(), "Cache write failed: {e}");
            }
        }
    }
}

#[async_trait]
impl<R: SourceResolver> FieldLookup for CachedResolver<R> {
    fn source(&self) -> &'static str {
        self.resolver.name()
    }

    async fn lookup(&self, identifier: &str, results: &ResultMap) {
        let source = self.resolver.name();

        if let Some(values) = self.cached_values(identifier).await {
            tracing::debug!(?values, "Cache hit");
            counter!(CACHE_HIT, "source" => source).increment(1);
            results.insert_all(values);
            return;
        }
        counter!(CACHE_MISS, "source" => source).increment(1);

        let values = match self.resolver.resolve(identifier).await {
            Ok(ResolverOutcome::Values(record)) => record.into_values(),
            Ok(ResolverOutcome::Unknown) => {
                tracing::debug!("No definitive answer, not caching");
                counter!(SOURCE_UNKNOWN, "source" => source).increment(1);
                return;
            }
            Err(e) => {
                tracing::debug!("Lookup failed, not caching: {e}");
                counter!(SOURCE_UNKNOWN, "source" => source).increment(1);
                return;
            }
        };

        tracing::debug!(?values, "Source result");
        self.store(identifier, &values).await;
        if !results.insert_all(values) {
            tracing::debug!("Result arrived after the deadline, cached only");
        }
    }
}
