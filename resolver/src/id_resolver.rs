use crate::cache::CacheStore;
use crate::cached_resolver::{CachedResolver, FieldLookup};
use crate::config::{Config, DeadlinePolicy};
use crate::merger::merge;
use crate::metrics_defs::{DEADLINE_EXCEEDED, OVERRIDE_HIT, RESOLVE_DURATION};
use crate::overrides::Overrides;
use crate::result_map::ResultMap;
use crate::sources::{DomainResolver, NicknameResolver, SourceError};
use crate::types::FieldValues;
use shared::{counter, histogram};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::Instrument;

struct IdResolverInner {
    overrides: Overrides,
    lookups: Vec<Arc<dyn FieldLookup>>,
    on_deadline: DeadlinePolicy,
}

/// Resolves an identifier to the best known name by asking every source
/// at once and merging whatever answered before the deadline.
#[derive(Clone)]
pub struct IdResolver {
    inner: Arc<IdResolverInner>,
}

impl IdResolver {
    pub fn new(
        overrides: Overrides,
        lookups: Vec<Arc<dyn FieldLookup>>,
        on_deadline: DeadlinePolicy,
    ) -> Self {
        IdResolver {
            inner: Arc::new(IdResolverInner {
                overrides,
                lookups,
                on_deadline,
            }),
        }
    }

    /// Wires up the domain and nickname sources behind `cache`.
    pub fn from_config(config: &Config, cache: Arc<dyn CacheStore>) -> Result<Self, SourceError> {
        let ttl_secs = config.cache.ttl_secs;
        let lookups: Vec<Arc<dyn FieldLookup>> = vec![
            Arc::new(CachedResolver::new(
                DomainResolver::new(&config.sources)?,
                cache.clone(),
                ttl_secs,
            )),
            Arc::new(CachedResolver::new(
                NicknameResolver::new(&config.sources)?,
                cache,
                ttl_secs,
            )),
        ];

        Ok(IdResolver::new(
            Overrides::new(config.overrides.clone()),
            lookups,
            config.resolver.on_deadline,
        ))
    }

    /// Returns the best name for `identifier`, or an empty string if none of
    /// the sources produced one within `timeout`. Never fails.
    pub async fn resolve(&self, identifier: &str, timeout: Duration) -> String {
        if let Some(name) = self.inner.overrides.get(identifier) {
            counter!(OVERRIDE_HIT).increment(1);
            return name.to_string();
        }

        let span = tracing::info_span!("resolve", address = %identifier);
        async {
            let start = Instant::now();
            let values = self.fan_out(identifier, timeout).await;
            let name = merge(&values);
            histogram!(RESOLVE_DURATION).record(start.elapsed().as_secs_f64());
            tracing::debug!(name = %name, "Resolved");
            name
        }
        .instrument(span)
        .await
    }

    /// Runs every lookup concurrently and collects what is available when
    /// they have all finished or the deadline passes, whichever is first.
    async fn fan_out(&self, identifier: &str, timeout: Duration) -> FieldValues {
        let results = Arc::new(ResultMap::new());
        let mut join_set = JoinSet::new();

        for lookup in &self.inner.lookups {
            let lookup = lookup.clone();
            let results = results.clone();
            let identifier = identifier.to_string();
            let span = tracing::debug_span!("lookup", source = lookup.source());

            join_set.spawn(
                async move { lookup.lookup(&identifier, &results).await }.instrument(span),
            );
        }

        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    tracing::debug!("Deadline reached with {} lookups outstanding", join_set.len());
                    counter!(DEADLINE_EXCEEDED).increment(1);
                    match self.inner.on_deadline {
                        DeadlinePolicy::Detach => join_set.detach_all(),
                        DeadlinePolicy::Abort => join_set.abort_all(),
                    }
                    break;
                }
                join_result = join_set.join_next() => {
                    match join_result {
                        Some(Ok(())) => {}
                        Some(Err(e)) if e.is_panic() => tracing::error!("Lookup task panicked: {e}"),
                        Some(Err(e)) => tracing::debug!("Lookup task cancelled: {e}"),
                        // All lookups finished
                        None => break,
                    }
                }
            }
        }

        results.seal()
    }
}
