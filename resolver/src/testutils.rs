use crate::sources::{SourceError, SourceResolver};
use crate::types::{FieldRecord, ResolverOutcome};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

enum Behavior<T> {
    Outcome(ResolverOutcome<T>),
    Fail,
    Panic,
}

/// In-memory source with a configurable answer, latency and call counter.
pub struct MockSource<T> {
    name: &'static str,
    behavior: Mutex<Behavior<T>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl<T: FieldRecord + Clone> MockSource<T> {
    fn build(name: &'static str, behavior: Behavior<T>, delay: Duration) -> Arc<Self> {
        Arc::new(MockSource {
            name,
            behavior: Mutex::new(behavior),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn new(name: &'static str, outcome: ResolverOutcome<T>) -> Arc<Self> {
        Self::build(name, Behavior::Outcome(outcome), Duration::ZERO)
    }

    pub fn delayed(name: &'static str, outcome: ResolverOutcome<T>, delay: Duration) -> Arc<Self> {
        Self::build(name, Behavior::Outcome(outcome), delay)
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Self::build(name, Behavior::Fail, Duration::ZERO)
    }

    pub fn panicking(name: &'static str) -> Arc<Self> {
        Self::build(name, Behavior::Panic, Duration::ZERO)
    }

    pub fn set_outcome(&self, outcome: ResolverOutcome<T>) {
        *self.behavior.lock() = Behavior::Outcome(outcome);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: FieldRecord + Clone> SourceResolver for MockSource<T> {
    type Record = T;

    fn name(&self) -> &'static str {
        self.name
    }

    async fn resolve(&self, _identifier: &str) -> Result<ResolverOutcome<T>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let outcome = match &*self.behavior.lock() {
            Behavior::Outcome(outcome) => Some(outcome.clone()),
            Behavior::Fail => None,
            Behavior::Panic => panic!("mock source {} panicked", self.name),
        };
        outcome.ok_or(SourceError::UpstreamFailure)
    }
}
