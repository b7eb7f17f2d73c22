//! Metrics definitions for the resolver.

use shared::metrics_defs::{MetricDef, MetricType};

pub const OVERRIDE_HIT: MetricDef = MetricDef {
    name: "resolve.override_hit",
    metric_type: MetricType::Counter,
    description: "Number of requests answered from the local override table",
};

pub const CACHE_HIT: MetricDef = MetricDef {
    name: "cache.hit",
    metric_type: MetricType::Counter,
    description: "Number of source lookups fully answered from the cache. Tagged with source.",
};

pub const CACHE_MISS: MetricDef = MetricDef {
    name: "cache.miss",
    metric_type: MetricType::Counter,
    description: "Number of source lookups that had to query the source. Tagged with source.",
};

pub const SOURCE_UNKNOWN: MetricDef = MetricDef {
    name: "source.unknown",
    metric_type: MetricType::Counter,
    description: "Number of source lookups that ended without a definitive answer. Tagged with source.",
};

pub const DEADLINE_EXCEEDED: MetricDef = MetricDef {
    name: "resolve.deadline_exceeded",
    metric_type: MetricType::Counter,
    description: "Number of requests where at least one lookup was still running at the deadline",
};

pub const RESOLVE_DURATION: MetricDef = MetricDef {
    name: "resolve.duration",
    metric_type: MetricType::Histogram,
    description: "Time spent resolving an identifier in seconds",
};

pub const ALL_METRICS: &[MetricDef] = &[
    OVERRIDE_HIT,
    CACHE_HIT,
    CACHE_MISS,
    SOURCE_UNKNOWN,
    DEADLINE_EXCEEDED,
    RESOLVE_DURATION,
];
