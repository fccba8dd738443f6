use crate::engine::{Aggregate, AggregationEngine};
use crate::error::AnalyticsError;
use core_types::Dimension;
use dataset::{DatasetSlice, Fingerprint};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    fingerprint: Fingerprint,
    dimensions: Vec<Dimension>,
}

/// Memoizes aggregation results for the lifetime of one session.
///
/// Keys are the content fingerprint of the input slice plus the dimension
/// tuple, so a reloaded or filtered dataset can never serve stale buckets.
/// The compute runs under the map lock, which guarantees at-most-once
/// computation per key even if report requests race.
#[derive(Debug, Default)]
pub struct AggregationCache {
    entries: Mutex<HashMap<CacheKey, Arc<Aggregate>>>,
}

impl AggregationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached aggregate for (slice, dimensions), computing and
    /// storing it on first use.
    pub fn get_or_compute(
        &self,
        engine: &AggregationEngine,
        slice: &DatasetSlice<'_>,
        dimensions: &[Dimension],
    ) -> Result<Arc<Aggregate>, AnalyticsError> {
        let key = CacheKey {
            fingerprint: slice.fingerprint(),
            dimensions: dimensions.to_vec(),
        };

        let mut entries = self.entries.lock().expect("aggregation cache poisoned");
        if let Some(hit) = entries.get(&key) {
            debug!(fingerprint = %slice.fingerprint(), ?dimensions, "aggregation cache hit");
            return Ok(Arc::clone(hit));
        }

        debug!(fingerprint = %slice.fingerprint(), ?dimensions, "aggregation cache miss");
        let computed = Arc::new(engine.aggregate(slice, dimensions)?);
        entries.insert(key, Arc::clone(&computed));
        Ok(computed)
    }

    /// Drops every memoized aggregate. Call when the underlying dataset
    /// changes (e.g. a new sale file was added).
    pub fn invalidate_all(&self) {
        self.entries
            .lock()
            .expect("aggregation cache poisoned")
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("aggregation cache poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
