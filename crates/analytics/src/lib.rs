//! # Teadesk Aggregation Engine
//!
//! This crate turns a slice of auction lots into derived metrics, grouped by
//! any combination of business dimensions. It is the numeric core of the
//! system: every figure a report or the on-screen overview shows comes out
//! of this crate.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   files, rendering, or the CLI. It depends only on `core-types` and
//!   `dataset`.
//! - **Stateless Calculation:** The `AggregationEngine` is a stateless
//!   calculator. The same slice and dimensions always produce the same
//!   buckets, field for field, independent of storage iteration order.
//! - **Explicit Caching:** Memoization lives in `AggregationCache`, an
//!   injected object keyed by the slice fingerprint plus the dimension
//!   tuple — never ambient global state.
//!
//! ## Public API
//!
//! - `AggregationEngine`: the main struct that contains the grouping logic.
//! - `MetricSet`: the derived metrics for one bucket.
//! - `AggregationKey` / `Aggregate`: bucket addressing and the result map.
//! - `AggregationCache`: fingerprint-keyed memoization with explicit
//!   invalidation.
//! - `AnalyticsError`: the specific error types that can be returned from
//!   this crate.

pub mod cache;
pub mod engine;
pub mod error;
pub mod key;
pub mod metrics;

// Re-export the key components to create a clean, public-facing API.
pub use cache::AggregationCache;
pub use engine::{Aggregate, AggregationEngine};
pub use error::AnalyticsError;
pub use key::AggregationKey;
pub use metrics::MetricSet;
