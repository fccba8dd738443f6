use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The derived metrics for one aggregation bucket.
///
/// This struct is the output unit of the `AggregationEngine` and the data
/// transfer object every report builder and the on-screen overview consume.
///
/// Zero-safety rules baked into construction:
/// - any percentage with a zero catalogued weight is `0`, never a NaN or an
///   error;
/// - `avg_price` is `None` when the bucket has no priced sold lots, so "no
///   average exists" stays a representable state ("N/A" at render time).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    // I. Weights (kilograms)
    pub catalogued_kg: Decimal,
    pub sold_kg: Decimal,
    pub unsold_kg: Decimal,
    pub outsold_kg: Decimal,
    /// Sold plus outsold: everything that left the catalogue through a sale.
    pub sold_side_kg: Decimal,

    // II. Percentages of catalogued weight
    pub sold_pct: Decimal,
    pub unsold_pct: Decimal,
    pub outsold_pct: Decimal,

    // III. Value and price
    pub avg_price: Option<Decimal>, // None when the bucket has no priced sold lots
    pub total_value: Decimal,

    // IV. Lot counts
    pub lot_count: usize,
    pub sold_lot_count: usize,
}

impl MetricSet {
    /// Creates a new, zeroed-out MetricSet.
    /// Callers treat "bucket not found" as exactly this value.
    pub fn new() -> Self {
        Self {
            catalogued_kg: Decimal::ZERO,
            sold_kg: Decimal::ZERO,
            unsold_kg: Decimal::ZERO,
            outsold_kg: Decimal::ZERO,
            sold_side_kg: Decimal::ZERO,
            sold_pct: Decimal::ZERO,
            unsold_pct: Decimal::ZERO,
            outsold_pct: Decimal::ZERO,
            avg_price: None,
            total_value: Decimal::ZERO,
            lot_count: 0,
            sold_lot_count: 0,
        }
    }
}

impl Default for MetricSet {
    fn default() -> Self {
        Self::new()
    }
}
