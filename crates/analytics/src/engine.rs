use crate::error::AnalyticsError;
use crate::key::AggregationKey;
use crate::metrics::MetricSet;
use core_types::{Dimension, LotRecord, LotStatus};
use dataset::DatasetSlice;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// The result of one aggregation call: one `MetricSet` per combination of
/// dimension values actually present in the slice. Absent combinations are
/// not synthesized; callers treat a missing key as an all-zero bucket.
pub type Aggregate = BTreeMap<AggregationKey, MetricSet>;

/// A stateless calculator that groups lot records by dimension tuples and
/// derives the full metric set per bucket.
#[derive(Debug, Default)]
pub struct AggregationEngine {}

impl AggregationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups `slice` by the ordered `dimensions` tuple.
    ///
    /// Fails fast when no dimensions are requested or when a requested
    /// dimension's backing column is not part of the dataset's declared
    /// schema. NaN-like input never fails: lots without a price contribute
    /// zero value and are excluded from the average price.
    pub fn aggregate(
        &self,
        slice: &DatasetSlice<'_>,
        dimensions: &[Dimension],
    ) -> Result<Aggregate, AnalyticsError> {
        if dimensions.is_empty() {
            return Err(AnalyticsError::NoDimensions);
        }
        for dimension in dimensions {
            if !slice.has_column(dimension.column()) {
                return Err(AnalyticsError::MissingColumn {
                    dimension: *dimension,
                    column: dimension.column(),
                });
            }
        }

        let mut buckets: BTreeMap<AggregationKey, Accumulator> = BTreeMap::new();
        for record in slice.records() {
            let key = AggregationKey::new(
                dimensions
                    .iter()
                    .map(|d| dimension_value(record, *d))
                    .collect(),
            );
            buckets.entry(key).or_default().add(record);
        }

        Ok(buckets
            .into_iter()
            .map(|(key, acc)| (key, acc.finish()))
            .collect())
    }

    /// Derives one metric set over the whole slice, with the same formulas
    /// and zero-safety as a grouped bucket.
    pub fn summarize(&self, slice: &DatasetSlice<'_>) -> MetricSet {
        let mut acc = Accumulator::default();
        for record in slice.records() {
            acc.add(record);
        }
        acc.finish()
    }
}

/// The dimension value a record contributes to its aggregation key.
fn dimension_value(record: &LotRecord, dimension: Dimension) -> String {
    match dimension {
        Dimension::Broker => record.broker.clone(),
        Dimension::Buyer => record.buyer.clone(),
        Dimension::Grade => record.grade.clone(),
        Dimension::SubElevation => record.sub_elevation.clone(),
        Dimension::Category => record.category.clone(),
        Dimension::SellingMark => record.selling_mark.clone(),
        Dimension::SaleNo => record.sale_no.to_string(),
    }
}

/// Running sums for one bucket. `finish` applies the derived-field formulas
/// exactly once, keeping repeated aggregations field-for-field identical.
#[derive(Debug, Default)]
struct Accumulator {
    catalogued_kg: Decimal,
    sold_kg: Decimal,
    unsold_kg: Decimal,
    outsold_kg: Decimal,
    total_value: Decimal,
    sold_price_sum: Decimal,
    priced_sold_lots: u32,
    lot_count: usize,
    sold_lot_count: usize,
}

impl Accumulator {
    fn add(&mut self, record: &LotRecord) {
        self.lot_count += 1;
        self.catalogued_kg += record.total_weight;
        match record.status {
            LotStatus::Sold => {
                self.sold_kg += record.total_weight;
                self.sold_lot_count += 1;
                if let Some(price) = record.price {
                    self.sold_price_sum += price;
                    self.priced_sold_lots += 1;
                }
            }
            LotStatus::Unsold => self.unsold_kg += record.total_weight,
            LotStatus::Outsold => self.outsold_kg += record.total_weight,
            LotStatus::Other => {}
        }
        if let Some(value) = record.total_value() {
            self.total_value += value;
        }
    }

    fn finish(self) -> MetricSet {
        let sold_side_kg = self.sold_kg + self.outsold_kg;
        let pct = |part: Decimal| -> Decimal {
            if self.catalogued_kg > Decimal::ZERO {
                part / self.catalogued_kg * Decimal::ONE_HUNDRED
            } else {
                Decimal::ZERO
            }
        };
        let avg_price = if self.priced_sold_lots > 0 {
            Some(self.sold_price_sum / Decimal::from(self.priced_sold_lots))
        } else {
            None
        };

        MetricSet {
            catalogued_kg: self.catalogued_kg,
            sold_kg: self.sold_kg,
            unsold_kg: self.unsold_kg,
            outsold_kg: self.outsold_kg,
            sold_side_kg,
            sold_pct: pct(sold_side_kg),
            unsold_pct: pct(self.unsold_kg),
            outsold_pct: pct(self.outsold_kg),
            avg_price,
            total_value: self.total_value,
            lot_count: self.lot_count,
            sold_lot_count: self.sold_lot_count,
        }
    }
}
