//! Report section builders.
//!
//! Each module implements one report section behind the `SectionBuilder`
//! trait; `selected_builders` is the factory mapping a selection to builder
//! instances in canonical order. Builders are pure: they read aggregates
//! through the cache and emit `ReportSection` values.

pub mod broker_comparison;
pub mod buyer_profiles;
pub mod market_summary;
pub mod outsold_pct;
pub mod sold_pct;
pub mod sold_qty_price;
pub mod unsold_pct;

pub use broker_comparison::BrokerComparison;
pub use buyer_profiles::BuyerProfiles;
pub use market_summary::MarketSummary;
pub use outsold_pct::OutsoldPct;
pub use sold_pct::SoldPct;
pub use sold_qty_price::SoldQtyPrice;
pub use unsold_pct::UnsoldPct;

use crate::error::ReportError;
use crate::section::{ReportSection, SectionId};
use analytics::{Aggregate, AggregationCache, AggregationEngine, AggregationKey, MetricSet};
use configuration::{ReportSelection, Thresholds};
use core_types::Dimension;
use dataset::DatasetSlice;
use std::sync::Arc;

/// Everything a builder needs to produce its section.
pub struct BuildContext<'a> {
    pub slice: &'a DatasetSlice<'a>,
    pub engine: &'a AggregationEngine,
    pub cache: &'a AggregationCache,
    pub thresholds: Thresholds,
    /// The broker holding the highest total value in the slice, when one
    /// exists. Summary sections mark this entity.
    pub top_broker: Option<String>,
}

impl<'a> BuildContext<'a> {
    /// Cached aggregation over an arbitrary (possibly filtered) slice.
    pub fn aggregate(
        &self,
        slice: &DatasetSlice<'_>,
        dimensions: &[Dimension],
    ) -> Result<Arc<Aggregate>, ReportError> {
        Ok(self.cache.get_or_compute(self.engine, slice, dimensions)?)
    }
}

/// The core trait all report sections implement.
///
/// The composer iterates boxed builders, so it stays agnostic of section
/// internals; adding a section means a new module, a `SectionId` variant,
/// and a line in the factory.
pub trait SectionBuilder {
    fn id(&self) -> SectionId;

    /// Builds the full section for the context's dataset slice.
    fn build(&self, ctx: &BuildContext<'_>) -> Result<ReportSection, ReportError>;
}

/// Creates the builders for every selected section, in the canonical
/// document order: reports 1-5, then the two summaries.
pub fn selected_builders(selection: &ReportSelection) -> Vec<Box<dyn SectionBuilder>> {
    let mut builders: Vec<Box<dyn SectionBuilder>> = Vec::new();
    if selection.report1_sold_pct {
        builders.push(Box::new(SoldPct));
    }
    if selection.report2_unsold_pct {
        builders.push(Box::new(UnsoldPct));
    }
    if selection.report3_outsold_pct {
        builders.push(Box::new(OutsoldPct));
    }
    if selection.report4_sold_qty_price {
        builders.push(Box::new(SoldQtyPrice));
    }
    if selection.report5_buyer_profiles {
        builders.push(Box::new(BuyerProfiles));
    }
    if selection.summary_market {
        builders.push(Box::new(MarketSummary));
    }
    if selection.summary_broker_perf {
        builders.push(Box::new(BrokerComparison));
    }
    builders
}

// Dimension tuples shared by the nested reports.
pub(crate) const BROKER_ELEV_GRADE: [Dimension; 3] = [
    Dimension::Broker,
    Dimension::SubElevation,
    Dimension::Grade,
];
pub(crate) const BROKER_ELEV: [Dimension; 2] = [Dimension::Broker, Dimension::SubElevation];
pub(crate) const BUYER_ELEV_GRADE: [Dimension; 3] =
    [Dimension::Buyer, Dimension::SubElevation, Dimension::Grade];
pub(crate) const BUYER_ELEV: [Dimension; 2] = [Dimension::Buyer, Dimension::SubElevation];

/// One grade row inside an elevation group.
pub(crate) struct GradeBucket {
    pub name: String,
    pub metrics: MetricSet,
}

/// One sub-elevation group inside an entity block, with its roll-up bucket
/// taken from the coarser aggregation (so group totals are exactly the sums
/// of their grade rows).
pub(crate) struct ElevationBuckets {
    pub name: String,
    pub rollup: MetricSet,
    pub grades: Vec<GradeBucket>,
}

/// One broker's or buyer's worth of nested buckets.
pub(crate) struct EntityBuckets {
    pub name: String,
    pub elevations: Vec<ElevationBuckets>,
}

/// The broker with the single highest total value across the slice — the
/// entity summary sections mark as market leader. Ties resolve to the
/// alphabetically first broker; an empty slice has no leader.
pub fn top_share_broker(
    engine: &AggregationEngine,
    cache: &AggregationCache,
    slice: &DatasetSlice<'_>,
) -> Result<Option<String>, ReportError> {
    let by_broker = cache.get_or_compute(engine, slice, &[Dimension::Broker])?;
    let mut best: Option<(&AggregationKey, &MetricSet)> = None;
    for (key, metrics) in by_broker.iter() {
        let better = match best {
            None => true,
            Some((_, current)) => metrics.total_value > current.total_value,
        };
        if better {
            best = Some((key, metrics));
        }
    }
    Ok(best.map(|(key, _)| key.value(0).to_string()))
}

/// Regroups a `(entity, sub-elevation, grade)` aggregate into the walking
/// order reports use: entities alphabetically, elevations alphabetically
/// within an entity, grades by descending catalogued weight within an
/// elevation (name as tiebreak, so re-runs are reproducible).
pub(crate) fn nest_entity_elevation_grade(fine: &Aggregate, mid: &Aggregate) -> Vec<EntityBuckets> {
    let mut entities: Vec<EntityBuckets> = Vec::new();

    // BTreeMap iteration already groups shared key prefixes contiguously.
    for (key, metrics) in fine {
        let (entity, elevation, grade) = (key.value(0), key.value(1), key.value(2));

        if entities.last().map(|e| e.name != entity).unwrap_or(true) {
            entities.push(EntityBuckets {
                name: entity.to_string(),
                elevations: Vec::new(),
            });
        }
        let entity_buckets = entities.last_mut().expect("entity pushed above");

        if entity_buckets
            .elevations
            .last()
            .map(|e| e.name != elevation)
            .unwrap_or(true)
        {
            let rollup = mid
                .get(&AggregationKey::new(vec![
                    entity.to_string(),
                    elevation.to_string(),
                ]))
                .cloned()
                .unwrap_or_default();
            entity_buckets.elevations.push(ElevationBuckets {
                name: elevation.to_string(),
                rollup,
                grades: Vec::new(),
            });
        }
        entity_buckets
            .elevations
            .last_mut()
            .expect("elevation pushed above")
            .grades
            .push(GradeBucket {
                name: grade.to_string(),
                metrics: metrics.clone(),
            });
    }

    for entity in &mut entities {
        for elevation in &mut entity.elevations {
            elevation.grades.sort_by(|a, b| {
                b.metrics
                    .catalogued_kg
                    .cmp(&a.metrics.catalogued_kg)
                    .then_with(|| a.name.cmp(&b.name))
            });
        }
    }

    entities
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use core_types::DataScope;
    use dataset::{LotDataset, RawTable};

    const HEADERS: [&str; 7] = [
        "Broker",
        "Buyer",
        "Grade",
        "Sub Elevation",
        "Total Weight",
        "Price",
        "Status",
    ];

    pub(crate) fn dataset_from(rows: &[[&str; 7]]) -> LotDataset {
        let table = RawTable {
            headers: HEADERS.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        };
        LotDataset::from_sales(vec![(42, table)]).unwrap()
    }

    /// Two brokers over two elevations with mixed dispositions.
    pub(crate) fn rich_fixture() -> LotDataset {
        dataset_from(&[
            ["MPB", "AKBAR", "BP1", "LOW GROWN", "100", "500", "sold"],
            ["MPB", "", "BP1", "LOW GROWN", "50", "", "unsold"],
            ["MPB", "UNION", "BOPF", "LOW GROWN", "200", "450", "sold"],
            ["MPB", "", "DUST", "HIGH GROWN", "80", "", "outsold"],
            ["FW", "AKBAR", "BP1", "LOW GROWN", "60", "480", "sold"],
        ])
    }

    /// Three brokers whose total values are 300, 200 and 100.
    pub(crate) fn three_broker_fixture() -> LotDataset {
        dataset_from(&[
            ["X", "A", "BP1", "L", "1", "300", "sold"],
            ["Y", "B", "BP1", "L", "1", "200", "sold"],
            ["Z", "C", "BP1", "L", "1", "100", "sold"],
        ])
    }

    pub(crate) fn build_with(data: &LotDataset, builder: &dyn SectionBuilder) -> ReportSection {
        let slice = data.slice(DataScope::AllSales);
        let engine = AggregationEngine::new();
        let cache = AggregationCache::new();
        let top_broker = top_share_broker(&engine, &cache, &slice).unwrap();
        let ctx = BuildContext {
            slice: &slice,
            engine: &engine,
            cache: &cache,
            thresholds: Thresholds::default(),
            top_broker,
        };
        builder.build(&ctx).unwrap()
    }

    #[test]
    fn top_share_broker_picks_the_highest_value() {
        let data = three_broker_fixture();
        let slice = data.slice(DataScope::AllSales);
        let engine = AggregationEngine::new();
        let cache = AggregationCache::new();
        assert_eq!(
            top_share_broker(&engine, &cache, &slice).unwrap().as_deref(),
            Some("X")
        );
    }

    #[test]
    fn nested_rollups_sum_their_grade_rows() {
        let data = rich_fixture();
        let slice = data.slice(DataScope::AllSales);
        let engine = AggregationEngine::new();
        let fine = engine.aggregate(&slice, &BROKER_ELEV_GRADE).unwrap();
        let mid = engine.aggregate(&slice, &BROKER_ELEV).unwrap();
        for entity in nest_entity_elevation_grade(&fine, &mid) {
            for elevation in &entity.elevations {
                let summed: rust_decimal::Decimal = elevation
                    .grades
                    .iter()
                    .map(|g| g.metrics.catalogued_kg)
                    .sum();
                assert_eq!(summed, elevation.rollup.catalogued_kg);
            }
        }
    }
}
