use crate::builders::{
    nest_entity_elevation_grade, BuildContext, ElevationBuckets, SectionBuilder, BUYER_ELEV,
    BUYER_ELEV_GRADE,
};
use crate::error::ReportError;
use crate::format::{format_count, format_opt_price, format_qty, truncate_label};
use crate::section::{PageBreakPolicy, ReportSection, SectionBlock, SectionId};
use crate::table::{ReportTable, TableRow};
use analytics::AggregationKey;
use core_types::{Dimension, LotStatus};
use rust_decimal::Decimal;

/// Report 5: buyer purchase profiles, grade-wise by sub-elevation, over sold
/// lots only. Buyers are ranked by total purchase value, biggest first.
pub struct BuyerProfiles;

impl SectionBuilder for BuyerProfiles {
    fn id(&self) -> SectionId {
        SectionId::BuyerProfiles
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<ReportSection, ReportError> {
        let breaks = PageBreakPolicy {
            break_before: false,
            // No break after the final buyer; the composer separates sections.
            break_after: false,
            break_between_blocks: true,
        };

        let sold = ctx.slice.filter_status(LotStatus::Sold);
        if sold.is_empty() {
            let mut section = ReportSection::new(
                SectionId::BuyerProfiles,
                HEADING,
                Vec::new(),
                breaks,
            );
            section.empty_note = Some("No sold lots available for buyer analysis.".to_string());
            return Ok(section);
        }

        let fine = ctx.aggregate(&sold, &BUYER_ELEV_GRADE)?;
        let mid = ctx.aggregate(&sold, &BUYER_ELEV)?;
        let totals = ctx.aggregate(&sold, &[Dimension::Buyer])?;

        let mut entities = nest_entity_elevation_grade(&fine, &mid);
        let purchase_value = |name: &str| -> Decimal {
            totals
                .get(&AggregationKey::new(vec![name.to_string()]))
                .map(|m| m.total_value)
                .unwrap_or(Decimal::ZERO)
        };
        entities.sort_by(|a, b| {
            purchase_value(&b.name)
                .cmp(&purchase_value(&a.name))
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut blocks = Vec::new();
        for entity in &entities {
            let mut tables = Vec::new();

            let summary_rows = entity
                .elevations
                .iter()
                .map(|elevation| {
                    TableRow::new(
                        vec![
                            elevation.name.clone(),
                            format_qty(elevation.rollup.catalogued_kg),
                            format_qty(elevation.rollup.total_value),
                            format_opt_price(mean_grade_price(elevation)),
                        ],
                        None,
                        elevation.name.clone(),
                    )
                })
                .collect();
            tables.push(ReportTable {
                title: None,
                columns: vec![
                    "Sub Elevation".to_string(),
                    "Quantity (kg)".to_string(),
                    "Total Value (LKR)".to_string(),
                    "Avg Price (LKR)".to_string(),
                ],
                rows: summary_rows,
                highlight: None,
            });

            for elevation in &entity.elevations {
                let rows = elevation
                    .grades
                    .iter()
                    .map(|grade| {
                        TableRow::new(
                            vec![
                                truncate_label(&grade.name),
                                format_qty(grade.metrics.catalogued_kg),
                                format_qty(grade.metrics.total_value),
                                format_opt_price(grade.metrics.avg_price),
                                format_count(grade.metrics.lot_count),
                            ],
                            None,
                            grade.name.clone(),
                        )
                    })
                    .collect();
                tables.push(ReportTable {
                    title: Some(format!("Sub Elevation: {}", elevation.name)),
                    columns: vec![
                        "Grade".to_string(),
                        "Quantity (kg)".to_string(),
                        "Total Value (LKR)".to_string(),
                        "Avg Price (LKR)".to_string(),
                        "No. of Lots".to_string(),
                    ],
                    rows,
                    highlight: None,
                });
            }

            blocks.push(SectionBlock::new(format!("BUYER: {}", entity.name), tables));
        }

        Ok(ReportSection::new(
            SectionId::BuyerProfiles,
            HEADING,
            blocks,
            breaks,
        ))
    }
}

const HEADING: &str = "REPORT 5: OUTLOTS PURCHASED BUYER PROFILES (GRADE WISE BY SUB ELEVATION)";

/// Mean of the per-grade average prices that exist within an elevation.
fn mean_grade_price(elevation: &ElevationBuckets) -> Option<Decimal> {
    let prices: Vec<Decimal> = elevation
        .grades
        .iter()
        .filter_map(|g| g.metrics.avg_price)
        .collect();
    if prices.is_empty() {
        return None;
    }
    let sum: Decimal = prices.iter().sum();
    Some(sum / Decimal::from(prices.len() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::testutil::{build_with, dataset_from};

    #[test]
    fn buyers_rank_by_purchase_value_descending() {
        let data = dataset_from(&[
            ["MPB", "SMALLCO", "BP1", "L", "10", "100", "sold"],
            ["MPB", "BIGCO", "BP1", "L", "10", "900", "sold"],
            ["FW", "MIDCO", "BOPF", "L", "10", "400", "sold"],
        ]);
        let section = build_with(&data, &BuyerProfiles);
        let buyers: Vec<&str> = section.blocks.iter().map(|b| b.heading.as_str()).collect();
        assert_eq!(buyers, ["BUYER: BIGCO", "BUYER: MIDCO", "BUYER: SMALLCO"]);
        assert!(section.breaks.break_between_blocks);
        assert!(!section.breaks.break_after);
    }

    #[test]
    fn detail_rows_carry_quantity_value_price_and_lots() {
        let data = dataset_from(&[
            ["MPB", "BIGCO", "BP1", "L", "10", "500", "sold"],
            ["MPB", "BIGCO", "BP1", "L", "30", "700", "sold"],
        ]);
        let section = build_with(&data, &BuyerProfiles);
        let detail = &section.blocks[0].tables[1];
        // 40kg, 10*500 + 30*700 = 26,000 value, mean price 600, 2 lots.
        assert_eq!(detail.rows[0].cells, ["BP1", "40", "26,000", "600.00", "2"]);
    }

    #[test]
    fn only_sold_lots_contribute() {
        let data = dataset_from(&[
            ["MPB", "BIGCO", "BP1", "L", "10", "500", "sold"],
            ["MPB", "GHOSTCO", "BP1", "L", "99", "", "unsold"],
        ]);
        let section = build_with(&data, &BuyerProfiles);
        assert_eq!(section.blocks.len(), 1);
        assert_eq!(section.blocks[0].heading, "BUYER: BIGCO");
    }

    #[test]
    fn no_sold_lots_yields_the_empty_note() {
        let data = dataset_from(&[["MPB", "", "BP1", "L", "10", "", "unsold"]]);
        let section = build_with(&data, &BuyerProfiles);
        assert!(section.blocks.is_empty());
        assert_eq!(
            section.empty_note.as_deref(),
            Some("No sold lots available for buyer analysis.")
        );
    }
}
