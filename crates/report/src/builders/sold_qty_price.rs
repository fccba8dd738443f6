use crate::builders::{
    nest_entity_elevation_grade, BuildContext, ElevationBuckets, SectionBuilder, BROKER_ELEV,
    BROKER_ELEV_GRADE,
};
use crate::error::ReportError;
use crate::format::{format_opt_price, format_qty, truncate_label};
use crate::section::{PageBreakPolicy, ReportSection, SectionBlock, SectionId};
use crate::table::{ReportTable, TableRow};
use rust_decimal::Decimal;

/// Report 4: each broker's grade-wise sold quantities and average prices by
/// sub-elevation. Grades that moved nothing are left out of the detail
/// tables.
pub struct SoldQtyPrice;

impl SectionBuilder for SoldQtyPrice {
    fn id(&self) -> SectionId {
        SectionId::SoldQtyPrice
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<ReportSection, ReportError> {
        let fine = ctx.aggregate(ctx.slice, &BROKER_ELEV_GRADE)?;
        let mid = ctx.aggregate(ctx.slice, &BROKER_ELEV)?;

        let mut blocks = Vec::new();
        for entity in nest_entity_elevation_grade(&fine, &mid) {
            let mut tables = Vec::new();

            let summary_rows = entity
                .elevations
                .iter()
                .map(|elevation| {
                    TableRow::new(
                        vec![
                            elevation.name.clone(),
                            format_qty(elevation.rollup.sold_side_kg),
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
                    "Total Sold+Outsold (kg)".to_string(),
                    "Avg Price (LKR)".to_string(),
                ],
                rows: summary_rows,
                highlight: None,
            });

            for elevation in &entity.elevations {
                // Only grades with sold-side movement, largest movers first.
                let mut grades: Vec<_> = elevation
                    .grades
                    .iter()
                    .filter(|g| g.metrics.sold_side_kg > Decimal::ZERO)
                    .collect();
                grades.sort_by(|a, b| {
                    b.metrics
                        .sold_side_kg
                        .cmp(&a.metrics.sold_side_kg)
                        .then_with(|| a.name.cmp(&b.name))
                });
                if grades.is_empty() {
                    continue;
                }

                let rows = grades
                    .into_iter()
                    .map(|grade| {
                        TableRow::new(
                            vec![
                                truncate_label(&grade.name),
                                format_qty(grade.metrics.sold_kg),
                                format_qty(grade.metrics.outsold_kg),
                                format_qty(grade.metrics.sold_side_kg),
                                format_opt_price(grade.metrics.avg_price),
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
                        "Sold (kg)".to_string(),
                        "Outsold (kg)".to_string(),
                        "Total Sold+Outsold (kg)".to_string(),
                        "Avg Price (LKR)".to_string(),
                    ],
                    rows,
                    highlight: None,
                });
            }

            blocks.push(SectionBlock::new(format!("BROKER: {}", entity.name), tables));
        }

        Ok(ReportSection::new(
            SectionId::SoldQtyPrice,
            "REPORT 4: BROKER GRADE-WISE SOLD QUANTITIES & AVG PRICES (BY SUB ELEVATION)",
            blocks,
            PageBreakPolicy {
                break_before: false,
                break_after: true,
                break_between_blocks: true,
            },
        ))
    }
}

/// The elevation-level average price is the mean of the per-grade average
/// prices that exist, not a re-weighted mean over lots.
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
    use crate::builders::testutil::{build_with, dataset_from, rich_fixture};

    #[test]
    fn detail_rows_skip_grades_without_sold_side_movement() {
        let data = dataset_from(&[
            ["MPB", "A", "BP1", "LOW GROWN", "100", "500", "sold"],
            ["MPB", "", "BOPF", "LOW GROWN", "70", "", "unsold"],
        ]);
        let section = build_with(&data, &SoldQtyPrice);
        let detail = &section.blocks[0].tables[1];
        let grades: Vec<&str> = detail.rows.iter().map(|r| r.cells[0].as_str()).collect();
        assert_eq!(grades, ["BP1"]);
    }

    #[test]
    fn priceless_buckets_render_na_not_zero() {
        let data = dataset_from(&[["MPB", "", "DUST", "HIGH GROWN", "80", "", "outsold"]]);
        let section = build_with(&data, &SoldQtyPrice);
        let block = &section.blocks[0];
        // Summary row: 80kg moved, but no sold lot ever carried a price.
        assert_eq!(block.tables[0].rows[0].cells[2], "N/A");
        // Detail row for the outsold grade also shows N/A.
        assert_eq!(block.tables[1].rows[0].cells[4], "N/A");
    }

    #[test]
    fn detail_rows_sort_by_sold_side_descending() {
        let section = build_with(&rich_fixture(), &SoldQtyPrice);
        let mpb = &section.blocks[1];
        let low_grown = mpb
            .tables
            .iter()
            .find(|t| t.title.as_deref() == Some("Sub Elevation: LOW GROWN"))
            .unwrap();
        let grades: Vec<&str> = low_grown.rows.iter().map(|r| r.cells[0].as_str()).collect();
        // BOPF moved 200kg, BP1 100kg.
        assert_eq!(grades, ["BOPF", "BP1"]);
    }

    #[test]
    fn summary_price_is_the_mean_of_grade_averages() {
        let data = dataset_from(&[
            ["MPB", "A", "BP1", "LOW GROWN", "10", "400", "sold"],
            ["MPB", "B", "BOPF", "LOW GROWN", "10", "600", "sold"],
        ]);
        let section = build_with(&data, &SoldQtyPrice);
        assert_eq!(section.blocks[0].tables[0].rows[0].cells[2], "500.00");
    }
}
