use crate::builders::{
    nest_entity_elevation_grade, BuildContext, SectionBuilder, BROKER_ELEV, BROKER_ELEV_GRADE,
};
use crate::error::ReportError;
use crate::format::{format_pct, format_qty, truncate_label};
use crate::section::{PageBreakPolicy, ReportSection, SectionBlock, SectionId};
use crate::table::{HighlightRule, ReportTable, SeverityBands, TableRow};

/// Report 1: each broker's grade-wise sold percentages by sub-elevation.
///
/// "Sold %" throughout is the sold side — sold plus outsold — over the
/// catalogued weight.
pub struct SoldPct;

impl SectionBuilder for SoldPct {
    fn id(&self) -> SectionId {
        SectionId::SoldPct
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<ReportSection, ReportError> {
        let fine = ctx.aggregate(ctx.slice, &BROKER_ELEV_GRADE)?;
        let mid = ctx.aggregate(ctx.slice, &BROKER_ELEV)?;
        let bands = SeverityBands::favorable(ctx.thresholds);

        let mut blocks = Vec::new();
        for entity in nest_entity_elevation_grade(&fine, &mid) {
            let mut tables = Vec::new();

            // Per-elevation summary across the broker's whole catalogue.
            let summary_rows = entity
                .elevations
                .iter()
                .map(|elevation| {
                    TableRow::new(
                        vec![
                            elevation.name.clone(),
                            format_qty(elevation.rollup.catalogued_kg),
                            format_pct(elevation.rollup.sold_pct),
                        ],
                        Some(elevation.rollup.sold_pct),
                        elevation.name.clone(),
                    )
                })
                .collect();
            tables.push(ReportTable {
                title: None,
                columns: vec![
                    "Sub Elevation".to_string(),
                    "Catalogued (kg)".to_string(),
                    "Sold %".to_string(),
                ],
                rows: summary_rows,
                highlight: Some(HighlightRule::Band { column: 2, bands }),
            });

            // Every grade per elevation, largest catalogue first.
            for elevation in &entity.elevations {
                let rows = elevation
                    .grades
                    .iter()
                    .map(|grade| {
                        TableRow::new(
                            vec![
                                truncate_label(&grade.name),
                                format_qty(grade.metrics.catalogued_kg),
                                format_qty(grade.metrics.sold_kg),
                                format_qty(grade.metrics.outsold_kg),
                                format_pct(grade.metrics.sold_pct),
                            ],
                            Some(grade.metrics.sold_pct),
                            grade.name.clone(),
                        )
                    })
                    .collect();
                tables.push(ReportTable {
                    title: Some(format!("Sub Elevation: {}", elevation.name)),
                    columns: vec![
                        "Grade".to_string(),
                        "Catalogued (kg)".to_string(),
                        "Sold (kg)".to_string(),
                        "Outsold (kg)".to_string(),
                        "Sold %".to_string(),
                    ],
                    rows,
                    highlight: Some(HighlightRule::Band { column: 4, bands }),
                });
            }

            blocks.push(SectionBlock::new(format!("BROKER: {}", entity.name), tables));
        }

        Ok(ReportSection::new(
            SectionId::SoldPct,
            "REPORT 1: BROKER GRADE-WISE SOLD PERCENTAGES (BY SUB ELEVATION)",
            blocks,
            PageBreakPolicy {
                break_before: false,
                break_after: true,
                break_between_blocks: true,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::testutil::{build_with, rich_fixture};

    #[test]
    fn one_block_per_broker_in_alphabetical_order() {
        let section = build_with(&rich_fixture(), &SoldPct);
        let headings: Vec<&str> = section.blocks.iter().map(|b| b.heading.as_str()).collect();
        assert_eq!(headings, ["BROKER: FW", "BROKER: MPB"]);
        assert!(section.breaks.break_between_blocks);
    }

    #[test]
    fn summary_table_rolls_up_each_elevation() {
        let section = build_with(&rich_fixture(), &SoldPct);
        let mpb = &section.blocks[1];
        let summary = &mpb.tables[0];
        assert_eq!(
            summary.columns,
            ["Sub Elevation", "Catalogued (kg)", "Sold %"]
        );
        // HIGH GROWN: 80 outsold of 80 -> 100%. LOW GROWN: 300 sold of 350.
        let high = &summary.rows[0];
        assert_eq!(high.cells, ["HIGH GROWN", "80", "100.00%"]);
        let low = &summary.rows[1];
        assert_eq!(low.cells[0], "LOW GROWN");
        assert_eq!(low.cells[1], "350");
        assert_eq!(low.cells[2], "85.71%");
    }

    #[test]
    fn grades_sort_by_descending_catalogued_weight() {
        let section = build_with(&rich_fixture(), &SoldPct);
        let mpb = &section.blocks[1];
        // Tables: summary, HIGH GROWN, LOW GROWN.
        let low_grown = &mpb.tables[2];
        assert_eq!(low_grown.title.as_deref(), Some("Sub Elevation: LOW GROWN"));
        let grades: Vec<&str> = low_grown.rows.iter().map(|r| r.cells[0].as_str()).collect();
        // BOPF has 200kg catalogued, BP1 150kg.
        assert_eq!(grades, ["BOPF", "BP1"]);
    }
}
