use crate::builders::{
    nest_entity_elevation_grade, BuildContext, SectionBuilder, BROKER_ELEV, BROKER_ELEV_GRADE,
};
use crate::error::ReportError;
use crate::format::{format_pct, format_qty, truncate_label};
use crate::section::{PageBreakPolicy, ReportSection, SectionBlock, SectionId};
use crate::table::{HighlightRule, ReportTable, SeverityBands, TableRow};

/// Report 3: each broker's grade-wise outsold percentages by sub-elevation.
pub struct OutsoldPct;

impl SectionBuilder for OutsoldPct {
    fn id(&self) -> SectionId {
        SectionId::OutsoldPct
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<ReportSection, ReportError> {
        let fine = ctx.aggregate(ctx.slice, &BROKER_ELEV_GRADE)?;
        let mid = ctx.aggregate(ctx.slice, &BROKER_ELEV)?;
        let bands = SeverityBands::adverse(ctx.thresholds);

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
                            format_qty(elevation.rollup.catalogued_kg),
                            format_pct(elevation.rollup.outsold_pct),
                        ],
                        Some(elevation.rollup.outsold_pct),
                        elevation.name.clone(),
                    )
                })
                .collect();
            tables.push(ReportTable {
                title: None,
                columns: vec![
                    "Sub Elevation".to_string(),
                    "Catalogued (kg)".to_string(),
                    "Outsold %".to_string(),
                ],
                rows: summary_rows,
                highlight: Some(HighlightRule::Band { column: 2, bands }),
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
                                format_qty(grade.metrics.outsold_kg),
                                format_pct(grade.metrics.outsold_pct),
                            ],
                            Some(grade.metrics.outsold_pct),
                            grade.name.clone(),
                        )
                    })
                    .collect();
                tables.push(ReportTable {
                    title: Some(format!("Sub Elevation: {}", elevation.name)),
                    columns: vec![
                        "Grade".to_string(),
                        "Catalogued (kg)".to_string(),
                        "Outsold (kg)".to_string(),
                        "Outsold %".to_string(),
                    ],
                    rows,
                    highlight: Some(HighlightRule::Band { column: 3, bands }),
                });
            }

            blocks.push(SectionBlock::new(format!("BROKER: {}", entity.name), tables));
        }

        Ok(ReportSection::new(
            SectionId::OutsoldPct,
            "REPORT 3: BROKER GRADE-WISE OUTSOLD PERCENTAGES (BY SUB ELEVATION)",
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
    fn outsold_weight_flows_into_the_detail_rows() {
        let section = build_with(&rich_fixture(), &OutsoldPct);
        let mpb = &section.blocks[1];
        // Tables: summary, HIGH GROWN detail, LOW GROWN detail.
        let high = &mpb.tables[1];
        assert_eq!(high.title.as_deref(), Some("Sub Elevation: HIGH GROWN"));
        assert_eq!(high.rows[0].cells, ["DUST", "80", "80", "100.00%"]);
    }
}
