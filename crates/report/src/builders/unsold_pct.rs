use crate::builders::{
    nest_entity_elevation_grade, BuildContext, SectionBuilder, BROKER_ELEV, BROKER_ELEV_GRADE,
};
use crate::error::ReportError;
use crate::format::{format_pct, format_qty, truncate_label};
use crate::section::{PageBreakPolicy, ReportSection, SectionBlock, SectionId};
use crate::table::{HighlightRule, ReportTable, SeverityBands, TableRow};

/// Report 2: each broker's grade-wise unsold percentages by sub-elevation.
pub struct UnsoldPct;

impl SectionBuilder for UnsoldPct {
    fn id(&self) -> SectionId {
        SectionId::UnsoldPct
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<ReportSection, ReportError> {
        let fine = ctx.aggregate(ctx.slice, &BROKER_ELEV_GRADE)?;
        let mid = ctx.aggregate(ctx.slice, &BROKER_ELEV)?;
        // Unsold is adverse: a small percentage is the favorable band.
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
                            format_pct(elevation.rollup.unsold_pct),
                        ],
                        Some(elevation.rollup.unsold_pct),
                        elevation.name.clone(),
                    )
                })
                .collect();
            tables.push(ReportTable {
                title: None,
                columns: vec![
                    "Sub Elevation".to_string(),
                    "Catalogued (kg)".to_string(),
                    "Unsold %".to_string(),
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
                                format_qty(grade.metrics.unsold_kg),
                                format_pct(grade.metrics.unsold_pct),
                            ],
                            Some(grade.metrics.unsold_pct),
                            grade.name.clone(),
                        )
                    })
                    .collect();
                tables.push(ReportTable {
                    title: Some(format!("Sub Elevation: {}", elevation.name)),
                    columns: vec![
                        "Grade".to_string(),
                        "Catalogued (kg)".to_string(),
                        "Unsold (kg)".to_string(),
                        "Unsold %".to_string(),
                    ],
                    rows,
                    highlight: Some(HighlightRule::Band { column: 3, bands }),
                });
            }

            blocks.push(SectionBlock::new(format!("BROKER: {}", entity.name), tables));
        }

        Ok(ReportSection::new(
            SectionId::UnsoldPct,
            "REPORT 2: BROKER GRADE-WISE UNSOLD PERCENTAGES (BY SUB ELEVATION)",
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
    fn unsold_percentages_use_the_adverse_scale() {
        let section = build_with(&rich_fixture(), &UnsoldPct);
        let mpb = &section.blocks[1];
        let summary = &mpb.tables[0];
        // LOW GROWN: 50 of 350 unsold -> 14.29%.
        let low = summary.rows.iter().find(|r| r.key == "LOW GROWN").unwrap();
        assert_eq!(low.cells[2], "14.29%");
        assert_eq!(
            summary.row_severity(low),
            Some(crate::table::Severity::High)
        );
    }
}
