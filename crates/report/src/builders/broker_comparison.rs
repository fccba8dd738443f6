use crate::builders::{BuildContext, SectionBuilder, BROKER_ELEV};
use crate::error::ReportError;
use crate::format::{format_pct, format_qty};
use crate::section::{PageBreakPolicy, ReportSection, SectionBlock, SectionId};
use crate::table::{ReportTable, TableRow};

/// Summary report: broker-by-broker comparison, nested by sub-elevation
/// only, with the market leader's block flagged.
pub struct BrokerComparison;

impl SectionBuilder for BrokerComparison {
    fn id(&self) -> SectionId {
        SectionId::BrokerComparison
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<ReportSection, ReportError> {
        let mid = ctx.aggregate(ctx.slice, &BROKER_ELEV)?;

        let mut blocks: Vec<SectionBlock> = Vec::new();
        let mut current_broker: Option<String> = None;
        // BTreeMap order keeps each broker's elevations contiguous and the
        // brokers alphabetical.
        for (key, metrics) in mid.iter() {
            let (broker, elevation) = (key.value(0), key.value(1));
            let is_leader = ctx.top_broker.as_deref() == Some(broker);

            if current_broker.as_deref() != Some(broker) {
                current_broker = Some(broker.to_string());
                let heading = if is_leader {
                    format!("BROKER: {broker} (MPB - Market Performance Leader)")
                } else {
                    format!("BROKER: {broker}")
                };
                let mut block = SectionBlock::new(
                    heading,
                    vec![ReportTable {
                        title: None,
                        columns: vec![
                            "Sub Elevation".to_string(),
                            "Catalogued (kg)".to_string(),
                            "Sold %".to_string(),
                            "Unsold %".to_string(),
                            "Total Value (LKR)".to_string(),
                        ],
                        rows: Vec::new(),
                        highlight: None,
                    }],
                );
                block.emphasized = is_leader;
                blocks.push(block);
            }

            let table = &mut blocks
                .last_mut()
                .expect("block pushed above")
                .tables[0];
            table.rows.push(TableRow::new(
                vec![
                    elevation.to_string(),
                    format_qty(metrics.catalogued_kg),
                    format_pct(metrics.sold_pct),
                    format_pct(metrics.unsold_pct),
                    format_qty(metrics.total_value),
                ],
                None,
                elevation,
            ));
        }

        Ok(ReportSection::new(
            SectionId::BrokerComparison,
            "SUMMARY REPORT: BROKER PERFORMANCE COMPARISON",
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
    use crate::builders::testutil::{build_with, rich_fixture, three_broker_fixture};

    #[test]
    fn leader_block_is_flagged_and_labelled() {
        let section = build_with(&three_broker_fixture(), &BrokerComparison);
        let x = section
            .blocks
            .iter()
            .find(|b| b.heading.starts_with("BROKER: X"))
            .unwrap();
        assert!(x.emphasized);
        assert_eq!(x.heading, "BROKER: X (MPB - Market Performance Leader)");
        assert!(section.blocks.iter().filter(|b| b.emphasized).count() == 1);
    }

    #[test]
    fn one_elevation_row_per_broker_elevation_pair() {
        let section = build_with(&rich_fixture(), &BrokerComparison);
        let mpb = section
            .blocks
            .iter()
            .find(|b| b.heading.starts_with("BROKER: MPB"))
            .unwrap();
        let elevations: Vec<&str> = mpb.tables[0]
            .rows
            .iter()
            .map(|r| r.cells[0].as_str())
            .collect();
        assert_eq!(elevations, ["HIGH GROWN", "LOW GROWN"]);
    }
}
