use crate::builders::{BuildContext, SectionBuilder};
use crate::error::ReportError;
use crate::format::{format_opt_price, format_pct, format_qty};
use crate::section::{PageBreakPolicy, ReportSection, SectionBlock, SectionId};
use crate::table::{HighlightRule, ReportTable, TableRow};
use core_types::Dimension;
use rust_decimal::Decimal;

/// Summary report: overall market performance, plus the broker league table
/// with the market leader marked.
pub struct MarketSummary;

impl SectionBuilder for MarketSummary {
    fn id(&self) -> SectionId {
        SectionId::MarketSummary
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<ReportSection, ReportError> {
        let overall = ctx.engine.summarize(ctx.slice);

        let metric_rows = [
            ("Total Catalogued (kg)", format_qty(overall.catalogued_kg)),
            ("Total Sold (kg)", format_qty(overall.sold_kg)),
            ("Total Outsold (kg)", format_qty(overall.outsold_kg)),
            ("Total Sold+Outsold (kg)", format_qty(overall.sold_side_kg)),
            ("Total Unsold (kg)", format_qty(overall.unsold_kg)),
            ("Sold %", format_pct(overall.sold_pct)),
            ("Unsold %", format_pct(overall.unsold_pct)),
            ("Outsold %", format_pct(overall.outsold_pct)),
            ("Total Value (LKR)", format_qty(overall.total_value)),
            ("Average Price (LKR)", format_opt_price(overall.avg_price)),
        ];
        let overall_table = ReportTable {
            title: None,
            columns: vec!["Metric".to_string(), "Value".to_string()],
            rows: metric_rows
                .into_iter()
                .map(|(metric, value)| {
                    TableRow::new(vec![metric.to_string(), value], None, metric)
                })
                .collect(),
            highlight: None,
        };

        // Broker league table, biggest share of value first.
        let by_broker = ctx.aggregate(ctx.slice, &[Dimension::Broker])?;
        let mut brokers: Vec<_> = by_broker.iter().collect();
        brokers.sort_by(|a, b| {
            b.1.total_value
                .cmp(&a.1.total_value)
                .then_with(|| a.0.cmp(b.0))
        });

        let share = |value: Decimal| -> Decimal {
            if overall.total_value > Decimal::ZERO {
                value / overall.total_value * Decimal::ONE_HUNDRED
            } else {
                Decimal::ZERO
            }
        };

        let broker_rows = brokers
            .into_iter()
            .map(|(key, metrics)| {
                let name = key.value(0);
                let is_leader = ctx.top_broker.as_deref() == Some(name);
                let label = if is_leader {
                    format!("{name} (MPB)")
                } else {
                    name.to_string()
                };
                TableRow::new(
                    vec![
                        label,
                        format_qty(metrics.catalogued_kg),
                        format_pct(metrics.sold_pct),
                        format_pct(share(metrics.total_value)),
                        format_qty(metrics.total_value),
                    ],
                    None,
                    name,
                )
            })
            .collect();
        let broker_table = ReportTable {
            title: None,
            columns: vec![
                "Broker".to_string(),
                "Catalogued (kg)".to_string(),
                "Sold %".to_string(),
                "Market Share %".to_string(),
                "Total Value (LKR)".to_string(),
            ],
            rows: broker_rows,
            highlight: ctx
                .top_broker
                .clone()
                .map(|label| HighlightRule::TopEntity { label }),
        };

        let blocks = vec![
            SectionBlock::new("OVERALL MARKET STATISTICS", vec![overall_table]),
            SectionBlock::new("BROKER PERFORMANCE SUMMARY", vec![broker_table]),
        ];

        Ok(ReportSection::new(
            SectionId::MarketSummary,
            "SUMMARY REPORT: OVERALL MARKET PERFORMANCE",
            blocks,
            PageBreakPolicy {
                break_before: false,
                break_after: true,
                break_between_blocks: false,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::testutil::{build_with, three_broker_fixture};

    #[test]
    fn marks_exactly_the_top_value_broker() {
        let section = build_with(&three_broker_fixture(), &MarketSummary);
        let league = &section.blocks[1].tables[0];
        assert_eq!(league.rows[0].cells[0], "X (MPB)");
        assert!(league.is_top_entity(&league.rows[0]));
        assert!(!league.is_top_entity(&league.rows[1]));
        assert!(!league.is_top_entity(&league.rows[2]));
    }

    #[test]
    fn market_share_is_value_share_and_sums_to_one_hundred() {
        let section = build_with(&three_broker_fixture(), &MarketSummary);
        let league = &section.blocks[1].tables[0];
        let shares: Vec<&str> = league.rows.iter().map(|r| r.cells[3].as_str()).collect();
        assert_eq!(shares, ["50.00%", "33.33%", "16.67%"]);
    }

    #[test]
    fn overall_table_reports_the_whole_slice() {
        let section = build_with(&three_broker_fixture(), &MarketSummary);
        let overall = &section.blocks[0].tables[0];
        let value_of = |metric: &str| -> &str {
            overall
                .rows
                .iter()
                .find(|r| r.cells[0] == metric)
                .map(|r| r.cells[1].as_str())
                .unwrap()
        };
        assert_eq!(value_of("Total Catalogued (kg)"), "3");
        assert_eq!(value_of("Total Value (LKR)"), "600");
        assert_eq!(value_of("Sold %"), "100.00%");
        assert_eq!(value_of("Average Price (LKR)"), "200.00");
    }
}
