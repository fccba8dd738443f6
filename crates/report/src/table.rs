use configuration::Thresholds;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Performance band for a highlighted metric value. `High` is the favorable
/// band (green in a styled renderer), `Low` the adverse one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// Maps a metric value to a severity band via the two thresholds.
///
/// For favorable metrics (sold %) a high value is the `High` band; for
/// adverse metrics (unsold %, outsold %) the scale inverts, so a small
/// adverse percentage still lands in the favorable band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityBands {
    pub high: Decimal,
    pub medium: Decimal,
    pub higher_is_better: bool,
}

impl SeverityBands {
    pub fn favorable(thresholds: Thresholds) -> Self {
        Self {
            high: thresholds.high,
            medium: thresholds.medium,
            higher_is_better: true,
        }
    }

    pub fn adverse(thresholds: Thresholds) -> Self {
        Self {
            high: thresholds.high,
            medium: thresholds.medium,
            higher_is_better: false,
        }
    }

    pub fn classify(&self, value: Decimal) -> Severity {
        if self.higher_is_better {
            if value >= self.high {
                Severity::High
            } else if value >= self.medium {
                Severity::Medium
            } else {
                Severity::Low
            }
        } else if value <= Decimal::ONE_HUNDRED - self.high {
            Severity::High
        } else if value <= self.medium {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// Conditional styling attached to a table: either band one column's metric
/// by thresholds, or emphasize the row belonging to a distinguished entity
/// (the top market-share broker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HighlightRule {
    Band { column: usize, bands: SeverityBands },
    TopEntity { label: String },
}

/// One formatted table row, carrying the raw metric behind the banded column
/// and the untruncated key of its leading entity so highlight rules stay
/// evaluable after formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<String>,
    pub band_value: Option<Decimal>,
    pub key: String,
}

impl TableRow {
    pub fn new(cells: Vec<String>, band_value: Option<Decimal>, key: impl Into<String>) -> Self {
        Self {
            cells,
            band_value,
            key: key.into(),
        }
    }
}

/// A titled, ordered grid of formatted cells plus an optional highlight rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub title: Option<String>,
    /// Header cells; empty for headerless key/value tables.
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
    pub highlight: Option<HighlightRule>,
}

impl ReportTable {
    /// Severity of a row under this table's banding rule, if it has one.
    pub fn row_severity(&self, row: &TableRow) -> Option<Severity> {
        match &self.highlight {
            Some(HighlightRule::Band { bands, .. }) => {
                row.band_value.map(|value| bands.classify(value))
            }
            _ => None,
        }
    }

    /// Whether a row belongs to the distinguished entity of a `TopEntity`
    /// rule.
    pub fn is_top_entity(&self, row: &TableRow) -> bool {
        matches!(
            &self.highlight,
            Some(HighlightRule::TopEntity { label }) if *label == row.key
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn favorable_bands_reward_high_values() {
        let bands = SeverityBands::favorable(Thresholds::default());
        assert_eq!(bands.classify(dec!(85)), Severity::High);
        assert_eq!(bands.classify(dec!(70)), Severity::High);
        assert_eq!(bands.classify(dec!(55)), Severity::Medium);
        assert_eq!(bands.classify(dec!(10)), Severity::Low);
    }

    #[test]
    fn adverse_bands_reward_low_values() {
        let bands = SeverityBands::adverse(Thresholds::default());
        assert_eq!(bands.classify(dec!(10)), Severity::High);
        assert_eq!(bands.classify(dec!(30)), Severity::High);
        assert_eq!(bands.classify(dec!(45)), Severity::Medium);
        assert_eq!(bands.classify(dec!(80)), Severity::Low);
    }

    #[test]
    fn top_entity_rule_matches_the_untruncated_key() {
        let table = ReportTable {
            title: None,
            columns: vec!["Broker".to_string()],
            rows: vec![
                TableRow::new(vec!["MPB (MPB)".to_string()], None, "MPB"),
                TableRow::new(vec!["FW".to_string()], None, "FW"),
            ],
            highlight: Some(HighlightRule::TopEntity {
                label: "MPB".to_string(),
            }),
        };
        assert!(table.is_top_entity(&table.rows[0]));
        assert!(!table.is_top_entity(&table.rows[1]));
    }
}
