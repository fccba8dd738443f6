use crate::error::ConfigError;
use core_types::DataScope;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub company: CompanySettings,
    pub data: DataSettings,
    pub report: ReportSettings,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report.thresholds.medium > self.report.thresholds.high {
            return Err(ConfigError::ValidationError(format!(
                "report.thresholds: medium ({}) must not exceed high ({})",
                self.report.thresholds.medium, self.report.thresholds.high
            )));
        }
        if self.data.folder.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "data.folder must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Company identity shown on the title page and page footers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompanySettings {
    pub name: String,
    /// Short label stamped in the left footer slot of every page.
    pub footer_label: String,
}

impl Default for CompanySettings {
    fn default() -> Self {
        Self {
            name: "Mercantile Produce Brokers Pvt Ltd".to_string(),
            footer_label: "MPBL IT".to_string(),
        }
    }
}

/// Where sale files live and which portion of the history reports run over.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Folder scanned for `Sale_<n>.csv` catalogue files.
    pub folder: String,
    pub scope: DataScope,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            folder: "sales_data".to_string(),
            scope: DataScope::CurrentSale,
        }
    }
}

/// Contains parameters for report composition.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub sections: ReportSelection,
    /// Explicit broker to mark as market leader. Left unset, the broker with
    /// the highest total value takes the mark.
    pub highlight_broker: Option<String>,
    pub thresholds: Thresholds,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            sections: ReportSelection::default(),
            highlight_broker: None,
            thresholds: Thresholds::default(),
        }
    }
}

/// Which sections go into the document. Composing with every flag off is a
/// recoverable user error the composer rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSelection {
    pub report1_sold_pct: bool,
    pub report2_unsold_pct: bool,
    pub report3_outsold_pct: bool,
    pub report4_sold_qty_price: bool,
    pub report5_buyer_profiles: bool,
    pub summary_market: bool,
    pub summary_broker_perf: bool,
}

impl Default for ReportSelection {
    /// The five detail reports, no summaries — the standard print run.
    fn default() -> Self {
        Self {
            report1_sold_pct: true,
            report2_unsold_pct: true,
            report3_outsold_pct: true,
            report4_sold_qty_price: true,
            report5_buyer_profiles: true,
            summary_market: false,
            summary_broker_perf: false,
        }
    }
}

impl ReportSelection {
    pub fn all() -> Self {
        Self {
            report1_sold_pct: true,
            report2_unsold_pct: true,
            report3_outsold_pct: true,
            report4_sold_qty_price: true,
            report5_buyer_profiles: true,
            summary_market: true,
            summary_broker_perf: true,
        }
    }

    pub fn none() -> Self {
        Self {
            report1_sold_pct: false,
            report2_unsold_pct: false,
            report3_outsold_pct: false,
            report4_sold_qty_price: false,
            report5_buyer_profiles: false,
            summary_market: false,
            summary_broker_perf: false,
        }
    }

    pub fn any(&self) -> bool {
        self.count() > 0
    }

    pub fn count(&self) -> usize {
        [
            self.report1_sold_pct,
            self.report2_unsold_pct,
            self.report3_outsold_pct,
            self.report4_sold_qty_price,
            self.report5_buyer_profiles,
            self.summary_market,
            self.summary_broker_perf,
        ]
        .iter()
        .filter(|flag| **flag)
        .count()
    }
}

/// The two percentage cut points used for severity banding in report tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub high: Decimal,
    pub medium: Decimal,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high: dec!(70),
            medium: dec!(50),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Result<Config, crate::error::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        let config = builder.try_deserialize::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn empty_config_falls_back_to_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.company.footer_label, "MPBL IT");
        assert_eq!(config.data.folder, "sales_data");
        assert_eq!(config.data.scope, DataScope::CurrentSale);
        assert!(config.report.sections.report1_sold_pct);
        assert!(!config.report.sections.summary_market);
        assert_eq!(config.report.thresholds.high, dec!(70));
    }

    #[test]
    fn partial_config_overrides_selected_fields() {
        let config = parse(
            r#"
            [data]
            folder = "archive"
            scope = { last_n_sales = 3 }

            [report]
            highlight_broker = "FW"

            [report.sections]
            report2_unsold_pct = false
            summary_market = true
            "#,
        )
        .unwrap();
        assert_eq!(config.data.folder, "archive");
        assert_eq!(config.data.scope, DataScope::LastNSales(3));
        assert!(!config.report.sections.report2_unsold_pct);
        assert!(config.report.sections.summary_market);
        assert_eq!(config.report.highlight_broker.as_deref(), Some("FW"));
    }

    #[test]
    fn inverted_thresholds_fail_validation() {
        let err = parse(
            r#"
            [report.thresholds]
            high = 40
            medium = 60
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, crate::error::ConfigError::ValidationError(_)));
    }

    #[test]
    fn selection_counting() {
        assert_eq!(ReportSelection::all().count(), 7);
        assert_eq!(ReportSelection::none().count(), 0);
        assert!(!ReportSelection::none().any());
        assert_eq!(ReportSelection::default().count(), 5);
    }
}
