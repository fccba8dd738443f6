use crate::section::ReportSection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The title block rendered as the document's first page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleInfo {
    pub company: String,
    pub report_title: String,
    /// The sale the report covers; absent for an empty dataset.
    pub sale_no: Option<u32>,
    pub generated_at: DateTime<Utc>,
    /// Lowest and highest sale number loaded.
    pub period: Option<(u32, u32)>,
    pub section_count: usize,
}

impl TitleInfo {
    /// "Elevation-wise Analysis (3 reports)" — the report-type line of the
    /// title page.
    pub fn report_type_line(&self) -> String {
        let plural = if self.section_count == 1 { "" } else { "s" };
        format!(
            "Elevation-wise Analysis ({} report{plural})",
            self.section_count
        )
    }
}

/// Footer content stamped on every physical page. The page total only exists
/// after layout, so the right-hand slot is parameterized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooterTemplate {
    pub company: String,
    pub generated_at: DateTime<Utc>,
}

impl FooterTemplate {
    pub fn left(&self) -> &str {
        &self.company
    }

    pub fn center(&self) -> String {
        format!("Generated: {}", self.generated_at.format("%d %B %Y, %H:%M"))
    }

    pub fn right(&self, page: usize, page_count: usize) -> String {
        format!("Page {page} of {page_count}")
    }
}

/// The composed document: title block, ordered report sections, footer
/// template. Owned by the composer and handed to a renderer by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub title: TitleInfo,
    pub sections: Vec<ReportSection>,
    pub footer: FooterTemplate,
}
