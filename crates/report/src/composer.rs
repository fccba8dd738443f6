use crate::builders::{selected_builders, top_share_broker, BuildContext};
use crate::document::{FooterTemplate, ReportDocument, TitleInfo};
use crate::error::ReportError;
use analytics::{AggregationCache, AggregationEngine};
use chrono::{DateTime, Utc};
use configuration::{ReportSelection, Thresholds};
use dataset::DatasetSlice;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Cooperative cancellation checked between section builds, so a host UI can
/// abandon a long generation without waiting for the whole document.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One composition request: the slice reports run over, the sale range of
/// the full dataset for the title page, and the user's choices.
pub struct ComposeRequest<'a> {
    pub slice: &'a DatasetSlice<'a>,
    /// Lowest and highest sale number loaded, for the "Data Period" line.
    pub period: Option<(u32, u32)>,
    pub selection: ReportSelection,
    /// Explicit broker to mark as market leader; derived from total value
    /// when absent.
    pub highlight_broker: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// Assembles selected sections into a `ReportDocument` in canonical order,
/// with the title block first and page-break requests attached per section.
pub struct DocumentComposer {
    company: String,
    footer_label: String,
    thresholds: Thresholds,
}

impl DocumentComposer {
    pub fn new(
        company: impl Into<String>,
        footer_label: impl Into<String>,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            company: company.into(),
            footer_label: footer_label.into(),
            thresholds,
        }
    }

    pub fn compose(
        &self,
        engine: &AggregationEngine,
        cache: &AggregationCache,
        request: &ComposeRequest<'_>,
        cancel: &CancelFlag,
    ) -> Result<ReportDocument, ReportError> {
        if !request.selection.any() {
            return Err(ReportError::EmptySelection);
        }

        let top_broker = match &request.highlight_broker {
            Some(broker) => Some(broker.clone()),
            None => top_share_broker(engine, cache, request.slice)?,
        };
        let ctx = BuildContext {
            slice: request.slice,
            engine,
            cache,
            thresholds: self.thresholds,
            top_broker,
        };

        let mut sections = Vec::new();
        for builder in selected_builders(&request.selection) {
            if cancel.is_cancelled() {
                return Err(ReportError::Cancelled);
            }
            let section = builder.build(&ctx)?;
            info!(heading = %section.heading, blocks = section.blocks.len(), "built report section");
            sections.push(section);
        }

        Ok(ReportDocument {
            title: TitleInfo {
                company: self.company.clone(),
                report_title: "MAIN AUCTION DETAILED REPORT".to_string(),
                sale_no: request.slice.sale_range().map(|(_, max)| max),
                generated_at: request.generated_at,
                period: request.period,
                section_count: sections.len(),
            },
            sections,
            footer: FooterTemplate {
                company: self.footer_label.clone(),
                generated_at: request.generated_at,
            },
        })
    }
}
