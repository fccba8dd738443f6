use analytics::AnalyticsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("No report sections selected. Choose at least one section and try again")]
    EmptySelection,

    #[error("Report generation was cancelled")]
    Cancelled,

    #[error(transparent)]
    Aggregation(#[from] AnalyticsError),

    #[error("Renderer failure: {0}")]
    Render(String),
}
