use core_types::{Column, Dimension};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("No aggregation dimensions were requested; pick at least one")]
    NoDimensions,

    #[error(
        "Cannot group by {dimension:?}: column '{column}' is not part of this dataset. \
         Check the headers of the loaded sale files."
    )]
    MissingColumn { dimension: Dimension, column: Column },
}
