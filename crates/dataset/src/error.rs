use core_types::Column;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error(
        "Sale {sale_no}: required column '{column}' is missing from the catalogue file. \
         Check the header row of the file for that sale."
    )]
    MissingColumn { column: Column, sale_no: u32 },
}
