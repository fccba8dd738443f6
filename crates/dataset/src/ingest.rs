use crate::error::DatasetError;
use crate::LotDataset;
use core_types::{Column, LotRecord, LotStatus};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use tracing::warn;

/// One raw catalogue table as read from a sale file: header row plus string
/// cells, untyped. Produced by the file loader in the binary.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    fn column_index(&self, column: Column) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim() == column.header())
    }
}

impl LotDataset {
    /// Builds the normalized dataset from one raw table per sale.
    ///
    /// Coercion rules:
    /// - a missing required column fails the whole ingestion, naming the
    ///   column and the sale it is missing from;
    /// - missing optional columns default to empty string / zero / no price;
    /// - unparsable `Total Weight` cells coerce to zero weight;
    /// - unparsable or empty `Price` cells coerce to "no price";
    /// - `Status` is normalized case-insensitively, unknown values to `other`.
    pub fn from_sales(tables: Vec<(u32, RawTable)>) -> Result<Self, DatasetError> {
        let mut records = Vec::new();
        let mut columns: Option<BTreeSet<Column>> = None;

        for (sale_no, table) in &tables {
            for column in Column::REQUIRED {
                if table.column_index(column).is_none() {
                    return Err(DatasetError::MissingColumn {
                        column,
                        sale_no: *sale_no,
                    });
                }
            }

            let present: BTreeSet<Column> = ALL_COLUMNS
                .iter()
                .copied()
                .filter(|c| *c == Column::SaleNo || table.column_index(*c).is_some())
                .collect();
            // The declared schema is the intersection across sale files: a
            // dimension is only groupable if every loaded sale carries it.
            columns = Some(match columns {
                None => present,
                Some(acc) => acc.intersection(&present).copied().collect(),
            });

            for row in &table.rows {
                records.push(coerce_row(*sale_no, table, row));
            }
        }

        Ok(LotDataset::new(records, columns.unwrap_or_default()))
    }
}

const ALL_COLUMNS: [Column; 13] = [
    Column::SaleNo,
    Column::Broker,
    Column::Buyer,
    Column::Grade,
    Column::SubElevation,
    Column::Category,
    Column::SellingMark,
    Column::TradeMark,
    Column::TotalWeight,
    Column::Price,
    Column::Status,
    Column::ValuationPrice,
    Column::AskingPrice,
];

fn coerce_row(sale_no: u32, table: &RawTable, row: &[String]) -> LotRecord {
    let cell = |column: Column| -> &str {
        table
            .column_index(column)
            .and_then(|i| row.get(i))
            .map(|s| s.trim())
            .unwrap_or("")
    };

    let total_weight = parse_decimal(cell(Column::TotalWeight)).unwrap_or_else(|| {
        warn!(
            sale_no,
            cell = cell(Column::TotalWeight),
            "unparsable Total Weight, coercing to 0"
        );
        Decimal::ZERO
    });

    let trade_mark = match cell(Column::TradeMark) {
        "" | "nan" | "NaN" | "None" => None,
        mark => Some(mark.to_string()),
    };

    LotRecord {
        sale_no,
        broker: cell(Column::Broker).to_string(),
        buyer: cell(Column::Buyer).to_string(),
        grade: cell(Column::Grade).to_string(),
        sub_elevation: cell(Column::SubElevation).to_string(),
        category: cell(Column::Category).to_string(),
        selling_mark: cell(Column::SellingMark).to_string(),
        trade_mark,
        total_weight,
        price: parse_decimal(cell(Column::Price)),
        status: LotStatus::parse(cell(Column::Status)),
        valuation_price: parse_decimal(cell(Column::ValuationPrice)).unwrap_or(Decimal::ZERO),
        asking_price: parse_decimal(cell(Column::AskingPrice)).unwrap_or(Decimal::ZERO),
    }
}

/// Parses a numeric cell, tolerating thousands separators. Empty or
/// non-numeric cells parse to `None`.
fn parse_decimal(cell: &str) -> Option<Decimal> {
    let cleaned = cell.replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<Decimal>().ok()
}
