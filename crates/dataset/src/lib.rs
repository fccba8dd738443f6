//! # Teadesk Lot Dataset
//!
//! This crate owns the normalized in-memory collection of auction lots. It is
//! the single place where raw catalogue rows are coerced into typed
//! `LotRecord`s, and the single source of truth for which columns a loaded
//! dataset actually carries.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** No file I/O happens here. The binary reads files and
//!   hands this crate raw string tables; everything downstream sees only
//!   typed records.
//! - **Immutable After Ingestion:** A `LotDataset` is built once per load.
//!   Consumers read through borrowed `DatasetSlice` views and never mutate.
//! - **Fingerprinted Slices:** Every slice carries a content hash of its rows
//!   so aggregation results can be memoized and safely invalidated when the
//!   underlying data changes.
//!
//! ## Public API
//!
//! - `LotDataset`: the owned, normalized lot collection.
//! - `DatasetSlice`: a borrowed, fingerprinted view scoped to a sale range.
//! - `RawTable`: the raw string table handed in by the file loader.
//! - `DatasetError`: the specific error types returned from this crate.

pub mod error;
pub mod ingest;

pub use error::DatasetError;
pub use ingest::RawTable;

use core_types::{Column, DataScope, LotRecord, LotStatus};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// Content hash identifying one exact set of lot rows. Two slices with the
/// same fingerprint aggregate identically, which is what lets the aggregation
/// cache reuse results across report runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Eight hex bytes are plenty for log lines.
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// The normalized, immutable collection of every loaded lot.
#[derive(Debug, Clone, PartialEq)]
pub struct LotDataset {
    records: Vec<LotRecord>,
    /// Columns present in every ingested sale file. Aggregation validates
    /// requested dimensions against this set.
    columns: BTreeSet<Column>,
}

impl LotDataset {
    pub(crate) fn new(mut records: Vec<LotRecord>, columns: BTreeSet<Column>) -> Self {
        // Stable sort by sale number so the dataset (and its fingerprints)
        // do not depend on the order files were read from disk.
        records.sort_by_key(|r| r.sale_no);
        Self { records, columns }
    }

    pub fn records(&self) -> &[LotRecord] {
        &self.records
    }

    pub fn columns(&self) -> &BTreeSet<Column> {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Lowest and highest sale number in the dataset.
    pub fn sale_range(&self) -> Option<(u32, u32)> {
        let min = self.records.iter().map(|r| r.sale_no).min()?;
        let max = self.records.iter().map(|r| r.sale_no).max()?;
        Some((min, max))
    }

    pub fn latest_sale(&self) -> Option<u32> {
        self.records.iter().map(|r| r.sale_no).max()
    }

    /// Borrows the records selected by `scope` as a fingerprinted slice.
    pub fn slice(&self, scope: DataScope) -> DatasetSlice<'_> {
        let cutoff = match (scope, self.latest_sale()) {
            (DataScope::AllSales, _) | (_, None) => None,
            (DataScope::CurrentSale, Some(latest)) => Some(latest),
            (DataScope::LastNSales(n), Some(latest)) => {
                Some(latest.saturating_sub(n.saturating_sub(1)))
            }
        };
        let records: Vec<&LotRecord> = match cutoff {
            None => self.records.iter().collect(),
            Some(lowest) => self
                .records
                .iter()
                .filter(|r| r.sale_no >= lowest)
                .collect(),
        };
        DatasetSlice::new(records, &self.columns)
    }
}

/// A borrowed view over part of a `LotDataset`, the unit every aggregation
/// call runs over.
#[derive(Debug, Clone)]
pub struct DatasetSlice<'a> {
    records: Vec<&'a LotRecord>,
    columns: &'a BTreeSet<Column>,
    fingerprint: Fingerprint,
}

impl<'a> DatasetSlice<'a> {
    fn new(records: Vec<&'a LotRecord>, columns: &'a BTreeSet<Column>) -> Self {
        let fingerprint = fingerprint_records(&records, columns);
        Self {
            records,
            columns,
            fingerprint,
        }
    }

    pub fn records(&self) -> &[&'a LotRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Lowest and highest sale number present in this slice.
    pub fn sale_range(&self) -> Option<(u32, u32)> {
        let min = self.records.iter().map(|r| r.sale_no).min()?;
        let max = self.records.iter().map(|r| r.sale_no).max()?;
        Some((min, max))
    }

    /// A narrower slice holding only lots with the given status.
    pub fn filter_status(&self, status: LotStatus) -> DatasetSlice<'a> {
        let records: Vec<&LotRecord> = self
            .records
            .iter()
            .copied()
            .filter(|r| r.status == status)
            .collect();
        DatasetSlice::new(records, self.columns)
    }

    /// A narrower slice holding only lots catalogued by the given broker.
    pub fn filter_broker(&self, broker: &str) -> DatasetSlice<'a> {
        let records: Vec<&LotRecord> = self
            .records
            .iter()
            .copied()
            .filter(|r| r.broker == broker)
            .collect();
        DatasetSlice::new(records, self.columns)
    }
}

/// Hashes every field of every record, in order, plus the declared column
/// set. Any change to the underlying data changes the fingerprint.
fn fingerprint_records(records: &[&LotRecord], columns: &BTreeSet<Column>) -> Fingerprint {
    let mut hasher = Sha256::new();
    for column in columns {
        hasher.update(column.header().as_bytes());
        hasher.update([0x1f]);
    }
    for record in records {
        hasher.update(record.sale_no.to_le_bytes());
        for text in [
            record.broker.as_str(),
            record.buyer.as_str(),
            record.grade.as_str(),
            record.sub_elevation.as_str(),
            record.category.as_str(),
            record.selling_mark.as_str(),
            record.trade_mark.as_deref().unwrap_or(""),
        ] {
            hasher.update(text.as_bytes());
            hasher.update([0x1f]);
        }
        hasher.update(record.total_weight.to_string().as_bytes());
        hasher.update([0x1f]);
        if let Some(price) = record.price {
            hasher.update(price.to_string().as_bytes());
        }
        hasher.update([0x1f]);
        hasher.update(record.status.as_str().as_bytes());
        hasher.update([0x1f]);
        hasher.update(record.valuation_price.to_string().as_bytes());
        hasher.update([0x1f]);
        hasher.update(record.asking_price.to_string().as_bytes());
        hasher.update([0x1e]);
    }
    Fingerprint(hasher.finalize().into())
}
