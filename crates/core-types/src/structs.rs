use crate::enums::LotStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One catalogued auction lot, immutable after ingestion.
///
/// `price` is `None` for lots that never traded at a price (unsold lots, or
/// rows whose price cell could not be coerced). Keeping the absence explicit
/// means "no price" is a representable state rather than a NaN leaking into
/// downstream arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotRecord {
    pub sale_no: u32,
    pub broker: String,
    /// Empty when the lot did not sell.
    pub buyer: String,
    pub grade: String,
    pub sub_elevation: String,
    pub category: String,
    pub selling_mark: String,
    pub trade_mark: Option<String>,
    /// Kilograms catalogued for this lot. Unparsable cells coerce to zero.
    pub total_weight: Decimal,
    pub price: Option<Decimal>,
    pub status: LotStatus,
    pub valuation_price: Decimal,
    pub asking_price: Decimal,
}

impl LotRecord {
    /// Value realized by this lot: weight times price, when a price exists.
    pub fn total_value(&self) -> Option<Decimal> {
        self.price.map(|p| self.total_weight * p)
    }
}
