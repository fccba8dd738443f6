use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// Disposition of a lot at auction close.
///
/// "Outsold" means the lot left the catalogue through a competing broker's
/// channel; together with `Sold` it forms the sold side of the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LotStatus {
    Sold,
    Unsold,
    Outsold,
    /// Withdrawn or otherwise unclassified. Counts toward catalogued weight only.
    Other,
}

impl LotStatus {
    /// Normalizes a raw status cell. Matching is case-insensitive and
    /// whitespace-tolerant; anything unrecognized maps to `Other`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sold" => LotStatus::Sold,
            "unsold" => LotStatus::Unsold,
            "outsold" => LotStatus::Outsold,
            _ => LotStatus::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LotStatus::Sold => "sold",
            LotStatus::Unsold => "unsold",
            LotStatus::Outsold => "outsold",
            LotStatus::Other => "other",
        }
    }
}

/// Every input column the system understands, carrying the verbatim
/// business-facing header text used in the sale catalogue files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    SaleNo,
    Broker,
    Buyer,
    Grade,
    SubElevation,
    Category,
    SellingMark,
    TradeMark,
    TotalWeight,
    Price,
    Status,
    ValuationPrice,
    AskingPrice,
}

impl Column {
    /// The exact header text as it appears in the catalogue files.
    pub fn header(&self) -> &'static str {
        match self {
            Column::SaleNo => "Sale_No",
            Column::Broker => "Broker",
            Column::Buyer => "Buyer",
            Column::Grade => "Grade",
            Column::SubElevation => "Sub Elevation",
            Column::Category => "Category",
            Column::SellingMark => "Selling Mark",
            Column::TradeMark => "Trade Mark",
            Column::TotalWeight => "Total Weight",
            Column::Price => "Price",
            Column::Status => "Status",
            Column::ValuationPrice => "Valuation price",
            Column::AskingPrice => "Asking Price",
        }
    }

    /// Columns a sale file must carry for ingestion to succeed.
    pub const REQUIRED: [Column; 5] = [
        Column::Broker,
        Column::Grade,
        Column::SubElevation,
        Column::TotalWeight,
        Column::Status,
    ];
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

/// A grouping dimension for aggregation. The supported set is closed: callers
/// select from this enum instead of passing free-form column names, and each
/// dimension is validated against the dataset's declared columns before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Broker,
    Buyer,
    Grade,
    SubElevation,
    Category,
    SellingMark,
    SaleNo,
}

impl Dimension {
    /// The dataset column this dimension groups by.
    pub fn column(&self) -> Column {
        match self {
            Dimension::Broker => Column::Broker,
            Dimension::Buyer => Column::Buyer,
            Dimension::Grade => Column::Grade,
            Dimension::SubElevation => Column::SubElevation,
            Dimension::Category => Column::Category,
            Dimension::SellingMark => Column::SellingMark,
            Dimension::SaleNo => Column::SaleNo,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Broker => "broker",
            Dimension::Buyer => "buyer",
            Dimension::Grade => "grade",
            Dimension::SubElevation => "sub-elevation",
            Dimension::Category => "category",
            Dimension::SellingMark => "selling-mark",
            Dimension::SaleNo => "sale-no",
        }
    }
}

impl std::str::FromStr for Dimension {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "broker" => Ok(Dimension::Broker),
            "buyer" => Ok(Dimension::Buyer),
            "grade" => Ok(Dimension::Grade),
            "sub-elevation" | "sub_elevation" => Ok(Dimension::SubElevation),
            "category" => Ok(Dimension::Category),
            "selling-mark" | "selling_mark" => Ok(Dimension::SellingMark),
            "sale-no" | "sale_no" => Ok(Dimension::SaleNo),
            other => Err(CoreError::InvalidInput(
                "dimension".to_string(),
                other.to_string(),
            )),
        }
    }
}

/// Which portion of the loaded sales history an operation runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataScope {
    /// Only the most recent sale.
    CurrentSale,
    /// The most recent `n` sales.
    LastNSales(u32),
    /// Every loaded sale.
    AllSales,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(LotStatus::parse("SOLD"), LotStatus::Sold);
        assert_eq!(LotStatus::parse("  Unsold "), LotStatus::Unsold);
        assert_eq!(LotStatus::parse("outsold"), LotStatus::Outsold);
        assert_eq!(LotStatus::parse("withdrawn"), LotStatus::Other);
        assert_eq!(LotStatus::parse(""), LotStatus::Other);
    }

    #[test]
    fn dimension_maps_to_verbatim_header() {
        assert_eq!(Dimension::SubElevation.column().header(), "Sub Elevation");
        assert_eq!(Dimension::SellingMark.column().header(), "Selling Mark");
        assert_eq!(Column::ValuationPrice.header(), "Valuation price");
    }

    #[test]
    fn dimension_from_str_round_trips() {
        for dim in [
            Dimension::Broker,
            Dimension::Buyer,
            Dimension::Grade,
            Dimension::SubElevation,
            Dimension::Category,
            Dimension::SellingMark,
            Dimension::SaleNo,
        ] {
            assert_eq!(dim.as_str().parse::<Dimension>().unwrap(), dim);
        }
        assert!("altitude".parse::<Dimension>().is_err());
    }
}
