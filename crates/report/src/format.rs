//! Display formatting shared by every section builder and the overview.
//!
//! Formatting happens at the table-building boundary only; metric structs
//! keep full precision.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Widest label a table column shows. Longer identifiers are truncated for
/// display; the underlying value is never altered.
pub const LABEL_WIDTH: usize = 18;

/// Kilogram quantities: no decimals, thousands separators ("1,234").
pub fn format_qty(value: Decimal) -> String {
    group_thousands(&value.round_dp(0).to_string())
}

/// Lot counts: thousands separators.
pub fn format_count(value: usize) -> String {
    group_thousands(&value.to_string())
}

/// Prices: two decimals, thousands separators ("1,234.56").
pub fn format_price(value: Decimal) -> String {
    group_thousands(&format!("{:.2}", value.round_dp(2)))
}

/// Prices that may not exist render as "N/A", never as zero.
pub fn format_opt_price(value: Option<Decimal>) -> String {
    match value {
        Some(price) => format_price(price),
        None => "N/A".to_string(),
    }
}

/// Currency with the LKR prefix ("LKR 1,234.56").
pub fn format_currency(value: Decimal) -> String {
    format!("LKR {}", format_price(value))
}

/// Compact currency for headline metrics ("LKR 1.23M").
pub fn format_currency_compact(value: Decimal) -> String {
    format!("LKR {}", format_compact(value))
}

/// Compact magnitude notation: 1.23B / 1.23M / 1.2K, plain below a thousand.
pub fn format_compact(value: Decimal) -> String {
    let abs = value.abs();
    if abs >= dec!(1000000000) {
        format!("{:.2}B", value / dec!(1000000000))
    } else if abs >= dec!(1000000) {
        format!("{:.2}M", value / dec!(1000000))
    } else if abs >= dec!(1000) {
        format!("{:.1}K", value / dec!(1000))
    } else {
        format_qty(value)
    }
}

/// Percentages: two decimals plus the sign ("66.67%").
pub fn format_pct(value: Decimal) -> String {
    format!("{:.2}%", value.round_dp(2))
}

/// Truncates an identifier for column display.
pub fn truncate_label(label: &str) -> String {
    label.chars().take(LABEL_WIDTH).collect()
}

/// Inserts thousands separators into the integer part of a plain numeric
/// string ("-12345.67" -> "-12,345.67").
fn group_thousands(plain: &str) -> String {
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_group_thousands_without_decimals() {
        assert_eq!(format_qty(dec!(1234567.4)), "1,234,567");
        assert_eq!(format_qty(dec!(999)), "999");
        assert_eq!(format_qty(Decimal::ZERO), "0");
    }

    #[test]
    fn prices_carry_two_decimals() {
        assert_eq!(format_price(dec!(1234.5)), "1,234.50");
        assert_eq!(format_price(dec!(540.505)), "540.51");
        assert_eq!(format_currency(dec!(1234.5)), "LKR 1,234.50");
    }

    #[test]
    fn missing_prices_render_as_na() {
        assert_eq!(format_opt_price(None), "N/A");
        assert_eq!(format_opt_price(Some(dec!(500))), "500.00");
    }

    #[test]
    fn percentages_carry_two_decimals_and_the_sign() {
        assert_eq!(format_pct(dec!(66.666666)), "66.67%");
        assert_eq!(format_pct(Decimal::ZERO), "0.00%");
    }

    #[test]
    fn compact_notation_scales_by_magnitude() {
        assert_eq!(format_compact(dec!(2500000000)), "2.50B");
        assert_eq!(format_compact(dec!(1234567)), "1.23M");
        assert_eq!(format_compact(dec!(5400)), "5.4K");
        assert_eq!(format_compact(dec!(999)), "999");
    }

    #[test]
    fn labels_truncate_at_the_display_cap() {
        assert_eq!(truncate_label("SHORT"), "SHORT");
        assert_eq!(
            truncate_label("AN EXTREMELY LONG GRADE NAME"),
            "AN EXTREMELY LONG "
        );
    }
}
