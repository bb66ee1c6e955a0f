//! Number formatting for printed bills.

use rust_decimal::Decimal;

use forgebill_core::{round_money, round_quantity};

/// Money with Indian digit grouping: `1234567.5` -> `"12,34,567.50"`.
pub fn format_inr(amount: Decimal) -> String {
    let rounded = round_money(amount);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let grouped = if int_part.len() <= 3 {
        int_part.to_string()
    } else {
        let (head, tail) = int_part.split_at(int_part.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 2 {
            groups.push(&head[end - 2..end]);
            end -= 2;
        }
        groups.push(&head[..end]);
        groups.reverse();
        format!("{},{tail}", groups.join(","))
    };

    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

/// Quantity without trailing zeros: `64.000` -> `"64"`, `0.830` -> `"0.83"`.
pub fn format_quantity(quantity: Decimal) -> String {
    round_quantity(quantity).normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn groups_in_lakhs_and_crores() {
        assert_eq!(format_inr(dec!(0)), "0.00");
        assert_eq!(format_inr(dec!(999.5)), "999.50");
        assert_eq!(format_inr(dec!(1234)), "1,234.00");
        assert_eq!(format_inr(dec!(123456.789)), "1,23,456.79");
        assert_eq!(format_inr(dec!(1234567.5)), "12,34,567.50");
        assert_eq!(format_inr(dec!(123456789)), "12,34,56,789.00");
        assert_eq!(format_inr(dec!(-1500)), "-1,500.00");
    }

    #[test]
    fn quantities_drop_trailing_zeros() {
        assert_eq!(format_quantity(dec!(64.000)), "64");
        assert_eq!(format_quantity(dec!(0.8333)), "0.833");
    }
}
