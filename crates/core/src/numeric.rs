//! Decimal parsing and rounding shared by every money computation.
//!
//! All amounts are `rust_decimal::Decimal`; binary floats never enter the
//! pricing path, so the same inputs always print the same totals.

use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for money amounts.
pub const MONEY_DP: u32 = 2;

/// Decimal places kept for computed quantities.
pub const QUANTITY_DP: u32 = 3;

/// Round a money amount to two places, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a quantity to three places, half away from zero.
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QUANTITY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse user-typed numeric text, falling back to zero.
///
/// Accepts surrounding whitespace, a leading rupee sign and digit-grouping
/// commas (`"₹ 1,23,456.50"`). Anything unparsable (empty, `"abc"`, `"-"`)
/// yields `0`.
pub fn parse_decimal_or_zero(raw: &str) -> Decimal {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('₹')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Decimal::ZERO;
    }

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .unwrap_or_else(|_| {
            tracing::debug!(input = raw, "unparsable numeric input, defaulting to zero");
            Decimal::ZERO
        })
}
