//! Per-item discount rules.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use forgebill_core::{parse_decimal_or_zero, round_money, DomainError, DomainResult, ValueObject};

/// Discount applied to a single line before tax.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DiscountRule {
    #[default]
    None,
    /// Percentage of the line gross, within `[0, 100]`.
    Percent(Decimal),
    /// Amount taken off the rate for every unit of effective quantity.
    PerUnit(Decimal),
    /// Amount taken off the line gross.
    Flat(Decimal),
}

impl ValueObject for DiscountRule {}

impl DiscountRule {
    /// Read a discount cell as typed: `"10%"` is a percentage, a bare
    /// number is a flat amount, blank or zero means no discount.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(pct) = raw.strip_suffix('%') {
            let value = parse_decimal_or_zero(pct);
            return if value.is_zero() {
                DiscountRule::None
            } else {
                DiscountRule::Percent(value)
            };
        }
        let value = parse_decimal_or_zero(raw);
        if value.is_zero() {
            DiscountRule::None
        } else {
            DiscountRule::Flat(value)
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        match self {
            DiscountRule::None => Ok(()),
            DiscountRule::Percent(p) => {
                if *p < Decimal::ZERO || *p > Decimal::ONE_HUNDRED {
                    return Err(DomainError::validation(
                        "discount percent must be between 0 and 100",
                    ));
                }
                Ok(())
            }
            DiscountRule::PerUnit(a) | DiscountRule::Flat(a) => {
                if *a < Decimal::ZERO {
                    return Err(DomainError::validation("discount amount cannot be negative"));
                }
                Ok(())
            }
        }
    }

    /// Discount for a line with the given gross and effective quantity.
    ///
    /// Rounded to money precision and capped at `gross`, so the discounted
    /// value is never negative.
    pub fn amount(&self, gross: Decimal, quantity: Decimal) -> DomainResult<Decimal> {
        self.validate()?;
        let overflow = || DomainError::invariant("discount amount overflow");
        let raw = match self {
            DiscountRule::None => Decimal::ZERO,
            DiscountRule::Percent(p) => gross
                .checked_mul(*p)
                .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
                .ok_or_else(overflow)?,
            DiscountRule::PerUnit(a) => quantity.checked_mul(*a).ok_or_else(overflow)?,
            DiscountRule::Flat(a) => *a,
        };
        Ok(round_money(raw).min(gross.max(Decimal::ZERO)))
    }

    /// Short label for printed tables (`"10%"`, `"5/unit"`, `"50"`).
    pub fn label(&self) -> String {
        match self {
            DiscountRule::None => String::new(),
            DiscountRule::Percent(p) => format!("{}%", p.normalize()),
            DiscountRule::PerUnit(a) => format!("{}/unit", a.normalize()),
            DiscountRule::Flat(a) => a.normalize().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_reads_percent_and_flat() {
        assert_eq!(DiscountRule::parse("10%"), DiscountRule::Percent(dec!(10)));
        assert_eq!(DiscountRule::parse(" 12.5 % "), DiscountRule::Percent(dec!(12.5)));
        assert_eq!(DiscountRule::parse("1,000"), DiscountRule::Flat(dec!(1000)));
        assert_eq!(DiscountRule::parse(""), DiscountRule::None);
        assert_eq!(DiscountRule::parse("abc"), DiscountRule::None);
        assert_eq!(DiscountRule::parse("0%"), DiscountRule::None);
    }

    #[test]
    fn percent_discount_rounds_to_paise() {
        let rule = DiscountRule::Percent(dec!(7.5));
        assert_eq!(rule.amount(dec!(333.33), dec!(1)).unwrap(), dec!(25.00));
    }

    #[test]
    fn per_unit_discount_scales_with_quantity() {
        let rule = DiscountRule::PerUnit(dec!(2.5));
        assert_eq!(rule.amount(dec!(640), dec!(64)).unwrap(), dec!(160));
    }

    #[test]
    fn discount_is_capped_at_gross() {
        let rule = DiscountRule::Flat(dec!(500));
        assert_eq!(rule.amount(dec!(120), dec!(1)).unwrap(), dec!(120));
        let rule = DiscountRule::PerUnit(dec!(50));
        assert_eq!(rule.amount(dec!(30), dec!(2)).unwrap(), dec!(30));
    }

    #[test]
    fn invalid_rules_are_rejected() {
        assert!(DiscountRule::Percent(dec!(101)).validate().is_err());
        assert!(DiscountRule::Percent(dec!(-1)).validate().is_err());
        assert!(DiscountRule::Flat(dec!(-5)).amount(dec!(10), dec!(1)).is_err());
    }

    #[test]
    fn labels_are_compact() {
        assert_eq!(DiscountRule::Percent(dec!(10.00)).label(), "10%");
        assert_eq!(DiscountRule::PerUnit(dec!(5)).label(), "5/unit");
        assert_eq!(DiscountRule::None.label(), "");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: no rule ever discounts more than the gross.
            #[test]
            fn discount_never_exceeds_gross(
                gross_paise in 0i64..100_000_000i64,
                qty_milli in 0i64..1_000_000i64,
                value_paise in 0i64..100_000_000i64,
                pct in 0u32..=100u32,
            ) {
                let gross = Decimal::new(gross_paise, 2);
                let qty = Decimal::new(qty_milli, 3);
                let value = Decimal::new(value_paise, 2);
                for rule in [
                    DiscountRule::Percent(Decimal::from(pct)),
                    DiscountRule::PerUnit(value),
                    DiscountRule::Flat(value),
                ] {
                    let d = rule.amount(gross, qty).unwrap();
                    prop_assert!(d >= Decimal::ZERO);
                    prop_assert!(d <= gross);
                }
            }
        }
    }
}
