//! Ordered global adjustments (taxes, surcharges, discounts, round-off)
//! applied to the bill after line totals.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use forgebill_core::{round_money, DomainError, DomainResult};

/// Direction used by a round-off step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    #[default]
    Nearest,
    Up,
    Down,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::Nearest => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::Up => RoundingStrategy::ToPositiveInfinity,
            RoundingMode::Down => RoundingStrategy::ToNegativeInfinity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// Signed percentage of the running total (`18` = +18%, `-5` = -5%).
    Percent { rate: Decimal },
    /// Signed fixed amount.
    Flat { amount: Decimal },
    /// Round the running total to a multiple of `step`.
    RoundOff { mode: RoundingMode, step: Decimal },
}

/// One entry of the adjustment chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub label: String,
    pub kind: AdjustmentKind,
}

impl Adjustment {
    pub fn percent(label: impl Into<String>, rate: Decimal) -> Self {
        Self {
            label: label.into(),
            kind: AdjustmentKind::Percent { rate },
        }
    }

    pub fn flat(label: impl Into<String>, amount: Decimal) -> Self {
        Self {
            label: label.into(),
            kind: AdjustmentKind::Flat { amount },
        }
    }

    pub fn round_off(mode: RoundingMode, step: Decimal) -> Self {
        Self {
            label: "Round Off".to_string(),
            kind: AdjustmentKind::RoundOff { mode, step },
        }
    }

    /// Change this adjustment makes to `running`.
    fn delta(&self, running: Decimal) -> DomainResult<Decimal> {
        let overflow = || DomainError::invariant(format!("adjustment {:?} overflowed", self.label));
        match &self.kind {
            AdjustmentKind::Percent { rate } => {
                let raw = running
                    .checked_mul(*rate)
                    .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
                    .ok_or_else(overflow)?;
                Ok(round_money(raw))
            }
            AdjustmentKind::Flat { amount } => Ok(round_money(*amount)),
            AdjustmentKind::RoundOff { mode, step } => {
                if *step <= Decimal::ZERO {
                    return Err(DomainError::validation("round-off step must be positive"));
                }
                let units = running
                    .checked_div(*step)
                    .ok_or_else(overflow)?
                    .round_dp_with_strategy(0, mode.strategy());
                let rounded = units.checked_mul(*step).ok_or_else(overflow)?;
                // Unrounded: the total must land on a multiple of `step`.
                rounded.checked_sub(running).ok_or_else(overflow)
            }
        }
    }
}

/// Result of applying one adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentStep {
    pub label: String,
    pub base: Decimal,
    pub delta: Decimal,
    pub running: Decimal,
}

/// Apply `adjustments` to `base` strictly in order.
///
/// Every step sees the running total left by the previous one. A running
/// total below zero is rejected.
pub fn apply_adjustments(base: Decimal, adjustments: &[Adjustment]) -> DomainResult<Vec<AdjustmentStep>> {
    let mut running = base;
    let mut steps = Vec::with_capacity(adjustments.len());

    for adjustment in adjustments {
        let delta = adjustment.delta(running)?;
        let next = running
            .checked_add(delta)
            .ok_or_else(|| DomainError::invariant("adjustment total overflow"))?;
        if next < Decimal::ZERO {
            return Err(DomainError::invariant(format!(
                "adjustment {:?} makes the bill total negative",
                adjustment.label
            )));
        }
        steps.push(AdjustmentStep {
            label: adjustment.label.clone(),
            base: running,
            delta,
            running: next,
        });
        running = next;
    }

    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn last(steps: &[AdjustmentStep], base: Decimal) -> Decimal {
        steps.last().map(|s| s.running).unwrap_or(base)
    }

    #[test]
    fn empty_chain_keeps_base() {
        let steps = apply_adjustments(dec!(10), &[]).unwrap();
        assert!(steps.is_empty());
    }

    #[test]
    fn steps_carry_running_totals() {
        let chain = vec![
            Adjustment::percent("VAT", dec!(5)),
            Adjustment::flat("Delivery", dec!(40)),
            Adjustment::round_off(RoundingMode::Nearest, Decimal::ONE),
        ];
        let steps = apply_adjustments(dec!(999.90), &chain).unwrap();

        assert_eq!(steps[0].delta, dec!(50.00));
        assert_eq!(steps[0].running, dec!(1049.90));
        assert_eq!(steps[1].base, dec!(1049.90));
        assert_eq!(steps[1].running, dec!(1089.90));
        assert_eq!(steps[2].delta, dec!(0.10));
        assert_eq!(steps[2].running, dec!(1090));
    }

    #[test]
    fn order_changes_the_result() {
        let a = vec![
            Adjustment::flat("Packing", dec!(100)),
            Adjustment::percent("Tax", dec!(10)),
        ];
        let b = vec![
            Adjustment::percent("Tax", dec!(10)),
            Adjustment::flat("Packing", dec!(100)),
        ];
        let ra = apply_adjustments(dec!(1000), &a).unwrap();
        let rb = apply_adjustments(dec!(1000), &b).unwrap();
        assert_eq!(last(&ra, dec!(1000)), dec!(1210));
        assert_eq!(last(&rb, dec!(1000)), dec!(1200));
    }

    #[test]
    fn round_off_modes_and_steps() {
        let up = apply_adjustments(dec!(101.01), &[Adjustment::round_off(RoundingMode::Up, dec!(1))]).unwrap();
        assert_eq!(up[0].running, dec!(102));

        let down = apply_adjustments(dec!(101.99), &[Adjustment::round_off(RoundingMode::Down, dec!(1))]).unwrap();
        assert_eq!(down[0].delta, dec!(-0.99));

        let tens = apply_adjustments(dec!(1234.50), &[Adjustment::round_off(RoundingMode::Nearest, dec!(10))]).unwrap();
        assert_eq!(tens[0].running, dec!(1230));

        let half = apply_adjustments(dec!(12.25), &[Adjustment::round_off(RoundingMode::Nearest, dec!(0.5))]).unwrap();
        assert_eq!(half[0].running, dec!(12.5));
    }

    #[test]
    fn round_off_honours_steps_finer_than_money() {
        let steps = apply_adjustments(
            dec!(10.1234),
            &[Adjustment::round_off(RoundingMode::Nearest, dec!(0.001))],
        )
        .unwrap();
        assert_eq!(steps[0].delta, dec!(-0.0004));
        assert_eq!(steps[0].running, dec!(10.123));
    }

    #[test]
    fn negative_total_is_rejected() {
        let err = apply_adjustments(dec!(50), &[Adjustment::flat("Advance", dec!(-60))]).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn zero_step_is_rejected() {
        let err = apply_adjustments(dec!(50), &[Adjustment::round_off(RoundingMode::Up, Decimal::ZERO)]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: the chain is deterministic and each step starts where the last ended.
            #[test]
            fn chain_is_deterministic_and_contiguous(
                base_paise in 0i64..100_000_000i64,
                rates in prop::collection::vec(-20i64..40i64, 0..6),
            ) {
                let base = Decimal::new(base_paise, 2);
                let mut chain: Vec<Adjustment> = rates
                    .iter()
                    .map(|r| Adjustment::percent(format!("{r}%"), Decimal::from(*r)))
                    .collect();
                chain.push(Adjustment::round_off(RoundingMode::Nearest, Decimal::ONE));

                let first = apply_adjustments(base, &chain).unwrap();
                let second = apply_adjustments(base, &chain).unwrap();
                prop_assert_eq!(&first, &second);

                let mut expected_base = base;
                for step in &first {
                    prop_assert_eq!(step.base, expected_base);
                    prop_assert_eq!(step.base + step.delta, step.running);
                    expected_base = step.running;
                }
                prop_assert!(expected_base.fract().is_zero());
            }
        }
    }
}
