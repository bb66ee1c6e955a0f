//! Whole-bill computation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use forgebill_core::{DomainError, DomainResult};

use crate::adjustment::{apply_adjustments, Adjustment, AdjustmentStep};
use crate::gst::{GstSummary, SupplyKind, TaxSplit};
use crate::line::{LineComputation, LineItem, PricingContext};
use crate::words::amount_in_words;

/// Whether typed rates already include GST.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceMode {
    #[default]
    Exclusive,
    Inclusive,
}

/// Regular bills carry no line tax; GST bills split tax per line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BillKind {
    #[default]
    Regular,
    Gst { price_mode: PriceMode },
}

impl BillKind {
    pub fn is_gst(&self) -> bool {
        matches!(self, BillKind::Gst { .. })
    }
}

/// Everything needed to price a bill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillDraft {
    pub kind: BillKind,
    pub supply: SupplyKind,
    pub lines: Vec<LineItem>,
    #[serde(default)]
    pub adjustments: Vec<Adjustment>,
}

/// Fully computed bill state. Every view renders from this value alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillComputation {
    pub kind: BillKind,
    pub supply: SupplyKind,
    pub lines: Vec<LineComputation>,
    /// Sum of line gross amounts.
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub taxable_total: Decimal,
    pub tax: TaxSplit,
    /// `taxable_total + tax`, the base of the adjustment chain.
    pub lines_total: Decimal,
    pub adjustments: Vec<AdjustmentStep>,
    pub grand_total: Decimal,
    pub gst_summary: Option<GstSummary>,
    pub amount_in_words: String,
}

impl BillComputation {
    pub fn tax_total(&self) -> Decimal {
        self.tax.total()
    }

    /// Net effect of the adjustment chain.
    pub fn adjustment_total(&self) -> Decimal {
        self.adjustments.iter().map(|s| s.delta).sum()
    }
}

impl BillDraft {
    pub fn new(kind: BillKind, supply: SupplyKind) -> Self {
        Self {
            kind,
            supply,
            lines: Vec::new(),
            adjustments: Vec::new(),
        }
    }

    pub fn with_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    pub fn with_adjustment(mut self, adjustment: Adjustment) -> Self {
        self.adjustments.push(adjustment);
        self
    }

    /// Price every line, apply the adjustment chain and build the GST table.
    ///
    /// Pure: the same draft always yields the same computation. An empty
    /// draft computes to all zeros.
    pub fn compute(&self) -> DomainResult<BillComputation> {
        let ctx = PricingContext {
            kind: self.kind,
            supply: self.supply,
        };

        let lines = self
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let line_no = u32::try_from(i + 1)
                    .map_err(|_| DomainError::validation("too many bill lines"))?;
                line.compute(line_no, &ctx)
            })
            .collect::<DomainResult<Vec<_>>>()?;

        let overflow = || DomainError::invariant("bill total overflow");
        let sum = |field: fn(&LineComputation) -> Decimal| {
            lines
                .iter()
                .try_fold(Decimal::ZERO, |acc, l| acc.checked_add(field(l)))
                .ok_or_else(overflow)
        };
        let subtotal = sum(|l| l.gross)?;
        let discount_total = sum(|l| l.discount)?;
        let taxable_total = sum(|l| l.taxable)?;
        let tax = lines
            .iter()
            .try_fold(TaxSplit::default(), |acc, l| acc.checked_add(l.tax))
            .ok_or_else(overflow)?;
        let lines_total = tax
            .checked_total()
            .and_then(|t| taxable_total.checked_add(t))
            .ok_or_else(overflow)?;

        let adjustments = apply_adjustments(lines_total, &self.adjustments)?;
        let grand_total = adjustments.last().map_or(lines_total, |s| s.running);

        let gst_summary = if self.kind.is_gst() {
            Some(GstSummary::from_lines(&lines)?)
        } else {
            None
        };

        tracing::debug!(
            lines = lines.len(),
            %lines_total,
            %grand_total,
            "bill computed"
        );

        Ok(BillComputation {
            kind: self.kind,
            supply: self.supply,
            lines,
            subtotal,
            discount_total,
            taxable_total,
            tax,
            lines_total,
            adjustments,
            grand_total,
            gst_summary,
            amount_in_words: amount_in_words(grand_total),
        })
    }
}
