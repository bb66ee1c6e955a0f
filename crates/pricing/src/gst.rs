//! GST split (intrastate CGST+SGST, interstate IGST) and the per-rate summary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use forgebill_core::{round_money, DomainError, DomainResult};
use forgebill_parties::StateCode;

use crate::line::LineComputation;

/// Whether a supply stays within the seller's state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplyKind {
    /// Same state: CGST + SGST, half the rate each.
    #[default]
    Intrastate,
    /// Different state: the full rate as IGST.
    Interstate,
}

impl SupplyKind {
    /// Decide the supply kind from the seller state and the place of supply.
    ///
    /// An unknown place of supply (unregistered walk-in customer) is treated
    /// as intrastate.
    pub fn between(seller: &StateCode, place_of_supply: Option<&StateCode>) -> Self {
        match place_of_supply {
            Some(pos) if pos != seller => SupplyKind::Interstate,
            _ => SupplyKind::Intrastate,
        }
    }
}

/// Tax charged on one line (or summed over many).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSplit {
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
}

impl TaxSplit {
    pub fn total(&self) -> Decimal {
        self.cgst + self.sgst + self.igst
    }

    pub fn is_zero(&self) -> bool {
        self.total().is_zero()
    }

    /// Column-wise sum, `None` on overflow.
    pub fn checked_add(self, rhs: TaxSplit) -> Option<TaxSplit> {
        Some(TaxSplit {
            cgst: self.cgst.checked_add(rhs.cgst)?,
            sgst: self.sgst.checked_add(rhs.sgst)?,
            igst: self.igst.checked_add(rhs.igst)?,
        })
    }

    pub fn checked_total(&self) -> Option<Decimal> {
        self.cgst.checked_add(self.sgst)?.checked_add(self.igst)
    }
}

pub fn validate_rate(rate: Decimal) -> DomainResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(DomainError::validation("GST rate must be between 0 and 100"));
    }
    Ok(())
}

/// Split the GST on `taxable` at `rate` percent.
///
/// Intrastate halves are computed once and used for both CGST and SGST, so
/// the two printed columns always match.
pub fn split_tax(taxable: Decimal, rate: Decimal, supply: SupplyKind) -> DomainResult<TaxSplit> {
    validate_rate(rate)?;
    let overflow = || DomainError::invariant("tax amount overflow");
    let full = taxable.checked_mul(rate).ok_or_else(overflow)?;

    Ok(match supply {
        SupplyKind::Intrastate => {
            let half = round_money(full / Decimal::from(200));
            TaxSplit {
                cgst: half,
                sgst: half,
                igst: Decimal::ZERO,
            }
        }
        SupplyKind::Interstate => TaxSplit {
            cgst: Decimal::ZERO,
            sgst: Decimal::ZERO,
            igst: round_money(full / Decimal::ONE_HUNDRED),
        },
    })
}

/// Back out the taxable value from a GST-inclusive amount.
pub fn taxable_from_inclusive(inclusive: Decimal, rate: Decimal) -> DomainResult<Decimal> {
    validate_rate(rate)?;
    let value = inclusive
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED + rate))
        .ok_or_else(|| DomainError::invariant("inclusive price overflow"))?;
    Ok(round_money(value))
}

/// One row of the GST table: all lines sharing an HSN code and rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstSummaryRow {
    pub hsn: String,
    pub rate: Decimal,
    pub taxable: Decimal,
    pub tax: TaxSplit,
}

impl GstSummaryRow {
    pub fn total_tax(&self) -> Decimal {
        self.tax.total()
    }
}

/// GST table grouped by `(hsn, rate)` in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstSummary {
    pub rows: Vec<GstSummaryRow>,
    pub taxable_total: Decimal,
    pub tax_total: TaxSplit,
}

impl GstSummary {
    pub fn from_lines(lines: &[LineComputation]) -> DomainResult<Self> {
        let overflow = || DomainError::invariant("GST summary overflow");
        let mut rows: Vec<GstSummaryRow> = Vec::new();
        for line in lines {
            let hsn = line.hsn.clone().unwrap_or_default();
            match rows
                .iter_mut()
                .find(|r| r.hsn == hsn && r.rate == line.gst_rate)
            {
                Some(row) => {
                    row.taxable = row.taxable.checked_add(line.taxable).ok_or_else(overflow)?;
                    row.tax = row.tax.checked_add(line.tax).ok_or_else(overflow)?;
                }
                None => rows.push(GstSummaryRow {
                    hsn,
                    rate: line.gst_rate,
                    taxable: line.taxable,
                    tax: line.tax,
                }),
            }
        }

        let taxable_total = rows
            .iter()
            .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(r.taxable))
            .ok_or_else(overflow)?;
        let tax_total = rows
            .iter()
            .try_fold(TaxSplit::default(), |acc, r| acc.checked_add(r.tax))
            .ok_or_else(overflow)?;
        Ok(Self {
            rows,
            taxable_total,
            tax_total,
        })
    }
}
