//! Line items: raw rows as typed, and their computed amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use forgebill_core::{parse_decimal_or_zero, round_money, DomainError, DomainResult};

use crate::bill::{BillKind, PriceMode};
use crate::dimension::{DimensionUnit, Dimensions, ItemMeasure};
use crate::discount::DiscountRule;
use crate::gst::{self, SupplyKind, TaxSplit};

/// Bill-wide facts every line needs to price itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingContext {
    pub kind: BillKind,
    pub supply: SupplyKind,
}

/// A validated line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub hsn: Option<String>,
    /// Number of pieces; multiplied by the measure of one piece.
    pub count: Decimal,
    #[serde(default)]
    pub measure: ItemMeasure,
    /// Price per billing unit (per piece, per ft, per sq.ft, ...).
    pub rate: Decimal,
    #[serde(default)]
    pub discount: DiscountRule,
    /// GST percent; ignored on regular bills.
    #[serde(default)]
    pub gst_rate: Decimal,
}

/// A computed line, ready for every view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineComputation {
    pub line_no: u32,
    pub name: String,
    pub hsn: Option<String>,
    pub dimensions: String,
    pub unit: String,
    pub count: Decimal,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub gross: Decimal,
    pub discount_label: String,
    pub discount: Decimal,
    pub taxable: Decimal,
    pub gst_rate: Decimal,
    pub tax: TaxSplit,
    pub total: Decimal,
}

impl LineItem {
    /// Plain counted item without dimensions, discount or GST.
    pub fn simple(name: impl Into<String>, count: Decimal, rate: Decimal) -> Self {
        Self {
            name: name.into(),
            hsn: None,
            count,
            measure: ItemMeasure::count(),
            rate,
            discount: DiscountRule::None,
            gst_rate: Decimal::ZERO,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.count < Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "line {:?}: quantity cannot be negative",
                self.name
            )));
        }
        if self.rate < Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "line {:?}: rate cannot be negative",
                self.name
            )));
        }
        self.discount.validate()?;
        gst::validate_rate(self.gst_rate)
    }

    /// Price this line: quantity, gross, discount, taxable value, tax, total.
    pub fn compute(&self, line_no: u32, ctx: &PricingContext) -> DomainResult<LineComputation> {
        self.validate()?;

        let quantity = self.measure.quantity(self.count)?;
        let gross = round_money(
            quantity
                .checked_mul(self.rate)
                .ok_or_else(|| DomainError::invariant("line amount overflow"))?,
        );
        let discount = self.discount.amount(gross, quantity)?;
        let net = gross - discount;

        let (taxable, gst_rate, tax) = match ctx.kind {
            BillKind::Regular => (net, Decimal::ZERO, TaxSplit::default()),
            BillKind::Gst { price_mode } => {
                let (taxable, tax) = match price_mode {
                    PriceMode::Exclusive => (net, gst::split_tax(net, self.gst_rate, ctx.supply)?),
                    PriceMode::Inclusive => {
                        let backed_out = gst::taxable_from_inclusive(net, self.gst_rate)?;
                        let tax = gst::split_tax(backed_out, self.gst_rate, ctx.supply)?;
                        // The typed price is the total; rounding lands on the taxable value.
                        (net - tax.total(), tax)
                    }
                };
                (taxable, self.gst_rate, tax)
            }
        };

        let total = tax
            .checked_total()
            .and_then(|t| taxable.checked_add(t))
            .ok_or_else(|| DomainError::invariant("line total overflow"))?;

        Ok(LineComputation {
            line_no,
            name: self.name.clone(),
            hsn: self.hsn.clone(),
            dimensions: self.measure.describe(),
            unit: self.measure.unit_label(),
            count: self.count,
            quantity,
            rate: self.rate,
            gross,
            discount_label: self.discount.label(),
            discount,
            taxable,
            gst_rate,
            tax,
            total,
        })
    }
}

/// A row exactly as typed into the input table.
///
/// Every numeric cell is free text; unparsable cells count as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItemInput {
    pub name: String,
    pub hsn: String,
    pub quantity: String,
    pub length: String,
    pub width: String,
    pub height: String,
    pub input_unit: DimensionUnit,
    pub billing_unit: DimensionUnit,
    pub rate: String,
    pub discount: String,
    pub gst_rate: String,
}

impl LineItemInput {
    /// Dimensions implied by which cells are filled: length only is a
    /// length, length and width an area, all three a volume.
    fn dimensions(&self) -> Dimensions {
        let filled = |s: &str| !s.trim().is_empty();
        let length = parse_decimal_or_zero(&self.length);
        let width = parse_decimal_or_zero(&self.width);
        let height = parse_decimal_or_zero(&self.height);
        match (filled(&self.length), filled(&self.width), filled(&self.height)) {
            (false, false, false) => Dimensions::None,
            (_, false, false) => Dimensions::Length { length },
            (_, _, false) => Dimensions::Area { length, width },
            _ => Dimensions::Volume {
                length,
                width,
                height,
            },
        }
    }
}

impl TryFrom<&LineItemInput> for LineItem {
    type Error = DomainError;

    fn try_from(input: &LineItemInput) -> Result<Self, Self::Error> {
        let hsn = input.hsn.trim();
        let item = LineItem {
            name: input.name.trim().to_string(),
            hsn: (!hsn.is_empty()).then(|| hsn.to_string()),
            count: parse_decimal_or_zero(&input.quantity),
            measure: ItemMeasure::new(input.dimensions(), input.input_unit, input.billing_unit),
            rate: parse_decimal_or_zero(&input.rate),
            discount: DiscountRule::parse(&input.discount),
            gst_rate: parse_decimal_or_zero(&input.gst_rate),
        };
        item.validate()?;
        Ok(item)
    }
}
