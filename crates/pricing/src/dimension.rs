//! Variable-dimension quantities (length, area, volume).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use forgebill_core::{round_quantity, DomainError, DomainResult, ValueObject};

/// Unit a dimension is measured or billed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionUnit {
    Millimeter,
    Centimeter,
    Meter,
    Inch,
    #[default]
    Feet,
}

impl DimensionUnit {
    /// Exact length of one unit in metres.
    pub fn metres(self) -> Decimal {
        match self {
            DimensionUnit::Millimeter => Decimal::new(1, 3),
            DimensionUnit::Centimeter => Decimal::new(1, 2),
            DimensionUnit::Meter => Decimal::ONE,
            DimensionUnit::Inch => Decimal::new(254, 4),
            DimensionUnit::Feet => Decimal::new(3048, 4),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            DimensionUnit::Millimeter => "mm",
            DimensionUnit::Centimeter => "cm",
            DimensionUnit::Meter => "m",
            DimensionUnit::Inch => "in",
            DimensionUnit::Feet => "ft",
        }
    }
}

/// Which dimensions an item is priced by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Dimensions {
    /// Plain count; the measure is 1.
    #[default]
    None,
    Length {
        length: Decimal,
    },
    Area {
        length: Decimal,
        width: Decimal,
    },
    Volume {
        length: Decimal,
        width: Decimal,
        height: Decimal,
    },
}

impl Dimensions {
    /// Number of linear dimensions multiplied together.
    pub fn arity(&self) -> u32 {
        match self {
            Dimensions::None => 0,
            Dimensions::Length { .. } => 1,
            Dimensions::Area { .. } => 2,
            Dimensions::Volume { .. } => 3,
        }
    }

    fn values(&self) -> Vec<Decimal> {
        match self {
            Dimensions::None => Vec::new(),
            Dimensions::Length { length } => vec![*length],
            Dimensions::Area { length, width } => vec![*length, *width],
            Dimensions::Volume {
                length,
                width,
                height,
            } => vec![*length, *width, *height],
        }
    }
}

/// Dimensions of an item together with the units they are entered and billed in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMeasure {
    pub dimensions: Dimensions,
    pub input_unit: DimensionUnit,
    pub billing_unit: DimensionUnit,
}

impl ValueObject for ItemMeasure {}

impl ItemMeasure {
    /// A plain count measure.
    pub fn count() -> Self {
        Self::default()
    }

    pub fn new(dimensions: Dimensions, input_unit: DimensionUnit, billing_unit: DimensionUnit) -> Self {
        Self {
            dimensions,
            input_unit,
            billing_unit,
        }
    }

    /// Measure of one piece in billing units (area in billing-unit², etc.).
    ///
    /// The raw product is scaled once by `(input/billing)^arity` so exact
    /// conversions like inches to feet stay exact.
    pub fn measure(&self) -> DomainResult<Decimal> {
        let values = self.dimensions.values();
        if values.iter().any(|v| *v < Decimal::ZERO) {
            return Err(DomainError::validation("dimensions cannot be negative"));
        }
        if values.is_empty() {
            return Ok(Decimal::ONE);
        }

        let overflow = || DomainError::invariant("dimension product overflow");
        let mut product = Decimal::ONE;
        let mut numerator = Decimal::ONE;
        let mut denominator = Decimal::ONE;
        for v in values {
            product = product.checked_mul(v).ok_or_else(overflow)?;
            numerator = numerator
                .checked_mul(self.input_unit.metres())
                .ok_or_else(overflow)?;
            denominator = denominator
                .checked_mul(self.billing_unit.metres())
                .ok_or_else(overflow)?;
        }

        product
            .checked_mul(numerator)
            .and_then(|p| p.checked_div(denominator))
            .ok_or_else(overflow)
    }

    /// Effective billable quantity for `count` pieces, rounded to 3 places.
    pub fn quantity(&self, count: Decimal) -> DomainResult<Decimal> {
        if count < Decimal::ZERO {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        let measure = self.measure()?;
        let quantity = count
            .checked_mul(measure)
            .ok_or_else(|| DomainError::invariant("quantity overflow"))?;
        Ok(round_quantity(quantity))
    }

    /// Unit label the rate is quoted per (`"pcs"`, `"ft"`, `"sq.ft"`, `"cu.m"`).
    pub fn unit_label(&self) -> String {
        let symbol = self.billing_unit.symbol();
        match self.dimensions.arity() {
            0 => "pcs".to_string(),
            1 => symbol.to_string(),
            2 => format!("sq.{symbol}"),
            _ => format!("cu.{symbol}"),
        }
    }

    /// Dimensions as typed, e.g. `"4 x 8 ft"`; empty for plain counts.
    pub fn describe(&self) -> String {
        let values = self.dimensions.values();
        if values.is_empty() {
            return String::new();
        }
        let joined = values
            .iter()
            .map(|v| v.normalize().to_string())
            .collect::<Vec<_>>()
            .join(" x ");
        format!("{joined} {}", self.input_unit.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn plain_count_measures_one() {
        let m = ItemMeasure::count();
        assert_eq!(m.measure().unwrap(), Decimal::ONE);
        assert_eq!(m.quantity(dec!(7)).unwrap(), dec!(7));
        assert_eq!(m.unit_label(), "pcs");
        assert_eq!(m.describe(), "");
    }

    #[test]
    fn area_in_inches_billed_in_square_feet_is_exact() {
        let m = ItemMeasure::new(
            Dimensions::Area {
                length: dec!(48),
                width: dec!(96),
            },
            DimensionUnit::Inch,
            DimensionUnit::Feet,
        );
        assert_eq!(m.measure().unwrap(), dec!(32));
        assert_eq!(m.quantity(dec!(2)).unwrap(), dec!(64));
        assert_eq!(m.unit_label(), "sq.ft");
        assert_eq!(m.describe(), "48 x 96 in");
    }

    #[test]
    fn volume_in_centimetres_billed_in_metres() {
        let m = ItemMeasure::new(
            Dimensions::Volume {
                length: dec!(200),
                width: dec!(50),
                height: dec!(10),
            },
            DimensionUnit::Centimeter,
            DimensionUnit::Meter,
        );
        assert_eq!(m.measure().unwrap(), dec!(0.1));
        assert_eq!(m.unit_label(), "cu.m");
    }

    #[test]
    fn length_quantity_rounds_to_three_places() {
        let m = ItemMeasure::new(
            Dimensions::Length { length: dec!(10) },
            DimensionUnit::Inch,
            DimensionUnit::Feet,
        );
        // 10 / 12 ft
        assert_eq!(m.quantity(Decimal::ONE).unwrap(), dec!(0.833));
    }

    #[test]
    fn zero_dimension_gives_zero_quantity() {
        let m = ItemMeasure::new(
            Dimensions::Area {
                length: dec!(0),
                width: dec!(5),
            },
            DimensionUnit::Feet,
            DimensionUnit::Feet,
        );
        assert_eq!(m.quantity(dec!(3)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn negative_inputs_are_rejected() {
        let m = ItemMeasure::new(
            Dimensions::Length { length: dec!(-1) },
            DimensionUnit::Feet,
            DimensionUnit::Feet,
        );
        assert!(matches!(m.measure(), Err(DomainError::Validation(_))));
        assert!(ItemMeasure::count().quantity(dec!(-2)).is_err());
    }
}
