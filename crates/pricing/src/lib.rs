//! Line-item pricing and adjustment engine.
//!
//! Turns raw bill rows into a deterministic [`BillComputation`]:
//! dimension-based quantities, per-line discounts, GST split
//! (CGST/SGST or IGST), an ordered chain of global adjustments and the
//! amount in words. Everything here is a pure function of its inputs.

pub mod adjustment;
pub mod bill;
pub mod dimension;
pub mod discount;
pub mod gst;
pub mod line;
pub mod words;

pub use adjustment::{apply_adjustments, Adjustment, AdjustmentKind, AdjustmentStep, RoundingMode};
pub use bill::{BillComputation, BillDraft, BillKind, PriceMode};
pub use dimension::{DimensionUnit, Dimensions, ItemMeasure};
pub use discount::DiscountRule;
pub use gst::{GstSummary, GstSummaryRow, SupplyKind, TaxSplit};
pub use line::{LineComputation, LineItem, LineItemInput, PricingContext};
pub use words::amount_in_words;
