//! The three bill views, each a pure projection of a `BillComputation`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use forgebill_pricing::{BillComputation, SupplyKind};

use crate::format::{format_inr, format_quantity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// Editable item table the user types into.
    Input,
    /// Read-only copy laid out for printing.
    PrintCopy,
    /// GST breakdown by HSN and rate (GST bills only).
    GstTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<String>,
}

impl TableRow {
    fn new(cells: impl IntoIterator<Item = String>) -> Self {
        Self {
            cells: cells.into_iter().collect(),
        }
    }
}

/// Totals block under a table.
///
/// `total` is what this view adds up to from its own rows, or `None` when
/// the view is hidden for the bill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFooter {
    pub lines: Vec<(String, String)>,
    pub total: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedView {
    pub kind: ViewKind,
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    pub footer: ViewFooter,
}

/// A projection of the computed bill into one table.
pub trait BillView: Send + Sync {
    fn kind(&self) -> ViewKind;

    fn render(&self, computation: &BillComputation) -> RenderedView;

    /// The total this view must show for `computation`, if it is visible.
    fn expected_total(&self, computation: &BillComputation) -> Option<Decimal>;
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|h| h.to_string()).collect()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct InputTableView;

impl BillView for InputTableView {
    fn kind(&self) -> ViewKind {
        ViewKind::Input
    }

    fn render(&self, c: &BillComputation) -> RenderedView {
        let rows = c
            .lines
            .iter()
            .map(|l| {
                TableRow::new([
                    l.line_no.to_string(),
                    l.name.clone(),
                    l.dimensions.clone(),
                    l.count.normalize().to_string(),
                    format_quantity(l.quantity),
                    l.unit.clone(),
                    l.rate.normalize().to_string(),
                    l.discount_label.clone(),
                    l.total.to_string(),
                ])
            })
            .collect();

        let row_sum: Decimal = c.lines.iter().map(|l| l.total).sum();
        let total = row_sum + c.adjustment_total();

        RenderedView {
            kind: self.kind(),
            headers: headers(&[
                "#", "Item", "Size", "Qty", "Billed Qty", "Unit", "Rate", "Discount", "Amount",
            ]),
            rows,
            footer: ViewFooter {
                lines: vec![("Total".to_string(), total.to_string())],
                total: Some(total),
            },
        }
    }

    fn expected_total(&self, c: &BillComputation) -> Option<Decimal> {
        Some(c.grand_total)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PrintCopyView;

impl BillView for PrintCopyView {
    fn kind(&self) -> ViewKind {
        ViewKind::PrintCopy
    }

    fn render(&self, c: &BillComputation) -> RenderedView {
        let gst = c.kind.is_gst();
        let mut header_names = vec!["#", "Description"];
        if gst {
            header_names.push("HSN");
        }
        header_names.extend(["Qty", "Unit", "Rate", "Discount", "Taxable"]);
        if gst {
            header_names.push("GST %");
        }
        header_names.push("Amount");

        let rows = c
            .lines
            .iter()
            .map(|l| {
                let description = if l.dimensions.is_empty() {
                    l.name.clone()
                } else {
                    format!("{} ({})", l.name, l.dimensions)
                };
                let mut cells = vec![l.line_no.to_string(), description];
                if gst {
                    cells.push(l.hsn.clone().unwrap_or_default());
                }
                cells.extend([
                    format_quantity(l.quantity),
                    l.unit.clone(),
                    format_inr(l.rate),
                    format_inr(l.discount),
                    format_inr(l.taxable),
                ]);
                if gst {
                    cells.push(format!("{}%", l.gst_rate.normalize()));
                }
                cells.push(format_inr(l.total));
                TableRow::new(cells)
            })
            .collect();

        let taxable: Decimal = c.lines.iter().map(|l| l.taxable).sum();
        let cgst: Decimal = c.lines.iter().map(|l| l.tax.cgst).sum();
        let sgst: Decimal = c.lines.iter().map(|l| l.tax.sgst).sum();
        let igst: Decimal = c.lines.iter().map(|l| l.tax.igst).sum();

        let mut lines = vec![("Subtotal".to_string(), format_inr(c.subtotal))];
        if !c.discount_total.is_zero() {
            lines.push(("Discount".to_string(), format_inr(-c.discount_total)));
        }
        if gst {
            lines.push(("Taxable Value".to_string(), format_inr(taxable)));
            match c.supply {
                SupplyKind::Intrastate => {
                    lines.push(("CGST".to_string(), format_inr(cgst)));
                    lines.push(("SGST".to_string(), format_inr(sgst)));
                }
                SupplyKind::Interstate => lines.push(("IGST".to_string(), format_inr(igst))),
            }
        }
        for step in &c.adjustments {
            lines.push((step.label.clone(), format_inr(step.delta)));
        }

        let total = taxable + cgst + sgst + igst + c.adjustment_total();
        lines.push(("Grand Total".to_string(), format_inr(total)));
        lines.push(("Amount in words".to_string(), c.amount_in_words.clone()));

        RenderedView {
            kind: self.kind(),
            headers: headers(&header_names),
            rows,
            footer: ViewFooter {
                lines,
                total: Some(total),
            },
        }
    }

    fn expected_total(&self, c: &BillComputation) -> Option<Decimal> {
        Some(c.grand_total)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GstTableView;

impl BillView for GstTableView {
    fn kind(&self) -> ViewKind {
        ViewKind::GstTable
    }

    fn render(&self, c: &BillComputation) -> RenderedView {
        let header_names = match c.supply {
            SupplyKind::Intrastate => vec!["HSN", "Rate", "Taxable", "CGST", "SGST", "Total Tax"],
            SupplyKind::Interstate => vec!["HSN", "Rate", "Taxable", "IGST", "Total Tax"],
        };

        let Some(summary) = c.gst_summary.as_ref() else {
            return RenderedView {
                kind: self.kind(),
                headers: headers(&header_names),
                rows: Vec::new(),
                footer: ViewFooter::default(),
            };
        };

        let rows = summary
            .rows
            .iter()
            .map(|r| {
                let mut cells = vec![
                    r.hsn.clone(),
                    format!("{}%", r.rate.normalize()),
                    format_inr(r.taxable),
                ];
                match c.supply {
                    SupplyKind::Intrastate => {
                        cells.push(format_inr(r.tax.cgst));
                        cells.push(format_inr(r.tax.sgst));
                    }
                    SupplyKind::Interstate => cells.push(format_inr(r.tax.igst)),
                }
                cells.push(format_inr(r.total_tax()));
                TableRow::new(cells)
            })
            .collect();

        let taxable: Decimal = summary.rows.iter().map(|r| r.taxable).sum();
        let tax: Decimal = summary.rows.iter().map(|r| r.total_tax()).sum();
        let total = taxable + tax;

        RenderedView {
            kind: self.kind(),
            headers: headers(&header_names),
            rows,
            footer: ViewFooter {
                lines: vec![
                    ("Taxable".to_string(), format_inr(taxable)),
                    ("Total Tax".to_string(), format_inr(tax)),
                ],
                total: Some(total),
            },
        }
    }

    fn expected_total(&self, c: &BillComputation) -> Option<Decimal> {
        c.kind.is_gst().then_some(c.lines_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forgebill_pricing::{
        Adjustment, BillDraft, BillKind, DimensionUnit, Dimensions, DiscountRule, ItemMeasure,
        LineItem, PriceMode, RoundingMode,
    };
    use rust_decimal_macros::dec;

    fn gst_computation(supply: SupplyKind) -> BillComputation {
        BillDraft::new(
            BillKind::Gst {
                price_mode: PriceMode::Exclusive,
            },
            supply,
        )
        .with_line(LineItem {
            name: "Glass".to_string(),
            hsn: Some("7005".to_string()),
            count: dec!(2),
            measure: ItemMeasure::new(
                Dimensions::Area {
                    length: dec!(4),
                    width: dec!(8),
                },
                DimensionUnit::Feet,
                DimensionUnit::Feet,
            ),
            rate: dec!(85),
            discount: DiscountRule::Percent(dec!(10)),
            gst_rate: dec!(18),
        })
        .with_adjustment(Adjustment::round_off(RoundingMode::Nearest, Decimal::ONE))
        .compute()
        .unwrap()
    }

    #[test]
    fn input_view_lists_lines_and_totals() {
        let c = gst_computation(SupplyKind::Intrastate);
        let v = InputTableView.render(&c);
        assert_eq!(v.rows.len(), 1);
        assert_eq!(v.rows[0].cells[2], "4 x 8 ft");
        assert_eq!(v.rows[0].cells[4], "64");
        assert_eq!(v.rows[0].cells[5], "sq.ft");
        assert_eq!(v.rows[0].cells[7], "10%");
        assert_eq!(v.footer.total, Some(c.grand_total));
    }

    #[test]
    fn print_copy_shows_cgst_and_sgst_within_state() {
        let c = gst_computation(SupplyKind::Intrastate);
        let v = PrintCopyView.render(&c);
        assert!(v.headers.contains(&"HSN".to_string()));
        let labels: Vec<&str> = v.footer.lines.iter().map(|(l, _)| l.as_str()).collect();
        assert!(labels.contains(&"CGST"));
        assert!(labels.contains(&"SGST"));
        assert!(!labels.contains(&"IGST"));
        assert!(labels.contains(&"Round Off"));
        assert_eq!(v.footer.total, Some(c.grand_total));
        assert_eq!(v.rows[0].cells[1], "Glass (4 x 8 ft)");
        // 5440 gross - 544 discount = 4896 taxable; 18% => 881.28; 5777.28 rounds to 5777.
        assert_eq!(v.rows[0].cells[7], "4,896.00");
        assert_eq!(c.grand_total, dec!(5777));
    }

    #[test]
    fn gst_table_switches_columns_for_interstate() {
        let c = gst_computation(SupplyKind::Interstate);
        let v = GstTableView.render(&c);
        assert_eq!(v.headers, vec!["HSN", "Rate", "Taxable", "IGST", "Total Tax"]);
        assert_eq!(v.rows[0].cells, vec!["7005", "18%", "4,896.00", "881.28", "881.28"]);
        assert_eq!(v.footer.total, GstTableView.expected_total(&c));
    }

    #[test]
    fn gst_table_is_hidden_for_regular_bills() {
        let c = BillDraft::default()
            .with_line(LineItem::simple("Tea", dec!(1), dec!(10)))
            .compute()
            .unwrap();
        let v = GstTableView.render(&c);
        assert!(v.rows.is_empty());
        assert_eq!(v.footer.total, None);
        assert_eq!(GstTableView.expected_total(&c), None);

        let print = PrintCopyView.render(&c);
        assert!(!print.headers.contains(&"HSN".to_string()));
    }
}
