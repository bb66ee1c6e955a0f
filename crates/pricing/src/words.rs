//! Amount in words, Indian numbering (crore, lakh, thousand).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use forgebill_core::round_money;

const ONES: [&str; 20] = [
    "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten",
    "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

fn below_hundred(n: u128, out: &mut Vec<&'static str>) {
    debug_assert!(n < 100);
    if n < 20 {
        out.push(ONES[n as usize]);
    } else {
        out.push(TENS[(n / 10) as usize]);
        if n % 10 != 0 {
            out.push(ONES[(n % 10) as usize]);
        }
    }
}

fn push_words(n: u128, out: &mut Vec<&'static str>) {
    const CRORE: u128 = 10_000_000;
    const LAKH: u128 = 100_000;
    const THOUSAND: u128 = 1_000;

    let mut n = n;
    if n >= CRORE {
        push_words(n / CRORE, out);
        out.push("Crore");
        n %= CRORE;
    }
    for (size, name) in [(LAKH, "Lakh"), (THOUSAND, "Thousand"), (100, "Hundred")] {
        if n >= size {
            below_hundred(n / size, out);
            out.push(name);
            n %= size;
        }
    }
    if n > 0 {
        below_hundred(n, out);
    }
}

/// Words for a whole number (`1_25_000` -> `"One Lakh Twenty Five Thousand"`).
pub fn number_in_words(n: u128) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }
    let mut out = Vec::new();
    push_words(n, &mut out);
    out.join(" ")
}

/// Printed "amount in words" line for a rupee amount.
///
/// Negative amounts are spelled by magnitude; the bill never produces one.
pub fn amount_in_words(amount: Decimal) -> String {
    let amount = round_money(amount.abs());
    let rupees = amount.trunc().to_u128().unwrap_or_default();
    let paise = (amount.fract() * Decimal::ONE_HUNDRED)
        .to_u128()
        .unwrap_or_default();

    match (rupees, paise) {
        (_, 0) => format!("Rupees {} Only", number_in_words(rupees)),
        (0, p) => format!("{} Paise Only", number_in_words(p)),
        (r, p) => format!(
            "Rupees {} and {} Paise Only",
            number_in_words(r),
            number_in_words(p)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn small_numbers() {
        assert_eq!(number_in_words(0), "Zero");
        assert_eq!(number_in_words(15), "Fifteen");
        assert_eq!(number_in_words(40), "Forty");
        assert_eq!(number_in_words(101), "One Hundred One");
    }

    #[test]
    fn indian_grouping() {
        assert_eq!(number_in_words(125_000), "One Lakh Twenty Five Thousand");
        assert_eq!(
            number_in_words(12_34_56_789),
            "Twelve Crore Thirty Four Lakh Fifty Six Thousand Seven Hundred Eighty Nine"
        );
        assert_eq!(number_in_words(1_000_000_000_000), "One Lakh Crore");
    }

    #[test]
    fn rupees_and_paise() {
        assert_eq!(
            amount_in_words(dec!(1234.50)),
            "Rupees One Thousand Two Hundred Thirty Four and Fifty Paise Only"
        );
        assert_eq!(amount_in_words(dec!(0)), "Rupees Zero Only");
        assert_eq!(amount_in_words(dec!(0.05)), "Five Paise Only");
        assert_eq!(amount_in_words(dec!(7.005)), "Rupees Seven and One Paise Only");
    }
}
