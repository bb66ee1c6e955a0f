//! Sequential bill numbers (`INV-0001`, `INV-0002`, ...).

use forgebill_core::{DomainError, DomainResult};

/// Format a bill number from its prefix and sequence.
pub fn format_bill_number(prefix: &str, seq: u64) -> String {
    format!("{prefix}-{seq:04}")
}

/// Next number after the highest existing one that uses `prefix`.
///
/// Numbers with another prefix or an unparsable suffix are ignored, so a
/// fresh store starts at `{prefix}-0001`.
pub fn next_bill_number<'a>(
    prefix: &str,
    existing: impl IntoIterator<Item = &'a str>,
) -> DomainResult<String> {
    let max = existing
        .into_iter()
        .filter_map(|number| number.strip_prefix(prefix)?.strip_prefix('-')?.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    let next = max
        .checked_add(1)
        .ok_or_else(|| DomainError::invariant(format!("bill numbers for {prefix:?} are exhausted")))?;
    Ok(format_bill_number(prefix, next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_to_four_digits() {
        assert_eq!(format_bill_number("INV", 7), "INV-0007");
        assert_eq!(format_bill_number("GST", 12345), "GST-12345");
    }

    #[test]
    fn next_number_follows_highest_with_prefix() {
        let existing = ["INV-0003", "INV-0010", "EST-0099", "INV-x", "INV0004"];
        assert_eq!(next_bill_number("INV", existing).unwrap(), "INV-0011");
        assert_eq!(next_bill_number("EST", existing).unwrap(), "EST-0100");
        assert_eq!(next_bill_number("CN", []).unwrap(), "CN-0001");
    }

    #[test]
    fn exhausted_sequence_is_an_error() {
        let existing = ["INV-18446744073709551615"];
        let err = next_bill_number("INV", existing).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }
}
