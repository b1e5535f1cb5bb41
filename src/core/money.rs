//! USD amounts as shown in the walkthrough.
//!
//! Amounts are held as [`Decimal`] and rendered with zero fractional digits
//! (`$14,152,500`), rounding half away from zero.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Largest deal amount accepted from text input (one quadrillion dollars)
const MAX_PARSED_AMOUNT: i64 = 1_000_000_000_000_000;

/// Platform fee rate (10%)
pub fn platform_fee_rate() -> Decimal {
    Decimal::new(10, 2)
}

/// Disbursement fee rate (1%)
pub fn disbursement_fee_rate() -> Decimal {
    Decimal::new(1, 2)
}

/// Round to the nearest whole dollar
pub fn round_whole(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount as whole US dollars with thousands separators
pub fn format_usd(amount: Decimal) -> String {
    let rounded = round_whole(amount);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Parse a user-typed amount.
///
/// Every character other than digits and `.` is dropped, then the longest
/// leading decimal number is read (`"1.2.3"` reads as `1.2`). Returns `None`
/// when no number remains or it exceeds the accepted range.
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut seen_dot = false;
    let prefix: String = cleaned
        .chars()
        .take_while(|c| {
            if *c == '.' {
                if seen_dot {
                    return false;
                }
                seen_dot = true;
            }
            true
        })
        .collect();
    let prefix = prefix.trim_end_matches('.');

    if !prefix.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = if prefix.starts_with('.') {
        format!("0{}", prefix)
    } else {
        prefix.to_string()
    };

    Decimal::from_str(&normalized)
        .ok()
        .filter(|value| *value <= Decimal::from(MAX_PARSED_AMOUNT))
}

/// Parse a user-typed amount, treating anything unreadable as zero
pub fn sanitize_amount(input: &str) -> Decimal {
    parse_amount(input).unwrap_or(Decimal::ZERO)
}

/// A deal amount with its derived charges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DealAmounts {
    pub deal: Decimal,
    pub platform_fee: Decimal,
    pub disbursement_fee: Decimal,
    pub total: Decimal,
}

impl DealAmounts {
    /// Derive fees and total from a deal amount.
    ///
    /// The deal amount is rounded to whole dollars first so the derived
    /// figures agree with the displayed deal amount. Negative input is
    /// treated as zero.
    pub fn from_deal(deal: Decimal) -> Self {
        let deal = round_whole(deal.max(Decimal::ZERO));
        let platform_fee = deal * platform_fee_rate();
        let disbursement_fee = deal * disbursement_fee_rate();
        let total = deal + platform_fee + disbursement_fee;

        Self {
            deal,
            platform_fee,
            disbursement_fee,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_seed_deal_amounts() {
        let amounts = DealAmounts::from_deal(Decimal::from(12_750_000));
        assert_eq!(format_usd(amounts.deal), "$12,750,000");
        assert_eq!(format_usd(amounts.platform_fee), "$1,275,000");
        assert_eq!(format_usd(amounts.disbursement_fee), "$127,500");
        assert_eq!(format_usd(amounts.total), "$14,152,500");
    }

    #[test]
    fn test_format_grouping() {
        assert_eq!(format_usd(Decimal::ZERO), "$0");
        assert_eq!(format_usd(Decimal::from(999)), "$999");
        assert_eq!(format_usd(Decimal::from(1000)), "$1,000");
        assert_eq!(format_usd(Decimal::from(50_000_000)), "$50,000,000");
        assert_eq!(format_usd(Decimal::from(-1234)), "-$1,234");
    }

    #[test]
    fn test_format_rounds_half_away_from_zero() {
        assert_eq!(format_usd(Decimal::new(9995, 1)), "$1,000");
        assert_eq!(format_usd(Decimal::new(12_345, 1)), "$1,235");
        assert_eq!(format_usd(Decimal::new(12_344, 1)), "$1,234");
        assert_eq!(format_usd(Decimal::new(-4, 1)), "$0");
    }

    #[test]
    fn test_parse_formatted_amount() {
        assert_eq!(parse_amount("$12,750,000"), Some(Decimal::from(12_750_000)));
        assert_eq!(parse_amount("8500000"), Some(Decimal::from(8_500_000)));
    }

    #[test]
    fn test_parse_malformed_amounts() {
        assert_eq!(sanitize_amount(""), Decimal::ZERO);
        assert_eq!(sanitize_amount("abc"), Decimal::ZERO);
        assert_eq!(sanitize_amount("."), Decimal::ZERO);
        assert_eq!(sanitize_amount("$-"), Decimal::ZERO);
        assert_eq!(sanitize_amount("1.2.3"), Decimal::new(12, 1));
        assert_eq!(sanitize_amount(".5"), Decimal::new(5, 1));
        assert_eq!(sanitize_amount("7."), Decimal::from(7));
        assert_eq!(sanitize_amount("99999999999999999999"), Decimal::ZERO);
    }

    #[test]
    fn test_negative_deal_is_zero() {
        let amounts = DealAmounts::from_deal(Decimal::from(-500));
        assert_eq!(amounts.total, Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn total_is_rounded_111_percent_of_deal(dollars in 0i64..1_000_000_000_000) {
            let amounts = DealAmounts::from_deal(Decimal::from(dollars));
            let expected = round_whole(Decimal::from(dollars) * Decimal::new(111, 2));
            prop_assert_eq!(round_whole(amounts.total), expected);
            prop_assert_eq!(format_usd(amounts.total), format_usd(expected));
        }
    }
}
