//! Money helpers: fixed rates, rounding and `$1,234.56` formatting.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Tax applied to every invoice subtotal (16%).
pub const TAX_RATE: Decimal = Decimal::from_parts(16, 0, 0, false, 2);

/// Income withholding estimate used by fiscal reports (10%).
pub const WITHHOLDING_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Largest price or unit price accepted on input (one trillion).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Sum that clamps at `Decimal::MAX` instead of overflowing.
pub fn sum_amounts(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |acc, amount| acc.saturating_add(amount))
}

/// Round to cents, halves away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Tax rate as a whole percentage label, e.g. `16`.
pub fn tax_percent_label() -> String {
    (TAX_RATE * Decimal::ONE_HUNDRED).normalize().to_string()
}

/// Parse a formatted amount such as `$5,800.00`.
///
/// Currency symbols, thousands separators and surrounding whitespace are ignored.
pub fn parse_currency(input: &str) -> Option<Decimal> {
    let cleaned: String = input
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Like [`parse_currency`], but a malformed amount counts as zero.
pub fn currency_or_zero(input: &str, record_id: &str) -> Decimal {
    parse_currency(input).unwrap_or_else(|| {
        tracing::warn!(
            record_id = %record_id,
            amount = %input,
            "Unparsable currency amount, treating as zero"
        );
        Decimal::ZERO
    })
}

/// Format as `$1,234.56`; negative amounts get a leading minus sign.
pub fn format_currency(value: Decimal) -> String {
    let rounded = round_money(value);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, dec_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{}", sign, grouped, dec_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formatted_amounts() {
        assert_eq!(parse_currency("$5,800.00"), Some(Decimal::new(580000, 2)));
        assert_eq!(parse_currency("1,234,567.5"), Some(Decimal::new(12345675, 1)));
        assert_eq!(parse_currency(" $12 "), Some(Decimal::new(12, 0)));
    }

    #[test]
    fn malformed_amounts_are_rejected_or_zeroed() {
        assert_eq!(parse_currency("$"), None);
        assert_eq!(parse_currency("twelve"), None);
        assert_eq!(currency_or_zero("N/A", "FACT-2024-0001"), Decimal::ZERO);
    }

    #[test]
    fn formats_with_thousands_separators() {
        assert_eq!(format_currency(Decimal::new(580000, 2)), "$5,800.00");
        assert_eq!(format_currency(Decimal::new(1234567891, 3)), "$1,234,567.89");
        assert_eq!(format_currency(Decimal::new(350, 0)), "$350.00");
        assert_eq!(format_currency(Decimal::new(-1005, 1)), "-$100.50");
        assert_eq!(format_currency(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(1005, 3)), Decimal::new(101, 2));
        assert_eq!(round_money(Decimal::new(1015, 3)), Decimal::new(102, 2));
    }

    #[test]
    fn tax_label_is_whole_percent() {
        assert_eq!(tax_percent_label(), "16");
    }
}
