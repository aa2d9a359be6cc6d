//! Lenient amount parsing for model-supplied numbers.
//!
//! The model is asked for plain integers but regularly answers with
//! rupiah-formatted strings (`"Rp 1.500.000"`), decimal commas, or
//! placeholders such as `"-"`. Anything that does not read as a number
//! becomes zero so that column sums stay numeric.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

/// Parse an amount written in Indonesian or international style.
///
/// Returns `None` when no digits are present.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    let negative = trimmed.starts_with('-') || (trimmed.starts_with('(') && trimmed.ends_with(')'));

    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == ',' || c == '.');

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let dots = cleaned.matches('.').count();
    let commas = cleaned.matches(',').count();

    let normalized = match (dots, commas) {
        (0, 0) => cleaned.to_string(),
        (_, 0) => single_separator(cleaned, '.', dots),
        (0, _) => single_separator(cleaned, ',', commas),
        _ => {
            // Both present: whichever comes last is the decimal separator.
            let comma_pos = cleaned.rfind(',');
            let dot_pos = cleaned.rfind('.');
            match (comma_pos, dot_pos) {
                (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
                _ => cleaned.replace(',', ""),
            }
        }
    };

    let amount = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -amount } else { amount })
}

/// Resolve a string that uses only one kind of separator.
fn single_separator(s: &str, sep: char, count: usize) -> String {
    if count > 1 {
        return s.replace(sep, "");
    }

    let fraction_len = s.rsplit(sep).next().map(str::len).unwrap_or(0);
    if fraction_len == 3 {
        // "1.500" is fifteen hundred rupiah, not one and a half.
        s.replace(sep, "")
    } else {
        s.replace(sep, ".")
    }
}

/// Coerce an arbitrary JSON value into an amount, defaulting to zero.
pub fn coerce_amount(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok()))
            .unwrap_or(Decimal::ZERO),
        Value::String(s) => parse_amount(s).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

/// Sum amounts, clamping at `Decimal::MAX` / `Decimal::MIN` instead of
/// panicking. Model output is untrusted and may carry absurd magnitudes.
pub fn saturating_sum<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |acc, amount| acc.saturating_add(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_rupiah_amounts() {
        assert_eq!(parse_amount("Rp 1.500.000"), Some(dec("1500000")));
        assert_eq!(parse_amount("Rp1.500.000,50"), Some(dec("1500000.50")));
        assert_eq!(parse_amount("1.500"), Some(dec("1500")));
        assert_eq!(parse_amount("25.000,-"), Some(dec("25000")));
    }

    #[test]
    fn test_parse_international_amounts() {
        assert_eq!(parse_amount("1,500,000.50"), Some(dec("1500000.50")));
        assert_eq!(parse_amount("1234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("12,5"), Some(dec("12.5")));
        assert_eq!(parse_amount("1500000"), Some(dec("1500000")));
    }

    #[test]
    fn test_parse_negative_amounts() {
        assert_eq!(parse_amount("-2.000"), Some(dec("-2000")));
        assert_eq!(parse_amount("(150)"), Some(dec("-150")));
    }

    #[test]
    fn test_parse_placeholders() {
        assert_eq!(parse_amount("-"), None);
        assert_eq!(parse_amount("N/A"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_coerce_amount() {
        assert_eq!(coerce_amount(&json!(200)), dec("200"));
        assert_eq!(coerce_amount(&json!(2.5)), dec("2.5"));
        assert_eq!(coerce_amount(&json!("Rp 10.000")), dec("10000"));
        assert_eq!(coerce_amount(&json!("tidak terbaca")), Decimal::ZERO);
        assert_eq!(coerce_amount(&json!(null)), Decimal::ZERO);
        assert_eq!(coerce_amount(&json!({"amount": 5})), Decimal::ZERO);
    }

    #[test]
    fn test_saturating_sum() {
        assert_eq!(saturating_sum([dec("200"), dec("200")]), dec("400"));
        assert_eq!(saturating_sum(Vec::new()), Decimal::ZERO);

        let huge = dec("50000000000000000000000000000");
        assert_eq!(saturating_sum([huge, huge]), Decimal::MAX);
        assert_eq!(saturating_sum([-huge, -huge]), Decimal::MIN);
    }
}
