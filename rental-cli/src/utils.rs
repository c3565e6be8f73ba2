use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Trims whitespace, a trailing `€` or `%`, and comma thousands separators.
fn normalize_decimal_input(s: &str) -> String {
    s.trim()
        .trim_end_matches(['€', '%'])
        .trim()
        .replace(',', "")
}

/// Parses a command-line amount such as `"320,000"`, `"3.5%"` or `"1450€"`.
///
/// Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::error!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Groups the integer digits of `value` in threes with `.` (the de-DE style
/// the dashboards use). `value` is rounded to a whole number first.
pub fn format_grouped(value: Decimal) -> String {
    let whole = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = whole.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if whole.is_sign_negative() && !whole.is_zero() {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// `320000` -> `"320.000€"`.
pub fn format_euros(value: Decimal) -> String {
    format!("{}€", format_grouped(value))
}

/// Like [`format_euros`] but always carries a sign, for cash flows.
pub fn format_signed_euros(value: Decimal) -> String {
    if value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero) > Decimal::ZERO {
        format!("+{}", format_euros(value))
    } else {
        format_euros(value)
    }
}

/// Two decimal places and a percent sign, e.g. `"5.44%"`.
pub fn format_percent(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}%")
}

/// Formats an optional value, using "—" when `None`.
pub fn opt_display<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "—".to_string())
}
