//! Numeric text handling for values the backend increments as decimals.

/// Strips formatting artifacts a backend may leave on decimal text: surrounding whitespace, a
/// leading `+`, trailing fractional zeros and a dangling decimal point.
pub fn normalize_decimal(text: &str) -> String {
    let text = text.trim();
    let text = text.strip_prefix('+').unwrap_or(text);

    let normalized = if text.contains('.') && !text.contains(['e', 'E']) {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    };

    match normalized {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Formats a float the way INCRBYFLOAT replies: shortest representation, no exponent, no
/// trailing zeros.
pub fn format_float(value: f64) -> String {
    normalize_decimal(&value.to_string())
}

pub fn parse_integer(bytes: &[u8]) -> Option<i64> {
    std::str::from_utf8(bytes).ok()?.parse::<i64>().ok()
}

/// Parses a finite float. NaN and infinities are rejected.
pub fn parse_float(bytes: &[u8]) -> Option<f64> {
    std::str::from_utf8(bytes)
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
