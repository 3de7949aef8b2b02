//! Lenient numeric parsing for form-style input.
//!
//! Weight and quantity fields are free text. Anything that does not start with
//! a number is read as zero instead of being rejected, so a half-typed row
//! never blocks the running total.

/// Parse a weight the way a browser's `parseFloat` does.
///
/// Leading whitespace is skipped and the longest numeric prefix is used, so
/// `"2.5 gp"` reads as `2.5`. Empty, non-numeric and non-finite input gives `0.0`.
pub fn parse_weight(text: &str) -> f64 {
    let prefix = float_prefix(text.trim_start());
    if prefix.is_empty() {
        return 0.0;
    }
    match prefix.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Parse a quantity the way a browser's `parseInt` does (base 10).
///
/// `"3 torches"` reads as `3`, `"2.9"` as `2`. Non-numeric input gives `0`.
/// Values beyond the `i64` range saturate.
pub fn parse_quantity(text: &str) -> i64 {
    let s = text.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: &str = {
        let end = rest
            .bytes()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return 0;
    }

    match digits.parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    }
}

/// Parse a strictly numeric, non-negative weight.
///
/// Used where the input must be a real number rather than coerced, such as
/// editing a catalog weight. Returns `None` for anything else.
pub fn parse_strict_weight(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

/// Longest prefix of `s` that forms a decimal float literal.
fn float_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        mantissa_digits += j - frac_start;
        if mantissa_digits > 0 {
            i = j;
        }
    }

    if mantissa_digits == 0 {
        return "";
    }

    // Exponent only counts when at least one digit follows it
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    &s[..i]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weight_plain_numbers() {
        assert_eq!(parse_weight("10"), 10.0);
        assert_eq!(parse_weight("0.5"), 0.5);
        assert_eq!(parse_weight(".5"), 0.5);
        assert_eq!(parse_weight("5."), 5.0);
        assert_eq!(parse_weight("-3"), -3.0);
    }

    #[test]
    fn test_parse_weight_prefix_and_garbage() {
        assert_eq!(parse_weight("  2.5 gp"), 2.5);
        assert_eq!(parse_weight("1e2"), 100.0);
        assert_eq!(parse_weight("1e"), 1.0);
        assert_eq!(parse_weight("abc"), 0.0);
        assert_eq!(parse_weight(""), 0.0);
        assert_eq!(parse_weight("."), 0.0);
        assert_eq!(parse_weight("-"), 0.0);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("3"), 3);
        assert_eq!(parse_quantity("3 torches"), 3);
        assert_eq!(parse_quantity("2.9"), 2);
        assert_eq!(parse_quantity("-4"), -4);
        assert_eq!(parse_quantity(" +7"), 7);
        assert_eq!(parse_quantity("x"), 0);
        assert_eq!(parse_quantity(""), 0);
        assert_eq!(parse_quantity("99999999999999999999999"), i64::MAX);
    }

    #[test]
    fn test_parse_strict_weight() {
        assert_eq!(parse_strict_weight("4"), Some(4.0));
        assert_eq!(parse_strict_weight(" 0.1 "), Some(0.1));
        assert_eq!(parse_strict_weight("-1"), None);
        assert_eq!(parse_strict_weight("4kg"), None);
        assert_eq!(parse_strict_weight(""), None);
        assert_eq!(parse_strict_weight("NaN"), None);
    }
}
