//! Wager amount parsing and money formatting.
//!
//! The affiliate API reports wagered amounts as decimal strings. Parsing is
//! deliberately lenient: a missing or malformed amount counts as zero so a
//! single bad row never takes the page down.

/// Parses a textual wager amount. Absent or empty input counts as `"0"`;
/// the longest leading float prefix is used (sign, decimal point, exponent);
/// anything that does not yield a finite number yields `0.0`.
pub fn parse_amount(raw: Option<&str>) -> f64 {
    let text = match raw {
        Some(text) if !text.is_empty() => text,
        _ => "0",
    };

    match float_prefix(text).parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Full-string numeric conversion used by the prize-table parser: leading
/// and trailing whitespace is ignored, an empty token converts to zero, and
/// anything else must parse as a finite float in its entirety.
pub(crate) fn js_number(token: &str) -> Option<f64> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn float_prefix(text: &str) -> &str {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut idx = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        idx = 1;
    }

    let mut mantissa_digits = 0;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
        mantissa_digits += 1;
    }
    if idx < bytes.len() && bytes[idx] == b'.' {
        idx += 1;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
            mantissa_digits += 1;
        }
    }
    if mantissa_digits == 0 {
        return "";
    }

    // An exponent is only part of the prefix when at least one digit follows.
    let mantissa_end = idx;
    if idx < bytes.len() && (bytes[idx] == b'e' || bytes[idx] == b'E') {
        let mut exp_idx = idx + 1;
        if matches!(bytes.get(exp_idx), Some(b'+') | Some(b'-')) {
            exp_idx += 1;
        }
        let exp_digits_start = exp_idx;
        while exp_idx < bytes.len() && bytes[exp_idx].is_ascii_digit() {
            exp_idx += 1;
        }
        idx = if exp_idx > exp_digits_start {
            exp_idx
        } else {
            mantissa_end
        };
    }

    &trimmed[..idx]
}

/// Formats a wagered amount as en-US USD, e.g. `$1,234.56`. Wagered totals
/// stay USD to match the backend numbers regardless of the prize currency.
/// Non-finite amounts (a sum of valid wagers can overflow) format as zero.
pub fn format_usd(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let cents = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = cents
        .split_once('.')
        .expect("two-decimal formatting always contains a point");
    let grouped = group_thousands(int_part);

    if amount < 0.0 {
        format!("-${grouped}.{frac_part}")
    } else {
        format!("${grouped}.{frac_part}")
    }
}

/// Formats a prize as a whole amount in the configured currency,
/// e.g. `C$1,250`.
pub fn format_prize(amount: f64, symbol: &str) -> String {
    let whole = if amount.is_finite() {
        amount.round() as i64
    } else {
        0
    };
    let sign = if whole < 0 { "-" } else { "" };
    format!("{symbol}{sign}{}", group_thousands(&whole.abs().to_string()))
}

/// Resolves a display symbol for an ISO currency code. Unknown codes fall
/// back to the code itself followed by a space.
pub fn currency_symbol(code: &str) -> String {
    match code.trim().to_ascii_uppercase().as_str() {
        "USD" => "$".to_string(),
        "CAD" => "C$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        other => format!("{other} "),
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
