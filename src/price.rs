use std::sync::LazyLock;

use regex::Regex;

static NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+(\.\d{1,2})?$").unwrap());

/// Strip the currency token and all whitespace (narrow and non-breaking
/// spaces included) from a displayed price.
pub fn strip_price_text(text: &str, currency_token: &str) -> String {
    let without_token = if currency_token.is_empty() {
        text.to_string()
    } else {
        text.replace(currency_token, "")
    };
    without_token.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Parse a displayed price such as `"15 000 CFA"` into a number.
/// Only plain digits with at most two decimals are accepted, so
/// `"Prix sur demande"`, `"-5"`, `"inf"` and dot-grouped thousands like
/// `"15.000"` yield `None`.
pub fn parse_price(text: &str, currency_token: &str) -> Option<f64> {
    let stripped = strip_price_text(text, currency_token);
    if !NUMERIC_RE.is_match(&stripped) {
        return None;
    }
    let value = match stripped.parse::<u64>() {
        Ok(n) => n as f64,
        Err(_) => stripped.parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}
