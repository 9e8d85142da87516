//! Decimal amount strings to and from i64 minor units.

/// Parse a decimal amount ("250", "250.5", "1,250.00", "-3.25") into cents.
/// At most two fraction digits; the second is implied zero when absent.
pub fn parse_amount_cents(raw: &str) -> Option<i64> {
    let mut s = raw.trim().replace(',', "");
    if s.is_empty() {
        return None;
    }
    let negative = s.starts_with('-');
    if s.starts_with('-') || s.starts_with('+') {
        s = s[1..].to_string();
    }
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() > 2 {
        return None;
    }
    let whole: i64 = if parts[0].is_empty() {
        0
    } else {
        parts[0].parse().ok()?
    };
    let frac: i64 = if parts.len() == 2 {
        let digits = parts[1];
        if digits.len() > 2 || digits.chars().any(|c| !c.is_ascii_digit()) {
            return None;
        }
        let mut v: i64 = if digits.is_empty() { 0 } else { digits.parse().ok()? };
        if digits.len() == 1 {
            v *= 10;
        }
        v
    } else {
        0
    };
    let cents = whole.checked_mul(100)?.checked_add(frac)?;
    Some(if negative { -cents } else { cents })
}

/// Format cents back to a two-decimal string ("25050" -> "250.50").
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
