/// Numeric locale codec
///
/// The source page writes numbers the European way: a dot groups thousands
/// and a comma separates decimals ("1.234,56"). This module parses that text
/// into canonical `f64` values and renders canonical values back into the
/// display strings used by the report.
///
/// `None` is the missing sentinel. Parsing never fails loudly: empty,
/// placeholder ("-"), malformed and non-finite input all map to `None`,
/// and every formatter renders `None` as `"-"`.

/// Placeholder text for a missing value
pub const MISSING: &str = "-";

/// Parse a locale number such as "1.234,56" or "12,5".
pub fn parse_locale_number(text: &str) -> Option<f64> {
    let trimmed = text.trim().trim_end_matches('€').trim_end();
    if trimmed.is_empty() || trimmed == MISSING {
        return None;
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+')) {
        return None;
    }

    let canonical: String = trimmed
        .chars()
        .filter(|&c| c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    let value: f64 = canonical.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Parse a locale percentage such as "-1,25%" or "0,40 %".
pub fn parse_locale_percent(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let without_sign = trimmed.strip_suffix('%').unwrap_or(trimmed);
    parse_locale_number(without_sign)
}

/// Render a price: up to 4 decimals, trailing zeros dropped ("12,5", "12").
pub fn format_price(value: Option<f64>) -> String {
    match value {
        Some(v) => trim_fraction(with_decimal_comma(v, 4)),
        None => MISSING.to_string(),
    }
}

/// Render a volume or cash amount: up to 2 decimals, no grouping ("1234,5", "1000").
pub fn format_currency_like(value: Option<f64>) -> String {
    match value {
        Some(v) => trim_fraction(with_decimal_comma(v, 2)),
        None => MISSING.to_string(),
    }
}

/// Render a percentage: exactly 2 decimals plus "%", sign kept, no "+".
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}%", with_decimal_comma(v, 2)),
        None => MISSING.to_string(),
    }
}

fn with_decimal_comma(value: f64, digits: usize) -> String {
    let fixed = format!("{:.*}", digits, value).replace('.', ",");
    unsigned_if_zero(fixed)
}

/// "-0,00" and friends come from tiny negatives and -0.0; show them unsigned.
fn unsigned_if_zero(s: String) -> String {
    match s.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == ',') => rest.to_string(),
        _ => s,
    }
}

fn trim_fraction(s: String) -> String {
    if !s.contains(',') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches(',').to_string()
}
