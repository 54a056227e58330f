/// Report formatting
///
/// Two phases per row: cell texts are parsed into a `SecurityQuote` of
/// canonical values, then each value is rendered back according to its
/// column role. The percent-change cell also gets a style tag for the
/// artifact writer.
use crate::columns::{ColumnMap, ColumnRole};
use crate::locale;
use crate::types::{FormattedCell, FormattedRow, QuoteValue, RawRow, SecurityQuote, StyleTag};

/// Parse a cell's text according to its role
pub fn parse_value(role: ColumnRole, text: &str) -> QuoteValue {
    match role {
        ColumnRole::LastPrice
        | ColumnRole::MaxPrice
        | ColumnRole::MinPrice
        | ColumnRole::Volume
        | ColumnRole::CashEffective => QuoteValue::Number(locale::parse_locale_number(text)),
        ColumnRole::PercentChange => QuoteValue::Number(locale::parse_locale_percent(text)),
        ColumnRole::Name | ColumnRole::Date | ColumnRole::Time | ColumnRole::Other => {
            QuoteValue::Text(text.to_string())
        }
    }
}

/// Render a parsed value according to its role
pub fn format_value(role: ColumnRole, value: &QuoteValue) -> FormattedCell {
    let number = match value {
        QuoteValue::Text(text) => return FormattedCell::plain(text.clone()),
        QuoteValue::Number(number) => *number,
    };

    match role {
        ColumnRole::LastPrice | ColumnRole::MaxPrice | ColumnRole::MinPrice => {
            FormattedCell::plain(locale::format_price(number))
        }
        ColumnRole::Volume | ColumnRole::CashEffective => FormattedCell::plain(locale::format_currency_like(number)),
        ColumnRole::PercentChange => FormattedCell::styled(locale::format_percent(number), percent_style(number)),
        // Numbers under a text role only happen if a caller mixes maps up
        _ => FormattedCell::plain(locale::format_currency_like(number)),
    }
}

/// Style for a percent change: sign of the value, neutral when missing
pub fn percent_style(value: Option<f64>) -> StyleTag {
    match value {
        Some(v) if v > 0.0 => StyleTag::Positive,
        Some(v) if v < 0.0 => StyleTag::Negative,
        _ => StyleTag::Neutral,
    }
}

/// Parse one tradable row into canonical values
pub fn to_quote(row: &RawRow, map: &ColumnMap) -> SecurityQuote {
    let values: Vec<QuoteValue> =
        row.texts().enumerate().map(|(idx, text)| parse_value(map.role(idx), text)).collect();

    let name = map
        .position(ColumnRole::Name)
        .and_then(|idx| row.cells.get(idx))
        .map(|cell| cell.text.clone())
        .unwrap_or_default();

    SecurityQuote { name, values }
}

/// Render a parsed quote into display cells
pub fn format_quote(quote: &SecurityQuote, map: &ColumnMap) -> FormattedRow {
    quote.values.iter().enumerate().map(|(idx, value)| format_value(map.role(idx), value)).collect()
}

/// Parse and render every tradable row
pub fn format_rows(rows: &[RawRow], map: &ColumnMap) -> Vec<FormattedRow> {
    rows.iter().map(|row| format_quote(&to_quote(row, map), map)).collect()
}

#[cfg(test)]
#[path = "format_test.rs"]
mod format_test;
