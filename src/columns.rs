/// Column roles
///
/// Header labels are read once from the page and turned into roles. All
/// later formatting is driven by role, so the page may reorder columns
/// without breaking the report.
use crate::error::RunError;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    /// Security identifier (first unrecognized column)
    Name,
    LastPrice,
    MaxPrice,
    MinPrice,
    PercentChange,
    Volume,
    CashEffective,
    Date,
    Time,
    /// Carried through as rendered
    Other,
}

/// Roles the report cannot be built without
pub const REQUIRED_ROLES: [ColumnRole; 6] = [
    ColumnRole::LastPrice,
    ColumnRole::MaxPrice,
    ColumnRole::MinPrice,
    ColumnRole::PercentChange,
    ColumnRole::Volume,
    ColumnRole::CashEffective,
];

impl ColumnRole {
    /// Recognize a header label ("Último", "Máx.", "% Dif.", "Efectivo (miles €)", ...)
    pub fn from_header(label: &str) -> Option<ColumnRole> {
        let folded = fold_label(label);
        let role = if folded.starts_with("fecha") {
            ColumnRole::Date
        } else if folded.starts_with("hora") {
            ColumnRole::Time
        } else if folded.contains('%') || folded.contains("dif") {
            ColumnRole::PercentChange
        } else if folded.starts_with("ult") {
            ColumnRole::LastPrice
        } else if folded.starts_with("max") {
            ColumnRole::MaxPrice
        } else if folded.starts_with("min") {
            ColumnRole::MinPrice
        } else if folded.starts_with("vol") {
            ColumnRole::Volume
        } else if folded.starts_with("efectivo") {
            ColumnRole::CashEffective
        } else {
            return None;
        };
        Some(role)
    }

    /// Human-readable role name for error messages
    pub fn label(&self) -> &'static str {
        match self {
            ColumnRole::Name => "name",
            ColumnRole::LastPrice => "last price",
            ColumnRole::MaxPrice => "max price",
            ColumnRole::MinPrice => "min price",
            ColumnRole::PercentChange => "percent change",
            ColumnRole::Volume => "volume",
            ColumnRole::CashEffective => "cash effective",
            ColumnRole::Date => "date",
            ColumnRole::Time => "time",
            ColumnRole::Other => "other",
        }
    }
}

/// Lowercase and strip Spanish accents so "Máx." and "max" compare equal
fn fold_label(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' => 'a',
            'é' | 'è' => 'e',
            'í' | 'ì' => 'i',
            'ó' | 'ò' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            other => other,
        })
        .collect()
}

/// Role of every header column, in header order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    roles: Vec<ColumnRole>,
}

impl ColumnMap {
    /// Build the mapping from the observed header.
    ///
    /// The first occurrence of a role wins; later duplicates become `Other`.
    /// Missing any required numeric role is a header mismatch.
    pub fn from_headers(headers: &[String]) -> Result<Self, RunError> {
        let mut roles: Vec<ColumnRole> = Vec::with_capacity(headers.len());

        for header in headers {
            let role = match ColumnRole::from_header(header) {
                Some(role) if roles.contains(&role) => {
                    debug!("duplicate {} column {:?}, keeping the first", role.label(), header);
                    ColumnRole::Other
                }
                Some(role) => role,
                None if !roles.contains(&ColumnRole::Name) => ColumnRole::Name,
                None => ColumnRole::Other,
            };
            roles.push(role);
        }

        let missing: Vec<&str> =
            REQUIRED_ROLES.iter().filter(|role| !roles.contains(role)).map(|role| role.label()).collect();
        if !missing.is_empty() {
            return Err(RunError::HeaderMismatch(format!(
                "missing column(s) for {} in header {:?}",
                missing.join(", "),
                headers
            )));
        }

        Ok(Self { roles })
    }

    #[cfg(test)]
    pub fn roles(&self) -> &[ColumnRole] {
        &self.roles
    }

    pub fn role(&self, index: usize) -> ColumnRole {
        self.roles.get(index).copied().unwrap_or(ColumnRole::Other)
    }

    pub fn position(&self, role: ColumnRole) -> Option<usize> {
        self.roles.iter().position(|r| *r == role)
    }
}
