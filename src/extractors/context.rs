// src/extractors/context.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::workbook::Cell;

// --- Constants ---
pub const DEFAULT_LOCATION_TOKEN: &str = "Niš";

/// Month abbreviations as they appear in the report drop-downs.
pub const MONTH_TOKENS: [&str; 12] = ["jan", "feb", "mar", "apr", "maj", "jun", "jul", "avg", "sep", "okt", "nov", "dec"];

const KEY_SEPARATOR: &str = " - ";

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("Failed to compile YEAR_RE"));

// --- Data Structures ---

/// Rolling (location, year, month) qualifiers for the rows that follow them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pub location: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
}

/// What kind of marker a row turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Location,
    Year,
    Month,
}

/// How unset context components show up in a composite key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyPolicy {
    /// `Niš - Matematika` when only the location is known.
    #[default]
    OmitMissing,
    /// `Niš -  -  - Matematika`: always four segments.
    Placeholder,
}

impl FromStr for KeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "omit-missing" | "omit" => Ok(KeyPolicy::OmitMissing),
            "placeholder" => Ok(KeyPolicy::Placeholder),
            other => Err(format!("unknown key policy '{}' (expected omit-missing or placeholder)", other)),
        }
    }
}

impl fmt::Display for KeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPolicy::OmitMissing => f.write_str("omit-missing"),
            KeyPolicy::Placeholder => f.write_str("placeholder"),
        }
    }
}

// --- Tracker ---

/// Watches rows for marker tokens and keeps the current context.
/// One tracker per table pass.
#[derive(Debug, Clone)]
pub struct ContextTracker {
    location_token: String,
    context: Context,
}

impl ContextTracker {
    pub fn new(location_token: impl Into<String>) -> Self {
        Self { location_token: location_token.into(), context: Context::default() }
    }

    #[cfg(test)]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Scans every cell of the row. A marker row updates the context and is
    /// reported back so the caller can skip it; any other row leaves the
    /// context untouched.
    pub fn observe(&mut self, row: &[Cell]) -> Option<Marker> {
        let texts: Vec<String> = row.iter().filter(|c| !c.is_empty()).map(Cell::text).collect();

        if let Some(location) = texts.iter().find(|t| **t == self.location_token) {
            tracing::trace!("Location marker: {}", location);
            self.context.location = Some(location.clone());
            return Some(Marker::Location);
        }
        if let Some(year) = texts.iter().find(|t| is_year(t)) {
            tracing::trace!("Year marker: {}", year);
            self.context.year = Some(year.clone());
            return Some(Marker::Year);
        }
        if let Some(month) = texts.iter().find(|t| is_month(t)) {
            tracing::trace!("Month marker: {}", month);
            self.context.month = Some(month.clone());
            return Some(Marker::Month);
        }
        None
    }

    /// True when `text` on its own would be read as a marker.
    pub fn is_marker_token(&self, text: &str) -> bool {
        text == self.location_token || is_year(text) || is_month(text)
    }

    pub fn composite_key(&self, subject: &str, policy: KeyPolicy) -> String {
        composite_key(&self.context, subject, policy)
    }
}

fn is_year(text: &str) -> bool {
    YEAR_RE.is_match(text)
}

fn is_month(text: &str) -> bool {
    let lower = text.to_lowercase();
    MONTH_TOKENS.contains(&lower.as_str())
}

/// Joins location, year, month and subject, in that order.
pub fn composite_key(context: &Context, subject: &str, policy: KeyPolicy) -> String {
    let parts = [context.location.as_deref(), context.year.as_deref(), context.month.as_deref()];
    match policy {
        KeyPolicy::OmitMissing => parts
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .chain(std::iter::once(subject))
            .collect::<Vec<_>>()
            .join(KEY_SEPARATOR),
        KeyPolicy::Placeholder => parts
            .into_iter()
            .map(|p| p.unwrap_or(""))
            .chain(std::iter::once(subject))
            .collect::<Vec<_>>()
            .join(KEY_SEPARATOR),
    }
}
