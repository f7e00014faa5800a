//! Filter selector parsing shared by the data, filter and export endpoints.
//!
//! Encoding: `All` (any case), blank or missing means everything; `__NONE__`
//! means nothing; otherwise a comma-separated list of literal values.

use crate::index::WILDCARD;

/// Sentinel sent by the UI when every option of a filter is deselected.
pub const NONE_SENTINEL: &str = "__NONE__";

/// Parsed selector values. Empty means "match nothing".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection(Vec<String>);

impl Selection {
    pub fn all() -> Self {
        Selection(vec![WILDCARD.to_string()])
    }

    pub fn none() -> Self {
        Selection(Vec::new())
    }

    pub fn parse(raw: Option<&str>) -> Self {
        let text = raw.unwrap_or("").trim();
        if text.is_empty() {
            return Self::all();
        }
        if text == NONE_SENTINEL {
            return Self::none();
        }
        if text.eq_ignore_ascii_case(WILDCARD) {
            return Self::all();
        }

        let parts: Vec<String> = text
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        if parts.is_empty() {
            Self::all()
        } else {
            Selection(parts)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when any selected value is the wildcard.
    pub fn includes_all(&self) -> bool {
        self.0.iter().any(|v| v.eq_ignore_ascii_case(WILDCARD))
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }
}
