//! Canonical in-memory models shared by every module.
//!
//! These are vendor-agnostic: whatever shape the remote API or the local cache
//! uses, collaborators convert into these types before handing data over.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::StockViewError;

/// A ticker symbol, trimmed and upper-cased.
///
/// Two symbols compare equal when their normalized text matches, so `"aapl"`
/// and `" AAPL "` parse to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Normalize and validate a raw symbol.
    ///
    /// Errors with [`StockViewError::InvalidSymbol`] when nothing is left after trimming.
    pub fn parse(raw: &str) -> Result<Self, StockViewError> {
        let s = raw.trim().to_uppercase();
        if s.is_empty() {
            return Err(StockViewError::InvalidSymbol(raw.to_string()));
        }
        Ok(Self(s))
    }

    /// The normalized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = StockViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = StockViewError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A tradable security. Read-only reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Unique identifier (e.g. "AAPL").
    pub symbol: Symbol,
    /// Display name (e.g. "Apple Inc.").
    pub name: String,
    /// Industry or sector label.
    #[serde(default)]
    pub industry: String,
}

/// One sample of an instrument's price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Sample time (UTC).
    pub timestamp: DateTime<Utc>,
    /// Price in the quote currency.
    pub absolute_value: f64,
    /// Change relative to the series' reference price, in percent.
    pub percentage_value: f64,
}

/// Sort a series ascending by timestamp.
///
/// Sources may deliver newest-first; the sort is stable so points sharing a
/// timestamp keep their delivered order.
pub fn sort_chronologically(series: &mut [TimeSeriesPoint]) {
    series.sort_by_key(|p| p.timestamp);
}
