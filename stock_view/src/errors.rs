use thiserror::Error;

use crate::models::Symbol;

/// The unified error type for the `stock_view` crate.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StockViewError {
    /// A remote data source was unreachable or returned malformed data.
    ///
    /// Distinct from a source that legitimately returned nothing.
    #[error("Data fetch error from {source_name}: {message}")]
    DataFetch {
        /// Which collaborator failed (e.g. "instruments", "watchlist_remote").
        source_name: String,
        /// Human readable cause.
        message: String,
    },

    /// A display filter argument was out of range (e.g. a negative day window).
    #[error("Invalid filter argument: {0}")]
    InvalidFilterArgument(String),

    /// Writing a watch-list entry to the local cache failed.
    #[error("Persistence failure: {0}")]
    Persistence(#[from] PersistenceFailure),

    /// A symbol was empty after normalization.
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    /// The operation is not allowed in the controller's current phase.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration could not be used.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A write-back to the local cache that did not succeed.
///
/// The in-memory watch list keeps the symbol regardless; this value only
/// reports that the cache has not converged yet.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to persist {symbol}: {message}")]
pub struct PersistenceFailure {
    /// The symbol whose write failed.
    pub symbol: Symbol,
    /// The collaborator's error message.
    pub message: String,
}
