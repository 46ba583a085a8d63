//! Collaborator abstraction for data fetching and local persistence.
//!
//! The core never talks to a network or a storage engine directly. Hosts hand
//! the controller implementations of these traits, bundled in
//! [`Collaborators`]. Every trait is async and object safe so the bundle can
//! hold `Arc<dyn ...>` values chosen at runtime.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use stock_view::models::Instrument;
//! use stock_view::providers::{InstrumentSource, SourceError};
//!
//! struct Fixed(Vec<Instrument>);
//!
//! #[async_trait]
//! impl InstrumentSource for Fixed {
//!     async fn fetch_instruments(&self) -> Result<Vec<Instrument>, SourceError> {
//!         Ok(self.0.clone())
//!     }
//! }
//! ```

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use snafu::Snafu;

use crate::models::{Instrument, Symbol, TimeSeriesPoint};

/// Errors a collaborator can report.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SourceError {
    /// The source has nothing to give yet (e.g. a cache that was never written).
    ///
    /// Watch-list reads treat this as an empty source.
    #[snafu(display("Source unavailable: {message}"))]
    Unavailable {
        /// What was missing.
        message: String,
    },

    /// The transport failed for good (e.g. retries exhausted, host unreachable).
    #[snafu(display("Transport failure: {message}"))]
    Transport {
        /// Cause reported by the transport.
        message: String,
    },

    /// The source answered with data that could not be decoded.
    #[snafu(display("Malformed response: {message}"))]
    Malformed {
        /// What failed to decode.
        message: String,
    },

    /// A write was refused by the storage engine.
    #[snafu(display("Write rejected: {message}"))]
    Rejected {
        /// Reason given by the storage engine.
        message: String,
    },
}

impl SourceError {
    /// Hard failures are surfaced as errors; soft ones mean "no data".
    pub fn is_hard(&self) -> bool {
        !matches!(self, SourceError::Unavailable { .. })
    }
}

/// Remote reference data: the list of tradable instruments.
#[async_trait]
pub trait InstrumentSource: Send + Sync {
    /// Fetch every instrument the user can search.
    async fn fetch_instruments(&self) -> Result<Vec<Instrument>, SourceError>;
}

/// Remote price history, one instrument at a time.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Fetch the series for `symbol`, in whatever order the source keeps it.
    async fn fetch_time_series(&self, symbol: &Symbol) -> Result<Vec<TimeSeriesPoint>, SourceError>;
}

/// The watch list as recorded by the backing data service.
#[async_trait]
pub trait WatchlistRemote: Send + Sync {
    /// Read the remote watch list.
    async fn read_watchlist_remote(&self) -> Result<Vec<Symbol>, SourceError>;
}

/// The watch list kept in local persistent storage.
#[async_trait]
pub trait WatchlistCache: Send + Sync {
    /// Read the cached watch list.
    async fn read_watchlist_cache(&self) -> Result<Vec<Symbol>, SourceError>;

    /// Record one symbol. Writing a symbol that is already stored is not an error.
    async fn persist(&self, symbol: &Symbol) -> Result<(), SourceError>;
}

/// Local session state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The signed-in user's token, if any.
    async fn read_session_token(&self) -> Result<Option<String>, SourceError>;
}

/// Every collaborator a [`StateController`](crate::controller::StateController) needs.
#[derive(Clone)]
pub struct Collaborators {
    /// Instrument list source.
    pub instruments: Arc<dyn InstrumentSource>,
    /// Per-instrument series source.
    pub series: Arc<dyn SeriesSource>,
    /// Remote watch list.
    pub remote: Arc<dyn WatchlistRemote>,
    /// Local watch-list cache (read + write-back).
    pub cache: Arc<dyn WatchlistCache>,
    /// Session token store.
    pub session: Arc<dyn SessionStore>,
}
