//! Presentation-independent core for a stock watching app.
//!
//! The crate turns raw instrument lists, time series, and watch-list sources
//! into what a view displays:
//! - [`series`]: windowing, label down-sampling, and value projection for charts.
//! - [`watchlist`]: the canonical watch list, the two-source merge, and the
//!   write-back of merge results into the local cache.
//! - [`search`]: prefix search over instruments.
//! - [`controller`]: the per-view state machine tying the pieces together.
//!
//! Data fetching and persistence live behind the traits in [`providers`].

#![warn(missing_docs)]

pub mod clock;
pub mod config;
pub mod controller;
pub mod errors;
pub mod models;
pub mod providers;
pub mod search;
pub mod series;
pub mod watchlist;

pub use errors::{PersistenceFailure, StockViewError};
