//! Watch-list state and its reconciliation with local storage.
//!
//! ## What this does
//! - Holds the canonical watch list for one view ([`WatchlistStore`]): a set of
//!   [`Symbol`](crate::models::Symbol)s with stable first-seen order.
//! - Computes a **merge** of the remote and cached sources ([`merge()`]). The
//!   merge is pure: it returns the union plus a list of
//!   [`PersistInstruction`]s for symbols the cache is missing.
//! - Applies instructions against a [`WatchlistCache`](crate::providers::WatchlistCache)
//!   with [`apply_persist`], collecting failures instead of aborting.
//!
//! ## Consistency
//! Symbols are never removed. The in-memory set is the source of truth for the
//! session; the cache converges toward it. A failed write is reported (tracing
//! event + [`PersistReport::failures`]) but does not roll anything back.
//!
//! ## Idempotence
//! Merging the same sources twice yields the same set. Once the instructions
//! from a first merge have been applied, a second merge against the refreshed
//! cache yields no instructions.

mod apply;
mod merge;
mod store;

pub use apply::{PersistReport, apply_persist};
pub use merge::{PersistInstruction, PersistOrigin, WatchlistMerge, merge};
pub use store::WatchlistStore;
