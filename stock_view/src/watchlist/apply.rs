use crate::errors::{PersistenceFailure, StockViewError};
use crate::models::Symbol;
use crate::providers::WatchlistCache;
use crate::watchlist::merge::PersistInstruction;

/// Outcome of executing persistence instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistReport {
    /// Symbols the cache acknowledged.
    pub written: Vec<Symbol>,
    /// Writes that failed; the in-memory list still holds these symbols.
    pub failures: Vec<PersistenceFailure>,
}

impl PersistReport {
    /// True when every write succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// The written symbols, or the first failure as [`StockViewError::Persistence`].
    pub fn into_result(self) -> Result<Vec<Symbol>, StockViewError> {
        match self.failures.into_iter().next() {
            Some(f) => Err(f.into()),
            None => Ok(self.written),
        }
    }

    /// Fold another report into this one.
    pub fn absorb(&mut self, other: PersistReport) {
        self.written.extend(other.written);
        self.failures.extend(other.failures);
    }
}

/// Execute `instructions` in order against `cache`.
///
/// Keeps going after a failed write; every failure is logged and returned.
pub async fn apply_persist(
    cache: &dyn WatchlistCache,
    instructions: &[PersistInstruction],
) -> PersistReport {
    let mut report = PersistReport::default();
    for ins in instructions {
        match cache.persist(&ins.symbol).await {
            Ok(()) => {
                tracing::debug!(symbol = %ins.symbol, origin = ?ins.origin, "persisted watch-list entry");
                report.written.push(ins.symbol.clone());
            }
            Err(e) => {
                tracing::error!(symbol = %ins.symbol, origin = ?ins.origin, error = %e, "failed to persist watch-list entry");
                report.failures.push(PersistenceFailure {
                    symbol: ins.symbol.clone(),
                    message: e.to_string(),
                });
            }
        }
    }
    report
}
