use indexmap::IndexSet;

use crate::models::Symbol;
use crate::watchlist::merge::{PersistInstruction, PersistOrigin, WatchlistMerge};

/// The canonical watch list owned by one view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchlistStore {
    symbols: IndexSet<Symbol>,
}

impl WatchlistStore {
    /// An empty watch list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Union a merge result into the store, keeping existing order.
    pub fn apply_merge(&mut self, merge: &WatchlistMerge) {
        self.symbols.extend(merge.merged.iter().cloned());
    }

    /// Add `symbol`.
    ///
    /// Returns `None` if it was already present (nothing changes, nothing to
    /// write), otherwise the single write the cache needs.
    pub fn add(&mut self, symbol: Symbol) -> Option<PersistInstruction> {
        if !self.symbols.insert(symbol.clone()) {
            return None;
        }
        Some(PersistInstruction {
            symbol,
            origin: PersistOrigin::UserAdd,
        })
    }

    /// Whether `symbol` is watched.
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.symbols.contains(symbol)
    }

    /// Watched symbols in display order.
    pub fn symbols(&self) -> &IndexSet<Symbol> {
        &self.symbols
    }

    /// Owned copy in display order.
    pub fn to_vec(&self) -> Vec<Symbol> {
        self.symbols.iter().cloned().collect()
    }

    /// Number of watched symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True when nothing is watched.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
