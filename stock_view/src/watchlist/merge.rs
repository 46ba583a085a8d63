use std::fmt;

use indexmap::IndexSet;

use crate::models::Symbol;

/// Why a symbol needs to be written to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersistOrigin {
    /// Present remotely but missing from the cache.
    RemoteMerge,
    /// Added by the user during this session.
    UserAdd,
}

/// One write the storage collaborator should perform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersistInstruction {
    /// Symbol to record.
    pub symbol: Symbol,
    /// What produced the write.
    pub origin: PersistOrigin,
}

/// Result of reconciling the remote and cached watch lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchlistMerge {
    /// Union of both sources; cached order first, then remote-only symbols.
    pub merged: IndexSet<Symbol>,
    /// Writes that bring the cache up to the merged set.
    pub persist: Vec<PersistInstruction>,
}

impl WatchlistMerge {
    /// True if the cache already holds everything.
    pub fn is_noop(&self) -> bool {
        self.persist.is_empty()
    }
}

impl fmt::Display for WatchlistMerge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("Watch list ({})", self.merged.len());
        writeln!(f, "{title}")?;
        writeln!(f, "{}", "-".repeat(title.len()))?;
        for s in &self.merged {
            let pending = self.persist.iter().any(|p| &p.symbol == s);
            let mark = if pending { '+' } else { ' ' };
            writeln!(f, "{mark} {s}")?;
        }
        if self.is_noop() {
            write!(f, "\nNo changes")
        } else {
            write!(f, "\n{} cache write(s) pending", self.persist.len())
        }
    }
}

/// Union `cached` and `remote`, and list the writes the cache is missing.
///
/// - Duplicates (within or across sources) collapse by symbol equality.
/// - Every symbol present in `remote` but not in `cached` yields exactly one
///   [`PersistOrigin::RemoteMerge`] instruction, in remote order.
/// - Nothing is ever removed.
pub fn merge(remote: &[Symbol], cached: &[Symbol]) -> WatchlistMerge {
    let cached_set: IndexSet<Symbol> = cached.iter().cloned().collect();
    let mut merged = cached_set.clone();
    let mut persist = Vec::new();

    for s in remote {
        if merged.insert(s.clone()) && !cached_set.contains(s) {
            persist.push(PersistInstruction {
                symbol: s.clone(),
                origin: PersistOrigin::RemoteMerge,
            });
        }
    }

    WatchlistMerge { merged, persist }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn syms(v: &[&str]) -> Vec<Symbol> {
        v.iter().map(|s| Symbol::parse(s).unwrap()).collect()
    }

    fn persisted(m: &WatchlistMerge) -> Vec<&str> {
        m.persist.iter().map(|p| p.symbol.as_str()).collect()
    }

    #[test]
    fn empty_sources_merge_to_empty() {
        let m = merge(&[], &[]);
        assert!(m.merged.is_empty());
        assert!(m.is_noop());
    }

    #[test]
    fn remote_only_symbol_is_persisted_once() {
        let m = merge(&syms(&["AAPL"]), &[]);
        assert_eq!(m.merged.len(), 1);
        assert_eq!(persisted(&m), vec!["AAPL"]);

        // Cache now holds AAPL: nothing left to write.
        let again = merge(&syms(&["AAPL"]), &syms(&["AAPL"]));
        assert_eq!(again.merged, m.merged);
        assert!(again.is_noop());
    }

    #[test]
    fn comparison_is_case_normalized() {
        let m = merge(&syms(&["aapl", "AAPL "]), &syms(&["AAPL"]));
        assert_eq!(m.merged.len(), 1);
        assert!(m.is_noop());
    }

    #[test]
    fn order_is_cached_then_remote_only() {
        let m = merge(&syms(&["TSLA", "AAPL", "NVDA"]), &syms(&["AAPL", "MSFT"]));
        let order: Vec<&str> = m.merged.iter().map(Symbol::as_str).collect();
        assert_eq!(order, vec!["AAPL", "MSFT", "TSLA", "NVDA"]);
        assert_eq!(persisted(&m), vec!["TSLA", "NVDA"]);
    }

    #[test]
    fn display_marks_pending_writes() {
        let m = merge(&syms(&["TSLA"]), &syms(&["AAPL"]));
        insta::assert_snapshot!(m.to_string(), @r"
        Watch list (2)
        --------------
          AAPL
        + TSLA

        1 cache write(s) pending
        ");
    }

    #[test]
    fn display_noop() {
        let m = merge(&syms(&["AAPL"]), &syms(&["AAPL"]));
        assert!(m.to_string().ends_with("No changes"));
    }

    fn symbol_list() -> impl Strategy<Value = Vec<Symbol>> {
        proptest::collection::vec("[A-Ea-e]{1,3}", 0..8)
            .prop_map(|v| v.iter().map(|s| Symbol::parse(s).unwrap()).collect())
    }

    proptest! {
        #[test]
        fn merge_with_self_is_identity(a in symbol_list()) {
            let m = merge(&a, &a);
            let want: IndexSet<Symbol> = a.iter().cloned().collect();
            prop_assert_eq!(m.merged, want);
            prop_assert!(m.persist.is_empty());
        }

        #[test]
        fn merge_set_is_commutative(a in symbol_list(), b in symbol_list()) {
            let ab: BTreeSet<Symbol> = merge(&a, &b).merged.into_iter().collect();
            let ba: BTreeSet<Symbol> = merge(&b, &a).merged.into_iter().collect();
            prop_assert_eq!(ab, ba);
        }

        #[test]
        fn instructions_cover_exactly_remote_only(a in symbol_list(), b in symbol_list()) {
            let m = merge(&a, &b);
            let got: BTreeSet<Symbol> = m.persist.iter().map(|p| p.symbol.clone()).collect();
            let want: BTreeSet<Symbol> = a.iter().filter(|s| !b.contains(*s)).cloned().collect();
            prop_assert_eq!(got.len(), m.persist.len());
            prop_assert_eq!(got, want);
        }
    }
}
