//! Prefix search over the instrument list.

use serde::{Deserialize, Serialize};

use crate::models::Instrument;

/// How a query is compared against symbol and name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Symbol and name both match case-insensitively by prefix.
    #[default]
    CaseInsensitive,
    /// Symbol matches the upper-cased query; name matches the query exactly as typed.
    ///
    /// Kept for parity with clients that rely on the original, uneven rule.
    Asymmetric,
}

/// Return the instruments whose symbol or name starts with `query`.
///
/// A missing, empty, or whitespace-only query returns the input unchanged.
/// The query is trimmed. Matches keep their input order.
pub fn filter(instruments: &[Instrument], query: Option<&str>, mode: MatchMode) -> Vec<Instrument> {
    let q = match query.map(str::trim) {
        Some(q) if !q.is_empty() => q,
        _ => return instruments.to_vec(),
    };

    let upper = q.to_uppercase();
    let lower = q.to_lowercase();

    instruments
        .iter()
        .filter(|inst| {
            if inst.symbol.as_str().starts_with(&upper) {
                return true;
            }
            match mode {
                MatchMode::CaseInsensitive => inst.name.to_lowercase().starts_with(&lower),
                MatchMode::Asymmetric => inst.name.starts_with(q),
            }
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Symbol;

    fn inst(symbol: &str, name: &str) -> Instrument {
        Instrument {
            symbol: Symbol::parse(symbol).unwrap(),
            name: name.into(),
            industry: "Tech".into(),
        }
    }

    fn sample() -> Vec<Instrument> {
        vec![inst("AAPL", "Apple"), inst("AMZN", "Amazon")]
    }

    fn symbols(v: &[Instrument]) -> Vec<&str> {
        v.iter().map(|i| i.symbol.as_str()).collect()
    }

    #[test]
    fn missing_or_empty_query_is_identity() {
        let all = sample();
        assert_eq!(filter(&all, None, MatchMode::CaseInsensitive), all);
        assert_eq!(filter(&all, Some(""), MatchMode::CaseInsensitive), all);
        assert_eq!(filter(&all, Some("   "), MatchMode::Asymmetric), all);
    }

    #[test]
    fn symbol_prefix_matches() {
        for mode in [MatchMode::CaseInsensitive, MatchMode::Asymmetric] {
            assert_eq!(symbols(&filter(&sample(), Some("A"), mode)), vec!["AAPL", "AMZN"]);
            assert_eq!(symbols(&filter(&sample(), Some("AAP"), mode)), vec!["AAPL"]);
            assert_eq!(symbols(&filter(&sample(), Some("aap"), mode)), vec!["AAPL"]);
        }
    }

    #[test]
    fn name_case_depends_on_mode() {
        let all = vec![inst("MSFT", "Microsoft"), inst("GOOG", "Alphabet")];
        assert_eq!(
            symbols(&filter(&all, Some("micro"), MatchMode::CaseInsensitive)),
            vec!["MSFT"]
        );
        assert!(filter(&all, Some("micro"), MatchMode::Asymmetric).is_empty());
        assert_eq!(
            symbols(&filter(&all, Some("Micro"), MatchMode::Asymmetric)),
            vec!["MSFT"]
        );
    }

    #[test]
    fn matches_keep_input_order() {
        let all = vec![inst("ZM", "Zoom"), inst("AMD", "Zen Micro"), inst("Z", "Zillow")];
        assert_eq!(
            symbols(&filter(&all, Some("z"), MatchMode::CaseInsensitive)),
            vec!["ZM", "AMD", "Z"]
        );
    }

    #[test]
    fn mode_parses_from_snake_case() {
        let m: MatchMode = serde_json::from_str("\"asymmetric\"").unwrap();
        assert_eq!(m, MatchMode::Asymmetric);
    }
}
