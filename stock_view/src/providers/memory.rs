//! In-memory collaborators.
//!
//! Used by the test suite and by the `stock-view` binary, which loads JSON
//! fixtures into them. Each adapter can be told to fail in a given way or to
//! answer after a delay, so controller edge cases can be driven without a
//! network or a disk.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use indexmap::IndexSet;
use tokio::sync::Mutex;

use crate::models::{Instrument, Symbol, TimeSeriesPoint};
use crate::providers::{
    InstrumentSource, MalformedSnafu, RejectedSnafu, SeriesSource, SessionStore, SourceError,
    TransportSnafu, UnavailableSnafu, WatchlistCache, WatchlistRemote,
};

/// Which [`SourceError`] an adapter should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// [`SourceError::Unavailable`]
    Unavailable,
    /// [`SourceError::Transport`]
    Transport,
    /// [`SourceError::Malformed`]
    Malformed,
    /// [`SourceError::Rejected`]
    Rejected,
}

impl FailureKind {
    fn to_error(self, what: &str) -> SourceError {
        let message = format!("{what} (injected)");
        match self {
            FailureKind::Unavailable => UnavailableSnafu { message }.build(),
            FailureKind::Transport => TransportSnafu { message }.build(),
            FailureKind::Malformed => MalformedSnafu { message }.build(),
            FailureKind::Rejected => RejectedSnafu { message }.build(),
        }
    }
}

async fn pause(delay: Option<Duration>) {
    if let Some(d) = delay {
        tokio::time::sleep(d).await;
    }
}

/// Instruments and per-symbol series held in memory.
#[derive(Debug, Default)]
pub struct MemoryMarket {
    instruments: Vec<Instrument>,
    series: HashMap<Symbol, Vec<TimeSeriesPoint>>,
    fail_instruments: Option<FailureKind>,
    fail_series: Option<FailureKind>,
    series_delay: Option<Duration>,
}

impl MemoryMarket {
    /// A market listing `instruments` and no series.
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self {
            instruments,
            ..Default::default()
        }
    }

    /// Register the series returned for `symbol`.
    pub fn with_series(mut self, symbol: Symbol, points: Vec<TimeSeriesPoint>) -> Self {
        self.series.insert(symbol, points);
        self
    }

    /// Make `fetch_instruments` fail.
    pub fn failing_instruments(mut self, kind: FailureKind) -> Self {
        self.fail_instruments = Some(kind);
        self
    }

    /// Make `fetch_time_series` fail.
    pub fn failing_series(mut self, kind: FailureKind) -> Self {
        self.fail_series = Some(kind);
        self
    }

    /// Answer series requests only after `delay`.
    pub fn delayed_series(mut self, delay: Duration) -> Self {
        self.series_delay = Some(delay);
        self
    }
}

#[async_trait]
impl InstrumentSource for MemoryMarket {
    async fn fetch_instruments(&self) -> Result<Vec<Instrument>, SourceError> {
        if let Some(kind) = self.fail_instruments {
            return Err(kind.to_error("instrument list"));
        }
        Ok(self.instruments.clone())
    }
}

#[async_trait]
impl SeriesSource for MemoryMarket {
    async fn fetch_time_series(&self, symbol: &Symbol) -> Result<Vec<TimeSeriesPoint>, SourceError> {
        pause(self.series_delay).await;
        if let Some(kind) = self.fail_series {
            return Err(kind.to_error(&format!("series for {symbol}")));
        }
        match self.series.get(symbol) {
            Some(points) => Ok(points.clone()),
            None => UnavailableSnafu {
                message: format!("no series for {symbol}"),
            }
            .fail(),
        }
    }
}

/// A remote watch list held in memory.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    symbols: Vec<Symbol>,
    fail: Option<FailureKind>,
    delay: Option<Duration>,
}

impl MemoryRemote {
    /// A remote returning `symbols`.
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self {
            symbols,
            ..Default::default()
        }
    }

    /// Make the read fail.
    pub fn failing(mut self, kind: FailureKind) -> Self {
        self.fail = Some(kind);
        self
    }

    /// Answer only after `delay`.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl WatchlistRemote for MemoryRemote {
    async fn read_watchlist_remote(&self) -> Result<Vec<Symbol>, SourceError> {
        pause(self.delay).await;
        if let Some(kind) = self.fail {
            return Err(kind.to_error("remote watch list"));
        }
        Ok(self.symbols.clone())
    }
}

/// A local watch-list cache held in memory.
///
/// Keeps every successful `persist` call in a write log so tests can check
/// exactly what was written and in which order.
#[derive(Debug, Default)]
pub struct MemoryCache {
    stored: Mutex<IndexSet<Symbol>>,
    writes: Mutex<Vec<Symbol>>,
    fail_read: Option<FailureKind>,
    reject: IndexSet<Symbol>,
    delay: Option<Duration>,
    slow_writes: HashMap<Symbol, Duration>,
}

impl MemoryCache {
    /// A cache pre-filled with `symbols`.
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self {
            stored: Mutex::new(symbols.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Make the read fail.
    pub fn failing_read(mut self, kind: FailureKind) -> Self {
        self.fail_read = Some(kind);
        self
    }

    /// Refuse to persist `symbol`.
    pub fn rejecting(mut self, symbol: Symbol) -> Self {
        self.reject.insert(symbol);
        self
    }

    /// Answer reads only after `delay`.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Hold each write of `symbol` for `delay` before storing it.
    pub fn slow_persist(mut self, symbol: Symbol, delay: Duration) -> Self {
        self.slow_writes.insert(symbol, delay);
        self
    }

    /// Current contents, in insertion order.
    pub async fn stored(&self) -> Vec<Symbol> {
        self.stored.lock().await.iter().cloned().collect()
    }

    /// Every successful write, in call order.
    pub async fn writes(&self) -> Vec<Symbol> {
        self.writes.lock().await.clone()
    }
}

#[async_trait]
impl WatchlistCache for MemoryCache {
    async fn read_watchlist_cache(&self) -> Result<Vec<Symbol>, SourceError> {
        pause(self.delay).await;
        if let Some(kind) = self.fail_read {
            return Err(kind.to_error("cached watch list"));
        }
        Ok(self.stored().await)
    }

    async fn persist(&self, symbol: &Symbol) -> Result<(), SourceError> {
        if self.reject.contains(symbol) {
            return Err(FailureKind::Rejected.to_error(&format!("write of {symbol}")));
        }
        pause(self.slow_writes.get(symbol).copied()).await;
        self.stored.lock().await.insert(symbol.clone());
        self.writes.lock().await.push(symbol.clone());
        Ok(())
    }
}

/// A session store holding an optional token.
#[derive(Debug, Default)]
pub struct MemorySession {
    token: Option<String>,
    fail: Option<FailureKind>,
}

impl MemorySession {
    /// A signed-in session.
    pub fn signed_in(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            fail: None,
        }
    }

    /// No session.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Make the read fail.
    pub fn failing(mut self, kind: FailureKind) -> Self {
        self.fail = Some(kind);
        self
    }
}

#[async_trait]
impl SessionStore for MemorySession {
    async fn read_session_token(&self) -> Result<Option<String>, SourceError> {
        if let Some(kind) = self.fail {
            return Err(kind.to_error("session token"));
        }
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::parse(s).unwrap()
    }

    #[tokio::test]
    async fn cache_records_writes_and_dedupes_contents() {
        let cache = MemoryCache::new(vec![sym("AAPL")]);
        cache.persist(&sym("MSFT")).await.unwrap();
        cache.persist(&sym("AAPL")).await.unwrap();

        assert_eq!(cache.stored().await, vec![sym("AAPL"), sym("MSFT")]);
        assert_eq!(cache.writes().await, vec![sym("MSFT"), sym("AAPL")]);
    }

    #[tokio::test]
    async fn rejected_symbol_is_not_stored() {
        let cache = MemoryCache::default().rejecting(sym("TSLA"));
        let err = cache.persist(&sym("TSLA")).await.unwrap_err();
        assert!(matches!(err, SourceError::Rejected { .. }));
        assert!(cache.stored().await.is_empty());
    }

    #[tokio::test]
    async fn slow_read_still_returns_contents() {
        let cache = MemoryCache::new(vec![sym("AAPL")]).delayed(Duration::from_millis(5));
        assert_eq!(cache.read_watchlist_cache().await.unwrap(), vec![sym("AAPL")]);
    }

    #[tokio::test]
    async fn unknown_series_is_unavailable() {
        let market = MemoryMarket::new(vec![]);
        let err = market.fetch_time_series(&sym("NOPE")).await.unwrap_err();
        assert!(!err.is_hard());
    }
}
