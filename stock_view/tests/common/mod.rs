#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use stock_view::StockViewError;
use stock_view::clock::FixedClock;
use stock_view::config::StockViewConfig;
use stock_view::controller::{StateController, TeardownHandle};
use stock_view::models::{Instrument, Symbol, TimeSeriesPoint};
use stock_view::providers::Collaborators;
use stock_view::providers::memory::{MemoryCache, MemoryMarket, MemoryRemote, MemorySession};

pub fn sym(s: &str) -> Symbol {
    Symbol::parse(s).expect("symbol")
}

pub fn syms(v: &[&str]) -> Vec<Symbol> {
    v.iter().map(|s| sym(s)).collect()
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 30, 16, 0, 0).unwrap()
}

pub fn instruments() -> Vec<Instrument> {
    [
        ("AAPL", "Apple", "Technology"),
        ("AMZN", "Amazon", "Consumer Cyclical"),
        ("MSFT", "Microsoft", "Technology"),
        ("TSLA", "Tesla", "Automotive"),
    ]
    .into_iter()
    .map(|(s, n, i)| Instrument {
        symbol: sym(s),
        name: n.into(),
        industry: i.into(),
    })
    .collect()
}

/// `n` daily points ending at `now()`, newest first (as many APIs deliver them).
pub fn daily_desc(n: i64) -> Vec<TimeSeriesPoint> {
    (0..n)
        .map(|back| TimeSeriesPoint {
            timestamp: now() - Duration::days(back),
            absolute_value: 200.0 - back as f64,
            percentage_value: -(back as f64) / 100.0,
        })
        .collect()
}

/// Everything a test needs to drive and inspect one controller.
pub struct Harness {
    pub ctrl: StateController,
    pub handle: TeardownHandle,
    pub cache: Arc<MemoryCache>,
}

pub struct Setup {
    pub market: MemoryMarket,
    pub remote: MemoryRemote,
    pub cache: Arc<MemoryCache>,
    pub session: MemorySession,
    pub config: StockViewConfig,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            market: MemoryMarket::new(instruments()).with_series(sym("AAPL"), daily_desc(100)),
            remote: MemoryRemote::default(),
            cache: Arc::new(MemoryCache::default()),
            session: MemorySession::signed_in("token-123"),
            config: StockViewConfig::default(),
        }
    }
}

impl Setup {
    pub fn try_build(self) -> Result<Harness, StockViewError> {
        let market = Arc::new(self.market);
        let collab = Collaborators {
            instruments: market.clone(),
            series: market,
            remote: Arc::new(self.remote),
            cache: self.cache.clone(),
            session: Arc::new(self.session),
        };
        let (ctrl, handle) =
            StateController::new(collab, Arc::new(FixedClock(now())), self.config)?;
        Ok(Harness {
            ctrl,
            handle,
            cache: self.cache,
        })
    }

    pub fn build(self) -> Harness {
        self.try_build().expect("valid config")
    }
}
