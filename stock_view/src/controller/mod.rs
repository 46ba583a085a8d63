//! Per-view state machine.
//!
//! A [`StateController`] is owned by exactly one view. It moves through
//! `Uninitialized → Loading → Ready` (or `Failed`), and after teardown refuses
//! further work. Derived outputs (filtered rows, chart data) are recomputed on
//! every input change and published as a [`ViewSnapshot`] on a
//! `tokio::sync::watch` channel.
//!
//! ## Initialization
//! The instrument list, the remote watch list, and the cached watch list are
//! read concurrently and joined under the configured timeout. A soft watch-list
//! failure (`SourceError::Unavailable`) counts as an empty source; any hard
//! failure, an instrument failure, or the timeout moves to `Phase::Failed`.
//! If the view is torn down before the reads resolve, their results are
//! dropped without touching the controller's data.
//!
//! ## Persistence
//! Writes produced by the merge and by `add_to_watchlist` run in the
//! background, one batch after another, so the cache sees them in the same
//! order as the in-memory list. The in-memory list is updated first and never
//! rolled back. Failures are
//! logged, broadcast to [`StateController::subscribe_persist_failures`], and
//! collected by [`StateController::settle`].

mod snapshot;
mod teardown;

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::config::StockViewConfig;
use crate::errors::{PersistenceFailure, StockViewError};
use crate::models::{Instrument, Symbol, TimeSeriesPoint, sort_chronologically};
use crate::providers::{Collaborators, SourceError};
use crate::search;
use crate::series::{ChartOptions, build_chart};
use crate::watchlist::{PersistInstruction, PersistReport, WatchlistStore, apply_persist, merge};

pub use snapshot::{AddOutcome, ChartState, DisplayFilter, Phase, ViewSnapshot};
pub use teardown::TeardownHandle;

use teardown::race_teardown;

const FAILURE_CHANNEL_CAPACITY: usize = 64;

/// Coordinates watch-list reconciliation, search, and chart shaping for one view.
pub struct StateController {
    collab: Collaborators,
    clock: Arc<dyn Clock>,
    config: StockViewConfig,
    chart_opts: ChartOptions,

    phase: Phase,
    filter: DisplayFilter,
    store: WatchlistStore,
    instruments: Vec<Instrument>,
    rows: Vec<Instrument>,
    series: Option<(Symbol, Vec<TimeSeriesPoint>)>,
    chart: ChartState,

    out: watch::Sender<ViewSnapshot>,
    teardown: watch::Receiver<bool>,
    failures: broadcast::Sender<PersistenceFailure>,
    writer: Option<JoinHandle<PersistReport>>,
}

impl StateController {
    /// Build a controller for one view, plus the handle that tears it down.
    ///
    /// `config` is validated here; an invalid one is a [`StockViewError::Config`].
    pub fn new(
        collab: Collaborators,
        clock: Arc<dyn Clock>,
        config: StockViewConfig,
    ) -> Result<(Self, TeardownHandle), StockViewError> {
        config
            .validate()
            .map_err(|e| StockViewError::Config(format!("{e:#}")))?;
        let (handle, teardown) = TeardownHandle::new();
        let filter = DisplayFilter {
            day_window: config.default_day_window,
            ..Default::default()
        };
        let (out, _) = watch::channel(ViewSnapshot::initial(filter.clone()));
        let (failures, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);

        let ctrl = Self {
            collab,
            clock,
            chart_opts: ChartOptions::from(&config),
            config,
            phase: Phase::Uninitialized,
            filter,
            store: WatchlistStore::new(),
            instruments: Vec::new(),
            rows: Vec::new(),
            series: None,
            chart: ChartState::Empty,
            out,
            teardown,
            failures,
            writer: None,
        };
        Ok((ctrl, handle))
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.out.subscribe()
    }

    /// Receive every persistence failure as it happens.
    pub fn subscribe_persist_failures(&self) -> broadcast::Receiver<PersistenceFailure> {
        self.failures.subscribe()
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> ViewSnapshot {
        self.out.borrow().clone()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Current filter.
    pub fn filter(&self) -> &DisplayFilter {
        &self.filter
    }

    /// The canonical watch list.
    pub fn watchlist(&self) -> &WatchlistStore {
        &self.store
    }

    /// True once the view's [`TeardownHandle`] fired.
    pub fn is_torn_down(&self) -> bool {
        *self.teardown.borrow()
    }

    /// Load and reconcile both watch-list sources and the instrument list.
    ///
    /// Allowed once, from `Uninitialized`. On a hard failure the phase becomes
    /// `Failed` and the error is returned.
    pub async fn initialize(&mut self) -> Result<(), StockViewError> {
        self.ensure_live()?;
        if self.phase != Phase::Uninitialized {
            return Err(StockViewError::InvalidState(format!(
                "initialize called in phase {:?}",
                self.phase
            )));
        }
        self.set_phase(Phase::Loading);

        let instruments = Arc::clone(&self.collab.instruments);
        let remote = Arc::clone(&self.collab.remote);
        let cache = Arc::clone(&self.collab.cache);
        let reads = async move {
            tokio::join!(
                instruments.fetch_instruments(),
                remote.read_watchlist_remote(),
                cache.read_watchlist_cache(),
            )
        };
        let timeout = self.config.init_timeout();

        let mut rx = self.teardown.clone();
        let outcome = race_teardown(&mut rx, tokio::time::timeout(timeout, reads)).await;

        // Late completion after teardown: drop the results.
        let Some(outcome) = outcome.filter(|_| !self.is_torn_down()) else {
            return Err(self.torn_down("initialization"));
        };

        let (instruments, remote, cached) = match outcome {
            Ok(results) => results,
            Err(_) => {
                return Err(self.fail(StockViewError::DataFetch {
                    source_name: "initialization".into(),
                    message: format!("reads did not finish within {timeout:?}"),
                }));
            }
        };

        let instruments = match instruments {
            Ok(v) => v,
            Err(e) => return Err(self.fail(fetch_error("instruments", &e))),
        };
        let remote = match watchlist_read("watchlist_remote", remote) {
            Ok(v) => v,
            Err(e) => return Err(self.fail(e)),
        };
        let cached = match watchlist_read("watchlist_cache", cached) {
            Ok(v) => v,
            Err(e) => return Err(self.fail(e)),
        };

        let merged = merge(&remote, &cached);
        tracing::debug!("watch-list merge:\n{merged}");
        self.store.apply_merge(&merged);
        self.spawn_persist(merged.persist);

        self.instruments = instruments;
        self.recompute_rows();
        tracing::info!(
            instruments = self.instruments.len(),
            watched = self.store.len(),
            "view ready"
        );
        self.set_phase(Phase::Ready);
        Ok(())
    }

    /// Change the search query and re-filter the rows.
    pub fn set_query(&mut self, query: Option<String>) -> Result<(), StockViewError> {
        self.ensure_live()?;
        self.filter.query = query;
        self.recompute_rows();
        self.publish();
        Ok(())
    }

    /// Change the day window and re-shape the chart.
    ///
    /// A negative window is rejected and leaves the filter unchanged.
    pub fn set_day_window(&mut self, days: Option<i64>) -> Result<(), StockViewError> {
        self.ensure_live()?;
        if let Some(d) = days {
            if d < 0 {
                return Err(StockViewError::InvalidFilterArgument(format!(
                    "day window must be >= 0, got {d}"
                )));
            }
        }
        self.filter.day_window = days;
        self.recompute_chart();
        self.publish();
        Ok(())
    }

    /// Toggle between percentage and absolute values.
    pub fn set_show_percentage(&mut self, show: bool) -> Result<(), StockViewError> {
        self.ensure_live()?;
        self.filter.show_percentage = show;
        self.recompute_chart();
        self.publish();
        Ok(())
    }

    /// Fetch the series for `symbol` and make it the chart's subject.
    ///
    /// A fetch failure is shown as `ChartState::Failed` and returned; it is not retried.
    pub async fn load_series(&mut self, symbol: &str) -> Result<(), StockViewError> {
        self.ensure_live()?;
        let symbol = Symbol::parse(symbol)?;
        self.chart = ChartState::Loading(symbol.clone());
        self.publish();

        let source = Arc::clone(&self.collab.series);
        let mut rx = self.teardown.clone();
        let fetched = race_teardown(&mut rx, source.fetch_time_series(&symbol)).await;
        let Some(fetched) = fetched.filter(|_| !self.is_torn_down()) else {
            return Err(self.torn_down("series load"));
        };

        match fetched {
            Ok(mut points) => {
                sort_chronologically(&mut points);
                tracing::debug!(%symbol, points = points.len(), "series loaded");
                self.series = Some((symbol, points));
                self.recompute_chart();
                self.publish();
                Ok(())
            }
            Err(e) => {
                let err = fetch_error("time_series", &e);
                tracing::warn!(%symbol, error = %err, "series fetch failed");
                self.series = None;
                self.chart = ChartState::Failed {
                    symbol,
                    error: err.clone(),
                };
                self.publish();
                Err(err)
            }
        }
    }

    /// Add `symbol` to the watch list (the user picked an instrument).
    ///
    /// The in-memory list changes immediately; the cache write runs in the
    /// background. Adding a watched symbol changes nothing.
    pub async fn add_to_watchlist(&mut self, symbol: &str) -> Result<AddOutcome, StockViewError> {
        self.ensure_live()?;
        if self.phase != Phase::Ready {
            return Err(StockViewError::InvalidState(format!(
                "add_to_watchlist called in phase {:?}",
                self.phase
            )));
        }
        let symbol = Symbol::parse(symbol)?;

        let inserted = match self.store.add(symbol.clone()) {
            Some(ins) => {
                tracing::info!(%symbol, "added to watch list");
                self.publish();
                self.spawn_persist(vec![ins]);
                true
            }
            None => false,
        };

        let has_session = match self.collab.session.read_session_token().await {
            Ok(token) => token.is_some_and(|t| !t.trim().is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "session token read failed; treating as signed out");
                false
            }
        };

        Ok(AddOutcome {
            symbol,
            inserted,
            has_session,
        })
    }

    /// Wait for every background write and return what happened.
    pub async fn settle(&mut self) -> PersistReport {
        join_writer(self.writer.take()).await
    }

    fn ensure_live(&self) -> Result<(), StockViewError> {
        if self.is_torn_down() || self.phase == Phase::TornDown {
            return Err(StockViewError::InvalidState("view torn down".into()));
        }
        Ok(())
    }

    fn torn_down(&mut self, during: &str) -> StockViewError {
        tracing::info!(during, "view torn down; discarding late results");
        self.set_phase(Phase::TornDown);
        StockViewError::InvalidState(format!("view torn down during {during}"))
    }

    fn fail(&mut self, err: StockViewError) -> StockViewError {
        tracing::error!(error = %err, "initialization failed");
        self.set_phase(Phase::Failed(err.clone()));
        err
    }

    fn set_phase(&mut self, phase: Phase) {
        tracing::debug!(from = ?self.phase, to = ?phase, "phase change");
        self.phase = phase;
        self.publish();
    }

    fn recompute_rows(&mut self) {
        self.rows = search::filter(
            &self.instruments,
            self.filter.query.as_deref(),
            self.config.match_mode,
        );
        tracing::debug!(query = ?self.filter.query, rows = self.rows.len(), "rows recomputed");
    }

    fn recompute_chart(&mut self) {
        let Some((symbol, points)) = &self.series else {
            return;
        };
        self.chart = match build_chart(
            points,
            self.filter.day_window,
            self.filter.show_percentage,
            &self.chart_opts,
            self.clock.now(),
        ) {
            Ok(chart) => ChartState::Ready {
                symbol: symbol.clone(),
                chart,
            },
            Err(error) => ChartState::Failed {
                symbol: symbol.clone(),
                error,
            },
        };
    }

    fn publish(&self) {
        self.out.send_replace(ViewSnapshot {
            phase: self.phase.clone(),
            filter: self.filter.clone(),
            watchlist: self.store.to_vec(),
            rows: self.rows.clone(),
            chart: self.chart.clone(),
        });
    }

    fn spawn_persist(&mut self, instructions: Vec<PersistInstruction>) {
        if instructions.is_empty() {
            return;
        }
        let cache = Arc::clone(&self.collab.cache);
        let failures = self.failures.clone();
        // Each batch waits for the one before it; the chain carries the report.
        let previous = self.writer.take();
        self.writer = Some(tokio::spawn(async move {
            let mut report = join_writer(previous).await;
            let batch = apply_persist(cache.as_ref(), &instructions).await;
            for f in &batch.failures {
                // No subscriber is fine: apply_persist already logged it.
                let _ = failures.send(f.clone());
            }
            report.absorb(batch);
            report
        }));
    }
}

async fn join_writer(writer: Option<JoinHandle<PersistReport>>) -> PersistReport {
    let Some(handle) = writer else {
        return PersistReport::default();
    };
    match handle.await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "persistence task did not complete");
            PersistReport::default()
        }
    }
}

fn fetch_error(source_name: &str, e: &SourceError) -> StockViewError {
    StockViewError::DataFetch {
        source_name: source_name.to_string(),
        message: e.to_string(),
    }
}

/// Soft failures read as an empty watch list; hard ones become errors.
fn watchlist_read(
    source_name: &str,
    res: Result<Vec<Symbol>, SourceError>,
) -> Result<Vec<Symbol>, StockViewError> {
    match res {
        Ok(v) => Ok(v),
        Err(e) if !e.is_hard() => {
            tracing::warn!(source = source_name, error = %e, "watch-list source unavailable; using empty list");
            Ok(Vec::new())
        }
        Err(e) => Err(fetch_error(source_name, &e)),
    }
}
