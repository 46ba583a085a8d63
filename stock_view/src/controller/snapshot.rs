use serde::Serialize;

use crate::errors::StockViewError;
use crate::models::{Instrument, Symbol};
use crate::series::ChartSeries;

/// Lifecycle of a controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Created, `initialize` not called yet.
    Uninitialized,
    /// Waiting for the initialization reads.
    Loading,
    /// Watch list merged; filters and adds are live.
    Ready,
    /// A hard fetch failure during initialization. Not retried.
    Failed(StockViewError),
    /// The hosting view went away.
    TornDown,
}

/// Transient view filter. Not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayFilter {
    /// Search text; `None` shows every instrument.
    pub query: Option<String>,
    /// Trailing day window; `None` shows all history.
    pub day_window: Option<i64>,
    /// Plot percentage change instead of absolute price.
    pub show_percentage: bool,
}

/// What the detail chart currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ChartState {
    /// No instrument selected.
    #[default]
    Empty,
    /// Series requested, not arrived yet.
    Loading(Symbol),
    /// Chart data for the selected instrument under the current filter.
    Ready {
        /// Selected instrument.
        symbol: Symbol,
        /// Windowed, labelled, projected data.
        chart: ChartSeries,
    },
    /// The series fetch failed.
    Failed {
        /// Selected instrument.
        symbol: Symbol,
        /// Why.
        error: StockViewError,
    },
}

/// Everything a presentation layer renders, published on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    /// Controller lifecycle.
    pub phase: Phase,
    /// Current filter.
    pub filter: DisplayFilter,
    /// Canonical watch list in display order.
    pub watchlist: Vec<Symbol>,
    /// Instruments matching the current query.
    pub rows: Vec<Instrument>,
    /// Detail chart.
    pub chart: ChartState,
}

impl ViewSnapshot {
    pub(crate) fn initial(filter: DisplayFilter) -> Self {
        Self {
            phase: Phase::Uninitialized,
            filter,
            watchlist: Vec::new(),
            rows: Vec::new(),
            chart: ChartState::Empty,
        }
    }
}

/// Result of a user adding an instrument to the watch list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    /// The normalized symbol.
    pub symbol: Symbol,
    /// False when the symbol was already watched (nothing written).
    pub inserted: bool,
    /// Whether a session token exists; hosts pick the follow-up view from this.
    pub has_session: bool,
}
