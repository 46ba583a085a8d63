//! Time-series shaping for charts.
//!
//! Everything here is a pure function over borrowed input:
//! - [`window_by_days`]: keep the trailing N days relative to an injected `now`.
//! - [`downsample_labels`]: thin x-axis labels to roughly a target count.
//! - [`select_value_series`]: project absolute or percentage values.
//! - [`build_chart`]: all of the above, in that order, producing a [`ChartSeries`].
//!
//! Callers hand in chronologically ascending series (see
//! [`crate::models::sort_chronologically`]); none of these functions reorder points.

use std::fmt::Write;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::{config::StockViewConfig, errors::StockViewError, models::TimeSeriesPoint};

/// Keep the points newer than `now - days`.
///
/// - `None` returns the whole series.
/// - `Some(d)` with `d >= 0` keeps points with `timestamp > now - d days` (strict).
/// - A window so large that the cutoff underflows keeps everything.
///
/// Errors with [`StockViewError::InvalidFilterArgument`] for negative `days`.
pub fn window_by_days(
    series: &[TimeSeriesPoint],
    days: Option<i64>,
    now: DateTime<Utc>,
) -> Result<Vec<TimeSeriesPoint>, StockViewError> {
    let Some(days) = days else {
        return Ok(series.to_vec());
    };
    if days < 0 {
        return Err(StockViewError::InvalidFilterArgument(format!(
            "day window must be >= 0, got {days}"
        )));
    }

    let cutoff = TimeDelta::try_days(days).and_then(|d| now.checked_sub_signed(d));
    let Some(cutoff) = cutoff else {
        return Ok(series.to_vec());
    };

    Ok(series
        .iter()
        .filter(|p| p.timestamp > cutoff)
        .cloned()
        .collect())
}

/// Keep every k-th element, `k = len / target_count`, starting at index `k - 1`.
///
/// Returns the input unchanged when `target_count` is zero or larger than the
/// input (k would be zero). The output never grows.
pub fn downsample_labels<T: Clone>(labels: &[T], target_count: usize) -> Vec<T> {
    if target_count == 0 {
        return labels.to_vec();
    }
    let k = labels.len() / target_count;
    if k == 0 {
        return labels.to_vec();
    }
    labels
        .iter()
        .enumerate()
        .filter(|(i, _)| (i + 1) % k == 0)
        .map(|(_, l)| l.clone())
        .collect()
}

/// Project each point to its percentage or absolute value, order preserved.
pub fn select_value_series(series: &[TimeSeriesPoint], use_percentage: bool) -> Vec<f64> {
    series
        .iter()
        .map(|p| {
            if use_percentage {
                p.percentage_value
            } else {
                p.absolute_value
            }
        })
        .collect()
}

/// Label shaping knobs, usually taken from [`StockViewConfig`].
#[derive(Debug, Clone)]
pub struct ChartOptions {
    /// Approximate label count after down-sampling.
    pub label_target_count: usize,
    /// strftime pattern for each label.
    pub label_format: String,
}

impl From<&StockViewConfig> for ChartOptions {
    fn from(cfg: &StockViewConfig) -> Self {
        Self {
            label_target_count: cfg.label_target_count,
            label_format: cfg.label_format.clone(),
        }
    }
}

/// Chart-ready data: thinned axis labels plus the full value line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    /// Down-sampled x-axis labels.
    pub labels: Vec<String>,
    /// One value per windowed point.
    pub values: Vec<f64>,
}

/// Window, label, down-sample, and project a series in one pass.
pub fn build_chart(
    series: &[TimeSeriesPoint],
    day_window: Option<i64>,
    use_percentage: bool,
    opts: &ChartOptions,
    now: DateTime<Utc>,
) -> Result<ChartSeries, StockViewError> {
    let windowed = window_by_days(series, day_window, now)?;
    let mut labels = Vec::with_capacity(windowed.len());
    for p in &windowed {
        let mut label = String::new();
        write!(label, "{}", p.timestamp.format(&opts.label_format)).map_err(|_| {
            StockViewError::Config(format!("invalid label_format {:?}", opts.label_format))
        })?;
        labels.push(label);
    }

    Ok(ChartSeries {
        labels: downsample_labels(&labels, opts.label_target_count),
        values: select_value_series(&windowed, use_percentage),
    })
}
