//! View configuration: parsing, validation, and loading.
//!
//! A small TOML document tunes how the core shapes data for display:
//! - how many axis labels a chart should end up with
//! - how timestamps are rendered as labels
//! - the day window a freshly opened view starts with
//! - which prefix-matching rule search uses
//! - how long initialization waits for its reads
//!
//! Every field has a default, so an empty document is a valid config.
//!
//! Entrypoints:
//! - Parse + validate from a TOML string: [`load_config_str`]
//! - Parse + validate from a file path: [`load_config_path`]

use std::time::Duration;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::search::MatchMode;

/// Environment variable the binary consults when `--config` is absent.
pub const CONFIG_ENV_VAR: &str = "STOCK_VIEW_CONFIG";

/// Tunables for one view.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct StockViewConfig {
    /// Approximate number of x-axis labels after down-sampling.
    pub label_target_count: usize,
    /// `chrono` strftime pattern for axis labels.
    pub label_format: String,
    /// Day window applied when a view opens; `None` shows all history.
    pub default_day_window: Option<i64>,
    /// Prefix matching rule for instrument search.
    pub match_mode: MatchMode,
    /// Upper bound for the initialization reads, in milliseconds.
    pub init_timeout_ms: u64,
}

impl Default for StockViewConfig {
    fn default() -> Self {
        Self {
            label_target_count: 6,
            label_format: "%m/%d".to_string(),
            default_day_window: None,
            match_mode: MatchMode::default(),
            init_timeout_ms: 10_000,
        }
    }
}

impl StockViewConfig {
    /// Initialization timeout as a [`Duration`].
    pub fn init_timeout(&self) -> Duration {
        Duration::from_millis(self.init_timeout_ms)
    }

    /// Reject values the core cannot work with.
    ///
    /// Errors:
    /// - negative `default_day_window`
    /// - zero `init_timeout_ms`
    /// - `label_format` that renders to nothing or contains an invalid specifier
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(d) = self.default_day_window {
            if d < 0 {
                bail!("default_day_window must be >= 0, got {d}");
            }
        }
        if self.init_timeout_ms == 0 {
            bail!("init_timeout_ms must be > 0");
        }
        let probe = DateTime::<Utc>::UNIX_EPOCH;
        let mut rendered = String::new();
        use std::fmt::Write;
        if write!(rendered, "{}", probe.format(&self.label_format)).is_err() {
            bail!("label_format {:?} is not a valid strftime pattern", self.label_format);
        }
        if rendered.trim().is_empty() {
            bail!("label_format renders to an empty label");
        }
        Ok(())
    }
}

/// Parse and validate a config from a TOML string.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<StockViewConfig> {
    let cfg: StockViewConfig = toml::from_str(toml_str).context("failed to parse config TOML")?;
    cfg.validate().context("invalid config")?;
    Ok(cfg)
}

/// Read a config TOML file from disk, parse, and validate it.
pub fn load_config_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<StockViewConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read config file {}", path.as_ref().display()))?;
    load_config_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg = load_config_str("").unwrap();
        assert_eq!(cfg, StockViewConfig::default());
        assert_eq!(cfg.init_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn fields_override_defaults() {
        let cfg = load_config_str(
            r#"
            label_target_count = 10
            label_format = "%Y-%m-%d"
            default_day_window = 30
            match_mode = "asymmetric"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.label_target_count, 10);
        assert_eq!(cfg.default_day_window, Some(30));
        assert_eq!(cfg.match_mode, MatchMode::Asymmetric);
        assert_eq!(cfg.init_timeout_ms, 10_000);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = load_config_str("colour = \"red\"").unwrap_err();
        assert!(format!("{err:#}").contains("unknown field"));
    }

    #[test]
    fn negative_default_window_is_rejected() {
        let err = load_config_str("default_day_window = -3").unwrap_err();
        assert!(format!("{err:#}").contains("default_day_window"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(load_config_str("init_timeout_ms = 0").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "label_target_count = 4").unwrap();
        let cfg = load_config_path(f.path()).unwrap();
        assert_eq!(cfg.label_target_count, 4);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_config_path("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
