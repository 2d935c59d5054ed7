//! TOML configuration for the CLI.
//!
//! Every key is optional; command-line flags override what the file says.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tickerlab_core::data::{FetchRange, RowPolicy};
use tickerlab_core::indicators::DEFAULT_WINDOWS;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "tickerlab.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// CSV source for `load`, `company` and `compare`.
    pub data_path: PathBuf,
    /// Where exports land when no explicit path is given.
    pub output_dir: PathBuf,
    /// Moving-average windows.
    pub ma_windows: Vec<usize>,
    /// What to do with rows that fail validation.
    pub row_policy: RowPolicy,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub fetch: FetchRange,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("sample_data.csv"),
            output_dir: PathBuf::from("out"),
            ma_windows: DEFAULT_WINDOWS.to_vec(),
            row_policy: RowPolicy::Skip,
            log_level: "info".into(),
            fetch: FetchRange::default(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("failed to parse config TOML")?;
        if config.ma_windows.iter().any(|&w| w == 0) {
            bail!("ma_windows entries must be >= 1");
        }
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config")
    }

    /// An explicit path must exist; otherwise use `tickerlab.toml` if present,
    /// else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Where the provider circuit breaker keeps its state between runs.
    pub fn breaker_state_path(&self) -> PathBuf {
        self.output_dir.join(".tickerlab").join("breaker.json")
    }

    /// Default export path for a company block.
    pub fn export_path(&self, company: &str) -> PathBuf {
        self.output_dir.join(format!("{company}_data.csv"))
    }
}
