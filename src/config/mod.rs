//! Forecasting configuration: pacing, pre-flight heuristics and projection bounds

mod marketplace;

pub use marketplace::{coverage_year, state_marketplace, StateMarketplace, STATE_MARKETPLACES};

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default location of the optional configuration override file
pub const DEFAULT_CONFIG_PATH: &str = "config/forecaster.json";

/// Tunables for the analysis engine
///
/// The pre-flight threshold and per-call estimate are presentation heuristics, not
/// correctness rules. The pacing delay keeps the marketplace API from being flooded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Runs with more planned calls than this need caller confirmation
    pub preflight_call_threshold: usize,

    /// Wall-clock estimate per planned call, for the pre-flight warning
    pub estimated_ms_per_call: u64,

    /// Pause between consecutive cells of a long-term analysis
    pub cell_delay_ms: u64,

    /// Runaway guard for the household projection
    pub max_projection_years: usize,

    /// Adults at or past this age leave the marketplace for Medicare
    pub medicare_age: u32,

    /// First month (1-12) of the window where a prior-year fallback is allowed
    pub fallback_window_start_month: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            preflight_call_threshold: 200,
            estimated_ms_per_call: 350,
            cell_delay_ms: 100,
            max_projection_years: 100,
            medicare_age: 65,
            fallback_window_start_month: 11, // November
        }
    }
}

impl ForecastConfig {
    /// Load overrides from the default location, falling back to defaults when absent
    pub fn from_default_path() -> Result<Self> {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_json_path(path)
    }

    /// Load overrides from a specific JSON file; omitted fields keep their defaults
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ForecastError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: ForecastConfig = serde_json::from_str(&raw)?;
        log::debug!("Loaded forecast config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn cell_delay(&self) -> Duration {
        Duration::from_millis(self.cell_delay_ms)
    }

    /// Rounded seconds a run of `total_calls` is expected to take
    pub fn estimated_seconds(&self, total_calls: usize) -> u64 {
        let millis = total_calls as u64 * self.estimated_ms_per_call;
        (millis + 500) / 1000
    }
}
