/*!
 * Simulation Configuration
 *
 * Defaults, presets, JSON files and `TOAST_*` environment overrides.
 */

use crate::core::errors::ConfigError;
use crate::core::types::{Tick, Work};
use crate::processor::Core;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Per-core-class throughput and power figures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CoreProfile {
    /// Work applied to the running process per tick
    pub throughput: Work,
    /// Watts consumed per active tick
    pub active_power: f64,
    /// Watts consumed on each idle -> active transition
    pub startup_power: f64,
}

impl CoreProfile {
    pub const PERFORMANCE: Self = Self {
        throughput: 2,
        active_power: 3.0,
        startup_power: 0.5,
    };

    pub const EFFICIENCY: Self = Self {
        throughput: 1,
        active_power: 1.0,
        startup_power: 0.1,
    };
}

/// Configuration for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SimConfig {
    /// Sliding timeline window, in ticks (default: 20)
    pub window_size: Tick,

    /// Render cycle polling interval in milliseconds (default: 100)
    pub render_interval_ms: u64,

    /// Wall-clock pause between ticks in milliseconds (default: 0, unpaced)
    pub tick_interval_ms: u64,

    /// Stop `run()` with an error after this many ticks (default: unlimited)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ticks: Option<Tick>,

    /// Number of performance cores (default: 2)
    pub performance_cores: usize,

    /// Number of efficiency cores (default: 2)
    pub efficiency_cores: usize,

    pub performance: CoreProfile,

    pub efficiency: CoreProfile,
}

impl SimConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self {
            window_size: 20,
            render_interval_ms: 100,
            tick_interval_ms: 0,
            max_ticks: None,
            performance_cores: 2,
            efficiency_cores: 2,
            performance: CoreProfile::PERFORMANCE,
            efficiency: CoreProfile::EFFICIENCY,
        }
    }

    /// One tick per second, for watching the timeline live
    pub fn interactive() -> Self {
        Self {
            tick_interval_ms: 1000,
            ..Self::new()
        }
    }

    /// Unpaced run with a fast render cycle (testing)
    pub fn headless() -> Self {
        Self {
            render_interval_ms: 10,
            tick_interval_ms: 0,
            ..Self::new()
        }
    }

    /// Load configuration from a JSON file; missing fields take defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| ConfigError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Default configuration with `TOAST_*` environment overrides applied
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new().with_env_overrides()
    }

    /// Apply `TOAST_*` environment overrides on top of `self`
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(v) = env_override("TOAST_WINDOW_SIZE")? {
            self.window_size = v;
        }
        if let Some(v) = env_override("TOAST_RENDER_INTERVAL_MS")? {
            self.render_interval_ms = v;
        }
        if let Some(v) = env_override("TOAST_TICK_INTERVAL_MS")? {
            self.tick_interval_ms = v;
        }
        if let Some(v) = env_override("TOAST_MAX_TICKS")? {
            self.max_ticks = Some(v);
        }
        if let Some(v) = env_override("TOAST_P_CORES")? {
            self.performance_cores = v;
        }
        if let Some(v) = env_override("TOAST_E_CORES")? {
            self.efficiency_cores = v;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject configurations the simulator cannot run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(invalid("window_size", self.window_size));
        }
        if self.render_interval_ms == 0 {
            return Err(invalid("render_interval_ms", self.render_interval_ms));
        }
        if self.processor_count() == 0 {
            return Err(invalid("performance_cores + efficiency_cores", 0));
        }
        if self.performance.throughput == 0 {
            return Err(invalid("performance.throughput", 0));
        }
        if self.efficiency.throughput == 0 {
            return Err(invalid("efficiency.throughput", 0));
        }
        Ok(())
    }

    /// Figures for a core class
    pub fn profile(&self, core: Core) -> &CoreProfile {
        match core {
            Core::Performance => &self.performance,
            Core::Efficiency => &self.efficiency,
        }
    }

    pub fn processor_count(&self) -> usize {
        self.performance_cores + self.efficiency_cores
    }

    pub fn render_interval(&self) -> Duration {
        Duration::from_millis(self.render_interval_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn env_override<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(key, raw)),
        Err(_) => Ok(None),
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
