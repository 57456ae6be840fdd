//! Configuration for the view engine and its engine connection.
//!
//! Supports loading configuration from:
//! 1. A YAML file
//! 2. Environment variables (with QDICE_ prefix)
//!
//! Precedence (highest to lowest): environment, file, defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ViewError, ViewResult};
use crate::layout::LayoutConfig;
use crate::timeline::ViewMode;
use crate::trace::DEFAULT_PROBABILITY_TOLERANCE;

/// Complete view configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Interactive stepping or a static view of the final state.
    pub mode: ViewMode,

    /// Prepend the all-zero initial state to every trace.
    pub prepend_initial_step: bool,

    /// Allowed deviation of a step's probability sum from 1.
    pub probability_tolerance: f64,

    /// Largest trace accepted for display.
    pub max_qubits: u32,

    /// Shots requested per batch roll.
    pub batch_shots: u32,

    /// Diagram geometry.
    pub layout: LayoutConfig,

    /// Engine connection.
    pub engine: EngineConfig,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            mode: ViewMode::default(),
            prepend_initial_step: true,
            probability_tolerance: DEFAULT_PROBABILITY_TOLERANCE,
            max_qubits: 20,
            batch_shots: 100,
            layout: LayoutConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

/// Where the numerical engine lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the engine's HTTP API.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Connect timeout in seconds.
    pub connect_timeout_seconds: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_seconds: 30,
            connect_timeout_seconds: 10,
        }
    }
}

impl ViewConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ViewResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ViewError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(contents: &str) -> ViewResult<Self> {
        let config: ViewConfig = serde_yaml_ng::from_str(contents)
            .map_err(|e| ViewError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load with precedence env > file > defaults.
    pub fn load(config_file: Option<&Path>) -> ViewResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        let config = config.merge_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    ///
    /// Only keys that are present override; malformed values are errors.
    pub fn merge_env<F>(mut self, lookup: F) -> ViewResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("QDICE_ENGINE_URL") {
            self.engine.base_url = url;
        }
        if let Some(timeout) = lookup("QDICE_ENGINE_TIMEOUT") {
            self.engine.timeout_seconds = parse_env("QDICE_ENGINE_TIMEOUT", &timeout)?;
        }
        if let Some(mode) = lookup("QDICE_VIEW_MODE") {
            self.mode = mode.parse()?;
        }
        if let Some(shots) = lookup("QDICE_BATCH_SHOTS") {
            self.batch_shots = parse_env("QDICE_BATCH_SHOTS", &shots)?;
        }
        Ok(self)
    }

    /// Reject values the view layer cannot work with.
    pub fn validate(&self) -> ViewResult<()> {
        if !(self.probability_tolerance > 0.0 && self.probability_tolerance < 1.0) {
            return Err(ViewError::Configuration(format!(
                "probability_tolerance must be in (0, 1), got {}",
                self.probability_tolerance
            )));
        }
        if self.max_qubits == 0 || self.max_qubits > 30 {
            return Err(ViewError::Configuration(format!(
                "max_qubits must be in 1..=30, got {}",
                self.max_qubits
            )));
        }
        if self.batch_shots == 0 {
            return Err(ViewError::Configuration(
                "batch_shots must be positive".to_string(),
            ));
        }
        let layout = &self.layout;
        if layout.gate_width <= 0.0 || layout.spacing < 0.0 || layout.wire_pitch <= 0.0 {
            return Err(ViewError::Configuration(format!(
                "invalid layout dimensions: {layout:?}"
            )));
        }
        if !(self.engine.base_url.starts_with("http://")
            || self.engine.base_url.starts_with("https://"))
        {
            return Err(ViewError::Configuration(format!(
                "engine base_url must be http(s), got '{}'",
                self.engine.base_url
            )));
        }
        if self.engine.timeout_seconds == 0 {
            return Err(ViewError::Configuration(
                "engine timeout_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> ViewResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ViewError::Configuration(format!("{key}: cannot parse '{value}'")))
}
