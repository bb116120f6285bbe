use std::{path::Path, time::Duration};

use anyhow::Context;
use cardpin_core::{DEFAULT_LABEL_PREFIX, DEFAULT_PIN_DELAY, DriverConfig};
use cardpin_pinata::PinataConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CardpinConfig {
    pub pinata: PinataConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineConfig {
    pub delay_ms: u64,
    /// 0 writes the dictionary only once the batch has finished
    pub save_every: usize,
    pub label_prefix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_PIN_DELAY.as_millis() as u64,
            save_every: 1,
            label_prefix: DEFAULT_LABEL_PREFIX.to_owned(),
        }
    }
}

impl PipelineConfig {
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            delay: Duration::from_millis(self.delay_ms),
            save_every: self.save_every,
        }
    }
}

/// Values given on the command line, which win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub delay_ms: Option<u64>,
    pub save_every: Option<usize>,
    pub label_prefix: Option<String>,
}

impl CardpinConfig {
    /// Reads the config file; a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no config file at {path:?}, using defaults");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read config file {path:?}"));
            }
        };
        toml::from_str(&content).with_context(|| format!("failed to parse config file {path:?}"))
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(delay_ms) = overrides.delay_ms {
            self.pipeline.delay_ms = delay_ms;
        }
        if let Some(save_every) = overrides.save_every {
            self.pipeline.save_every = save_every;
        }
        if let Some(label_prefix) = overrides.label_prefix {
            self.pipeline.label_prefix = label_prefix;
        }
    }
}
