//! Tunables for artifacts, loadable from TOML.
//!
//! ```toml
//! [unlock]
//! window_ms = 10000
//! extension_ms = 5000
//! refractory_ms = 60000
//!
//! [activation]
//! cooldown_ms = 1000
//!
//! [node]
//! default_max_durability = 5
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading an [`ArtifactConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse artifact config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid artifact config: {0}")]
    Invalid(String),
}

/// Timing of the unlocking state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnlockConfig {
    /// How long a freshly opened unlocking window stays open.
    pub window_ms: u64,

    /// Added to the window end on every topologically consistent trigger.
    pub extension_ms: u64,

    /// Cooldown after a window resolves during which triggers are ignored.
    pub refractory_ms: u64,
}

impl Default for UnlockConfig {
    fn default() -> Self {
        Self {
            window_ms: 10_000,
            extension_ms: 5_000,
            refractory_ms: 60_000,
        }
    }
}

impl UnlockConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn extension(&self) -> Duration {
        Duration::from_millis(self.extension_ms)
    }

    pub fn refractory(&self) -> Duration {
        Duration::from_millis(self.refractory_ms)
    }
}

/// Gate on direct artifact activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
    pub cooldown_ms: u64,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self { cooldown_ms: 1_000 }
    }
}

impl ActivationConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Defaults applied to nodes created through the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub default_max_durability: i32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            default_max_durability: 3,
        }
    }
}

/// Complete artifact configuration. Missing sections fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub unlock: UnlockConfig,
    pub activation: ActivationConfig,
    pub node: NodeConfig,
}

impl ArtifactConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: ArtifactConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the state machine degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unlock.window_ms == 0 {
            return Err(ConfigError::Invalid(
                "unlock.window_ms must be greater than zero".to_string(),
            ));
        }
        if self.node.default_max_durability <= 0 {
            return Err(ConfigError::Invalid(format!(
                "node.default_max_durability must be positive, got {}",
                self.node.default_max_durability
            )));
        }
        Ok(())
    }
}
