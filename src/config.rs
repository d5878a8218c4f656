//! Engine configuration.
//!
//! The configuration is an explicit value handed to filter-set construction;
//! nothing in the engine reads it from a global.
//!
//! ```toml
//! corporate_group_ids = ["org.acme", "com.acme"]
//!
//! [traversal]
//! max_depth = 5
//! full_recursion = false
//!
//! [decorator]
//! show_third_party = false
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// GroupId prefixes identifying in-house artifacts.
    #[serde(default)]
    pub corporate_group_ids: Vec<String>,
    #[serde(default)]
    pub traversal: TraversalConfig,
    #[serde(default)]
    pub decorator: DecoratorConfig,
}

/// Default recursion controls applied to every filter set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalConfig {
    /// Maximum number of module hops; unbounded when absent.
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default)]
    pub full_recursion: bool,
}

/// Default report shaping switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoratorConfig {
    #[serde(default = "default_true")]
    pub show_corporate: bool,
    #[serde(default = "default_true")]
    pub show_third_party: bool,
    #[serde(default = "default_true")]
    pub show_unapproved_licenses: bool,
}

impl Default for DecoratorConfig {
    fn default() -> Self {
        Self {
            show_corporate: true,
            show_third_party: true,
            show_unapproved_licenses: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Parses a configuration from TOML text.
pub fn parse_config(content: &str) -> Result<EngineConfig> {
    toml::from_str::<EngineConfig>(content).context("Failed to parse engine configuration")
}

/// Loads the configuration at `path`, falling back to defaults when the
/// file does not exist.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no configuration file, using defaults");
        return Ok(EngineConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<EngineConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}
