use std::{fs, path::Path};

use anyhow::{Context, Result};
use burrow_core::NavConfig;
use serde::Deserialize;

/// Tunables read from a TOML settings file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Navigator tunables shared by every driven agent.
    pub(crate) navigation: NavConfig,
    /// Parameters of the simulated world.
    pub(crate) world: WorldSettings,
}

/// World parameters applied before the first tick.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WorldSettings {
    pub(crate) sense_radius_squared: u32,
    pub(crate) dig_cost: u32,
    pub(crate) starting_resources: u32,
    pub(crate) max_ticks: u32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            sense_radius_squared: 20,
            dig_cost: 10,
            starting_resources: 0,
            max_ticks: 500,
        }
    }
}

impl Settings {
    /// Reads settings from disk, falling back to defaults for missing keys.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid settings in {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.navigation.validate()?;
        Ok(settings)
    }
}
