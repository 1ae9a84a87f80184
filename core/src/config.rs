//! Tunable constants of the local navigator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on rotation-sense probing; a full turn has eight headings.
const MAX_SENSE_PROBES: u32 = 8;

/// Tunables for the greedy-then-wall-follow navigator.
///
/// The defaults were chosen for grids up to roughly 60×60 cells. Larger
/// grids tolerate a higher `max_pressing_ticks`; the probe limits describe
/// rotations around a single cell and do not scale with the grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavConfig {
    /// Squared target shift at or above which a new target triggers a full
    /// reset instead of a soft reset.
    pub reset_threshold_squared: u32,
    /// Maximum headings probed per wall-tracing tick.
    pub trace_probe_limit: u32,
    /// Maximum headings probed in each direction when choosing a rotation sense.
    pub sense_probe_limit: u32,
    /// Consecutive ticks spent against one obstacle cell before escalating
    /// to a full reset.
    pub max_pressing_ticks: u32,
    /// Policy for clearing removable terrain.
    pub dig: DigPolicy,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            reset_threshold_squared: 3,
            trace_probe_limit: 16,
            sense_probe_limit: MAX_SENSE_PROBES,
            max_pressing_ticks: 12,
            dig: DigPolicy::default(),
        }
    }
}

impl NavConfig {
    /// Checks the configuration for values the navigator cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reset_threshold_squared == 0 {
            return Err(ConfigError::ZeroResetThreshold);
        }
        if self.trace_probe_limit == 0 {
            return Err(ConfigError::ZeroProbeLimit("trace_probe_limit"));
        }
        if self.sense_probe_limit == 0 {
            return Err(ConfigError::ZeroProbeLimit("sense_probe_limit"));
        }
        if self.sense_probe_limit > MAX_SENSE_PROBES {
            return Err(ConfigError::SenseProbeLimitTooLarge(self.sense_probe_limit));
        }
        if self.max_pressing_ticks == 0 {
            return Err(ConfigError::ZeroPressingCap);
        }
        Ok(())
    }
}

/// Conditions under which the navigator spends its action clearing terrain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DigPolicy {
    /// Master switch for digging.
    pub enabled: bool,
    /// The team pool must hold strictly more than this before digging.
    pub resource_reserve: u32,
    /// Ticks the navigator commits to entering a freshly cleared cell.
    pub commit_ticks: u32,
}

impl Default for DigPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            resource_reserve: 0,
            commit_ticks: 3,
        }
    }
}

/// Reasons a [`NavConfig`] is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A zero threshold would treat every target update as a full reset.
    #[error("reset_threshold_squared must be at least 1")]
    ZeroResetThreshold,
    /// A probe limit of zero never finds a heading.
    #[error("{0} must be at least 1")]
    ZeroProbeLimit(&'static str),
    /// Sense probing beyond a full turn revisits headings.
    #[error("sense_probe_limit {0} exceeds the eight compass headings")]
    SenseProbeLimitTooLarge(u32),
    /// A zero cap escalates on the first follow tick.
    #[error("max_pressing_ticks must be at least 1")]
    ZeroPressingCap,
}
