//! Young generation configuration.
//!
//! Everything that influences layout decisions is carried in a
//! [`YoungGenConfig`] handed to the generation when it is created, so the
//! layout code never consults process-wide flags.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mem_region::{is_aligned, is_power_of_two, M};

/// Default alignment of every space boundary (64 KiB).
pub const DEFAULT_ALIGNMENT: usize = 64 * 1024;

/// Tunables for the young generation.
///
/// Missing fields fall back to [`YoungGenConfig::default`] when loaded from
/// JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YoungGenConfig {
    /// Bytes committed at startup.
    pub initial_size: usize,
    /// The generation never shrinks below this many bytes.
    pub min_size: usize,
    /// The generation never grows beyond this many bytes.
    pub max_size: usize,
    /// Granularity of every space boundary. Must be a power of two.
    pub alignment: usize,
    /// Committed size divided by this gives the initial survivor size when
    /// the adaptive policy is off.
    pub initial_survivor_ratio: usize,
    /// Lower bound on the survivor ratio used by the adaptive policy.
    pub min_survivor_ratio: usize,
    /// Whether an adaptive size policy drives resizing.
    pub use_adaptive_size_policy: bool,
    /// Mangle free space in eden and from-space after full compaction.
    pub zap_unused_heap_area: bool,
    /// Percentage of dead space the full collector may leave in place.
    pub mark_sweep_dead_ratio: usize,
    /// Run the complete invariant pass after every mutation, not only the
    /// checks that are always on.
    pub full_verification: bool,
}

impl Default for YoungGenConfig {
    fn default() -> Self {
        YoungGenConfig {
            initial_size: 12 * M,
            min_size: 4 * M,
            max_size: 64 * M,
            alignment: DEFAULT_ALIGNMENT,
            initial_survivor_ratio: 8,
            min_survivor_ratio: 3,
            use_adaptive_size_policy: true,
            zap_unused_heap_area: cfg!(debug_assertions),
            mark_sweep_dead_ratio: 5,
            full_verification: cfg!(debug_assertions),
        }
    }
}

impl YoungGenConfig {
    /// Parses a configuration from JSON and validates it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: YoungGenConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The survivor ratio used to size the survivors at startup.
    pub fn survivor_ratio(&self) -> usize {
        if self.use_adaptive_size_policy {
            self.min_survivor_ratio
        } else {
            self.initial_survivor_ratio
        }
    }

    /// Checks the configuration for internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_power_of_two(self.alignment) {
            return Err(ConfigError::AlignmentNotPowerOfTwo(self.alignment));
        }
        for (name, value) in [
            ("initial_size", self.initial_size),
            ("min_size", self.min_size),
            ("max_size", self.max_size),
        ] {
            if !is_aligned(value, self.alignment) {
                return Err(ConfigError::Unaligned {
                    name,
                    value,
                    alignment: self.alignment,
                });
            }
        }
        if !(self.min_size <= self.initial_size && self.initial_size <= self.max_size) {
            return Err(ConfigError::SizeOrder {
                min: self.min_size,
                initial: self.initial_size,
                max: self.max_size,
            });
        }
        // Eden and both survivors each need at least one alignment unit.
        if self.min_size / self.alignment < 3 {
            return Err(ConfigError::MinSizeTooSmall {
                min: self.min_size,
                alignment: self.alignment,
            });
        }
        for (name, value) in [
            ("initial_survivor_ratio", self.initial_survivor_ratio),
            ("min_survivor_ratio", self.min_survivor_ratio),
        ] {
            if value < 3 {
                return Err(ConfigError::RatioTooSmall { name, value });
            }
        }
        Ok(())
    }
}
