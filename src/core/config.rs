//! Engine configuration.
//!
//! Games configure the engine at startup with an `EngineConfig`. Every
//! field has a sensible default, so most games only override the seed.
//!
//! ```
//! use gameplay_effects::core::EngineConfig;
//!
//! let config = EngineConfig::default()
//!     .with_seed(7)
//!     .with_aura_scan_interval(0.25);
//!
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.aura_scan_interval, 0.25);
//! assert_eq!(config.min_duration, 0.1);
//! ```

use serde::{Deserialize, Serialize};

/// Default context-data key carrying a caller's dispel power.
pub const DISPEL_POWER_KEY: &str = "DispelPower";

/// Default context-data key set on applications granted by an aura.
pub const AURA_GRANTED_KEY: &str = "AuraGranted";

/// Default context-data key naming the aura owner on granted applications.
pub const AURA_OWNER_KEY: &str = "AuraOwner";

/// Tunables for the effect engine.
///
/// All times are in seconds of game time, as advanced by `EffectEngine::tick`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for crit rolls, tick jitter and weighted picks.
    pub seed: u64,

    /// How often duration effects re-evaluate their magnitude curve.
    pub duration_poll_interval: f64,

    /// How often auras rescan their radius.
    pub aura_scan_interval: f64,

    /// Floor applied to every computed finite duration.
    pub min_duration: f64,

    /// Floor applied to every computed tick period.
    pub min_period: f64,

    /// Tolerance for comparing accumulated float time.
    pub time_epsilon: f64,

    /// Transient context tag added when an instant effect crits.
    pub critical_tag: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            duration_poll_interval: 0.1,
            aura_scan_interval: 0.5,
            min_duration: 0.1,
            min_period: 0.05,
            time_epsilon: 1e-6,
            critical_tag: "Effect.Critical".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default tunables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the duration curve poll interval.
    #[must_use]
    pub fn with_duration_poll_interval(mut self, interval: f64) -> Self {
        self.duration_poll_interval = interval;
        self
    }

    /// Set the aura rescan interval.
    #[must_use]
    pub fn with_aura_scan_interval(mut self, interval: f64) -> Self {
        self.aura_scan_interval = interval;
        self
    }

    /// Set the minimum finite duration.
    #[must_use]
    pub fn with_min_duration(mut self, min: f64) -> Self {
        self.min_duration = min;
        self
    }

    /// Set the minimum tick period.
    #[must_use]
    pub fn with_min_period(mut self, min: f64) -> Self {
        self.min_period = min;
        self
    }

    /// Set the critical-hit context tag.
    #[must_use]
    pub fn with_critical_tag(mut self, tag: impl Into<String>) -> Self {
        self.critical_tag = tag.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::new();
        assert_eq!(config.duration_poll_interval, 0.1);
        assert_eq!(config.aura_scan_interval, 0.5);
        assert_eq!(config.min_duration, 0.1);
        assert_eq!(config.critical_tag, "Effect.Critical");
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_seed(99)
            .with_duration_poll_interval(0.05)
            .with_min_duration(0.2)
            .with_min_period(0.1)
            .with_critical_tag("Hit.Crit");

        assert_eq!(config.seed, 99);
        assert_eq!(config.duration_poll_interval, 0.05);
        assert_eq!(config.min_duration, 0.2);
        assert_eq!(config.min_period, 0.1);
        assert_eq!(config.critical_tag, "Hit.Crit");
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{ "seed": 5 }"#).unwrap();
        assert_eq!(config.seed, 5);
        assert_eq!(config.aura_scan_interval, 0.5);
    }
}
