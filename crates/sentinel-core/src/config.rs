//! Simulation configuration.
//!
//! All tunables live in `sentinel-config.yaml`; every field has a serde
//! default matching the observed behavior of the console, so a missing or
//! partial file still yields a fully playable configuration.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SentinelConfig {
    /// Timer intervals and one-shot delays.
    pub timing: TimingConfig,
    /// Dispatch queue tunables.
    pub queue: QueueConfig,
    /// Emergency scheduler tunables.
    pub emergency: EmergencyConfig,
    /// Citizen roster tunables.
    pub roster: RosterConfig,
    /// Frequency scanner tunables.
    pub scanner: ScannerConfig,
}

/// Timer intervals and one-shot delays, all owned by the app runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Dispatch queue replenishment interval in seconds.
    pub dispatch_interval_secs: u64,
    /// Emergency poll interval in seconds.
    pub emergency_poll_secs: u64,
    /// Emergency countdown tick in seconds.
    pub countdown_tick_secs: u64,
    /// Phone ringing-to-connected delay in milliseconds.
    pub ring_delay_ms: u64,
    /// Emergency result display dwell in seconds.
    pub result_dwell_secs: u64,
    /// Signal lock confirmation delay in milliseconds.
    pub lock_confirm_ms: u64,
    /// Failed scan animation duration in milliseconds.
    pub scan_fail_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            dispatch_interval_secs: 10,
            emergency_poll_secs: 30,
            countdown_tick_secs: 1,
            ring_delay_ms: 2500,
            result_dwell_secs: 3,
            lock_confirm_ms: 1500,
            scan_fail_ms: 500,
        }
    }
}

/// Dispatch queue tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Replenishment floor: a tick adds a call only while length is below.
    pub floor: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { floor: 6 }
    }
}

/// Emergency scheduler tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyConfig {
    /// Probability that a poll tick fires an emergency, in [0,1].
    pub probability: f64,
    /// Countdown duration in seconds.
    pub duration_secs: u32,
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self {
            probability: 0.15,
            duration_secs: 15,
        }
    }
}

/// Citizen roster tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Number of citizens fabricated at session start.
    pub seed_count: usize,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self { seed_count: 200 }
    }
}

/// Frequency scanner tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Minimum signal strength at which a lock attempt succeeds.
    pub lock_threshold: f64,
    /// Dial distance at which signal strength falls to zero.
    pub falloff: f64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            lock_threshold: 0.95,
            falloff: 15.0,
        }
    }
}

impl SentinelConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        serde_yml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Load from a YAML file, falling back to defaults when the file is
    /// absent. A malformed file is still an error; a typo'd config should
    /// not silently revert every tunable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the file exists but is malformed.
    pub fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        if std::path::Path::new(path).exists() {
            Self::load(path)
        } else {
            info!(path, "config file not found, using defaults");
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_observed_behavior() {
        let config = SentinelConfig::default();
        assert_eq!(config.timing.dispatch_interval_secs, 10);
        assert_eq!(config.timing.emergency_poll_secs, 30);
        assert_eq!(config.timing.ring_delay_ms, 2500);
        assert_eq!(config.queue.floor, 6);
        assert!((config.emergency.probability - 0.15).abs() < f64::EPSILON);
        assert_eq!(config.emergency.duration_secs, 15);
        assert_eq!(config.roster.seed_count, 200);
        assert!((config.scanner.lock_threshold - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: SentinelConfig = serde_yml::from_str(
            "queue:\n  floor: 8\nemergency:\n  probability: 0.5\n",
        )
        .unwrap();
        assert_eq!(config.queue.floor, 8);
        assert!((config.emergency.probability - 0.5).abs() < f64::EPSILON);
        // Untouched sections keep their defaults.
        assert_eq!(config.timing.dispatch_interval_secs, 10);
        assert_eq!(config.roster.seed_count, 200);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = SentinelConfig::load_or_default("/nonexistent/sentinel-config.yaml");
        assert!(config.is_ok());
        assert_eq!(config.unwrap(), SentinelConfig::default());
    }
}
