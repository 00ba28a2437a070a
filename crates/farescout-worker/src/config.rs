//! Worker loop settings.

use std::time::Duration;

use serde::Deserialize;

/// Tunables for the polling loop.
///
/// Durations are expressed in fractional seconds so the config file stays
/// plain TOML numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// How many failed job attempts the loop tolerates before stopping.
    pub error_budget: u32,
    /// Delay before the first fetch, giving sibling services time to come up.
    pub startup_delay_secs: f64,
    /// Base of the jittered pause between loop iterations.
    pub pace_base_secs: f64,
    /// Upper bound of the random jitter added to the base pause.
    pub pace_spread_secs: f64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            error_budget: 8,
            startup_delay_secs: 5.0,
            pace_base_secs: 2.0,
            pace_spread_secs: 5.0,
        }
    }
}

impl WorkerConfig {
    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs_f64(self.startup_delay_secs)
    }

    pub fn pace_base(&self) -> Duration {
        Duration::from_secs_f64(self.pace_base_secs)
    }

    pub fn pace_spread(&self) -> Duration {
        Duration::from_secs_f64(self.pace_spread_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment() {
        let config = WorkerConfig::default();
        assert_eq!(config.error_budget, 8);
        assert_eq!(config.startup_delay(), Duration::from_secs(5));
        assert_eq!(config.pace_base(), Duration::from_secs(2));
        assert_eq!(config.pace_spread(), Duration::from_secs(5));
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: WorkerConfig = toml::from_str("error_budget = 3").unwrap();
        assert_eq!(config.error_budget, 3);
        assert_eq!(config.pace_base_secs, 2.0);
    }
}
