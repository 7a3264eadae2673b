use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;

use serde::Serialize;

use crate::logging::LogFormat;

/// Scenario weight defaults: (weight-table key, environment variable, weight).
const SCENARIO_WEIGHT_DEFAULTS: &[(&str, &str, u32)] = &[
    ("dashboard", "WEIGHT_DASHBOARD", 30),
    ("docking", "WEIGHT_DOCKING", 20),
    ("lifeSupport", "WEIGHT_LIFE_SUPPORT", 15),
    ("power", "WEIGHT_POWER", 15),
    ("crew", "WEIGHT_CREW", 10),
    ("inventory", "WEIGHT_INVENTORY", 10),
];

/// Immutable snapshot of the run parameters, resolved once at process entry
/// and shared by reference with every component.
///
/// Malformed environment values fall back to their defaults; resolution never
/// fails and the environment is never re-read after construction.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Base URL of the target dashboard.
    pub base_url: String,
    /// Number of concurrent simulated user sessions.
    pub session_count: u32,
    /// Per-session scenario cap; 0 means unbounded.
    pub iterations_per_session: u64,
    pub min_think_time_ms: u64,
    pub max_think_time_ms: u64,
    pub min_scenario_wait_ms: u64,
    pub max_scenario_wait_ms: u64,
    /// Upper bound on the telemetry network-settle wait.
    pub telemetry_flush_timeout_ms: u64,
    pub headless: bool,
    /// Extra pause applied after every navigation and click.
    pub slow_mo_ms: u64,
    /// Relative scenario weights keyed by scenario name.
    pub scenario_weights: BTreeMap<String, u32>,
    pub log_format: LogFormat,
}

impl Config {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup. Tests inject a
    /// fixed table here instead of mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let scenario_weights = SCENARIO_WEIGHT_DEFAULTS
            .iter()
            .map(|(name, key, default)| ((*name).to_string(), parsed_or(&lookup, key, *default)))
            .collect();

        Self {
            base_url: lookup("TARGET_URL").unwrap_or_else(|| "http://cortex:8080".to_string()),
            session_count: parsed_or(&lookup, "BROWSER_COUNT", 2),
            iterations_per_session: parsed_or(&lookup, "ITERATIONS", 0),
            min_think_time_ms: parsed_or(&lookup, "MIN_THINK_TIME", 500),
            max_think_time_ms: parsed_or(&lookup, "MAX_THINK_TIME", 2_000),
            min_scenario_wait_ms: parsed_or(&lookup, "MIN_SCENARIO_WAIT", 3_000),
            max_scenario_wait_ms: parsed_or(&lookup, "MAX_SCENARIO_WAIT", 8_000),
            telemetry_flush_timeout_ms: parsed_or(&lookup, "RUM_FLUSH_TIMEOUT", 5_000),
            headless: lookup("HEADLESS").map(|value| value != "false").unwrap_or(true),
            slow_mo_ms: parsed_or(&lookup, "SLOW_MO", 0),
            scenario_weights,
            log_format: LogFormat::parse(lookup("LOG_FORMAT").as_deref()),
        }
    }

    /// Sum of all configured scenario weights.
    pub fn total_weight(&self) -> u64 {
        self.scenario_weights
            .values()
            .map(|weight| u64::from(*weight))
            .sum()
    }
}

fn parsed_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(pairs: &[(&str, &str)]) -> Config {
        Config::from_lookup(|key| {
            pairs
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
        })
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = config_with(&[]);
        assert_eq!(config.base_url, "http://cortex:8080");
        assert_eq!(config.session_count, 2);
        assert_eq!(config.iterations_per_session, 0);
        assert_eq!(config.min_think_time_ms, 500);
        assert_eq!(config.max_think_time_ms, 2_000);
        assert_eq!(config.min_scenario_wait_ms, 3_000);
        assert_eq!(config.max_scenario_wait_ms, 8_000);
        assert_eq!(config.telemetry_flush_timeout_ms, 5_000);
        assert!(config.headless);
        assert_eq!(config.slow_mo_ms, 0);
        assert_eq!(config.log_format, LogFormat::Plain);
        assert_eq!(config.total_weight(), 100);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_with(&[
            ("TARGET_URL", "http://localhost:9000"),
            ("BROWSER_COUNT", "5"),
            ("ITERATIONS", "12"),
            ("WEIGHT_DASHBOARD", "80"),
            ("LOG_FORMAT", "json"),
        ]);
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.session_count, 5);
        assert_eq!(config.iterations_per_session, 12);
        assert_eq!(config.scenario_weights["dashboard"], 80);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn malformed_numbers_fall_back_to_defaults() {
        let config = config_with(&[
            ("BROWSER_COUNT", "several"),
            ("MIN_THINK_TIME", "-40"),
            ("WEIGHT_CREW", "1.5"),
        ]);
        assert_eq!(config.session_count, 2);
        assert_eq!(config.min_think_time_ms, 500);
        assert_eq!(config.scenario_weights["crew"], 10);
    }

    #[test]
    fn headless_is_disabled_only_by_exact_false() {
        assert!(!config_with(&[("HEADLESS", "false")]).headless);
        assert!(config_with(&[("HEADLESS", "no")]).headless);
        assert!(config_with(&[("HEADLESS", "FALSE")]).headless);
        assert!(config_with(&[]).headless);
    }

    #[test]
    fn weight_table_covers_all_six_scenarios() {
        let config = config_with(&[]);
        for name in [
            "dashboard",
            "docking",
            "lifeSupport",
            "power",
            "crew",
            "inventory",
        ] {
            assert!(config.scenario_weights.contains_key(name), "missing {name}");
        }
    }
}
