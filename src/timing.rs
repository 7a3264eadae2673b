use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::config::Config;

/// Uniform integer draw over `[min, max]` inclusive. A degenerate range
/// (`min >= max`) collapses to `min`.
pub fn random_in_range(min: u64, max: u64) -> u64 {
    if min >= max {
        return min;
    }
    rand::rng().random_range(min..=max)
}

/// Pause length simulating a human reading or deciding, in milliseconds.
pub fn think_time(config: &Config) -> u64 {
    random_in_range(config.min_think_time_ms, config.max_think_time_ms)
}

/// Pause length simulating a human's break between tasks, in milliseconds.
pub fn scenario_wait(config: &Config) -> u64 {
    random_in_range(config.min_scenario_wait_ms, config.max_scenario_wait_ms)
}

/// Block the calling session for one think-time draw.
pub fn human_delay(config: &Config) {
    thread::sleep(Duration::from_millis(think_time(config)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_ranges(think: (u64, u64), wait: (u64, u64)) -> Config {
        let pairs = [
            ("MIN_THINK_TIME", think.0.to_string()),
            ("MAX_THINK_TIME", think.1.to_string()),
            ("MIN_SCENARIO_WAIT", wait.0.to_string()),
            ("MAX_SCENARIO_WAIT", wait.1.to_string()),
        ];
        Config::from_lookup(|key| {
            pairs
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.clone())
        })
    }

    #[test]
    fn random_in_range_is_inclusive() {
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..2_000 {
            let value = random_in_range(3, 5);
            assert!((3..=5).contains(&value));
            seen_min |= value == 3;
            seen_max |= value == 5;
        }
        assert!(seen_min && seen_max, "bounds should both be reachable");
    }

    #[test]
    fn degenerate_range_collapses_to_min() {
        assert_eq!(random_in_range(7, 7), 7);
        assert_eq!(random_in_range(9, 2), 9);
        assert_eq!(random_in_range(0, 0), 0);
    }

    #[test]
    fn think_time_respects_configured_bounds() {
        let config = config_with_ranges((100, 300), (1_000, 2_000));
        for _ in 0..500 {
            assert!((100..=300).contains(&think_time(&config)));
        }
    }

    #[test]
    fn scenario_wait_handles_equal_bounds() {
        let config = config_with_ranges((100, 300), (1_500, 1_500));
        for _ in 0..50 {
            assert_eq!(scenario_wait(&config), 1_500);
        }
    }
}
