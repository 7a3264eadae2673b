//! End-to-end smoke checks. These need a local Chromium install and a
//! reachable dashboard, so they are ignored by default; run them with
//! `TARGET_URL=http://localhost:8080 cargo test -- --ignored`.

use std::sync::Arc;
use std::time::Duration;

use rum_loadgen::config::Config;
use rum_loadgen::pool::BrowserPool;

const BASE: &[(&str, &str)] = &[
    ("BROWSER_COUNT", "1"),
    ("ITERATIONS", "2"),
    ("MIN_THINK_TIME", "50"),
    ("MAX_THINK_TIME", "100"),
    ("MIN_SCENARIO_WAIT", "100"),
    ("MAX_SCENARIO_WAIT", "200"),
    ("RUM_FLUSH_TIMEOUT", "1000"),
    ("WEIGHT_DASHBOARD", "100"),
    ("WEIGHT_DOCKING", "0"),
    ("WEIGHT_LIFE_SUPPORT", "0"),
    ("WEIGHT_POWER", "0"),
    ("WEIGHT_CREW", "0"),
    ("WEIGHT_INVENTORY", "0"),
];

/// Overrides take precedence over the base table, then the real environment
/// (for `TARGET_URL` pointing at a locally running dashboard).
fn smoke_config(overrides: &'static [(&str, &str)]) -> Config {
    Config::from_lookup(|key| {
        overrides
            .iter()
            .chain(BASE.iter())
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.to_string())
            .or_else(|| std::env::var(key).ok())
    })
}

/// A one-session pool against a live target runs exactly its two capped
/// dashboard iterations and exits cleanly without a shutdown request.
#[tokio::test]
#[ignore]
async fn single_session_completes_capped_iterations() {
    let config = smoke_config(&[]);
    let pool = BrowserPool::new(Arc::new(config));
    pool.run().await.expect("pool should run to the cap");
}

/// An unreachable target must not crash the session: the loop keeps
/// recovering until shutdown is requested from the outside.
#[tokio::test]
#[ignore]
async fn unreachable_target_recovers_until_shutdown() {
    let config = smoke_config(&[("TARGET_URL", "http://127.0.0.1:9"), ("ITERATIONS", "0")]);
    let pool = BrowserPool::new(Arc::new(config));
    let shutdown = pool.shutdown_flag();

    let stopper = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(20)).await;
        shutdown.request();
    });

    pool.run().await.expect("recovery loop should survive");
    stopper.await.expect("stopper task");
}
