use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use headless_chrome::Tab;
use tracing::warn;

use crate::config::Config;

/// Unconditional tail wait so asynchronous telemetry sends can complete.
const FLUSH_GRACE: Duration = Duration::from_millis(500);
const SETTLE_POLL: Duration = Duration::from_millis(250);

/// Events the RUM SDK hooks for its own flush-on-unload behavior.
const FLUSH_EVENTS_JS: &str = "document.dispatchEvent(new Event('visibilitychange')); \
     window.dispatchEvent(new Event('pagehide'));";

/// Push pending client-side telemetry out of the page before it is discarded
/// or reused. Best-effort by contract: every failure is logged as a warning
/// and swallowed, including a page whose browser is already gone, and the
/// grace wait always happens.
pub fn flush_telemetry(tab: &Tab, session: u32, config: &Config) {
    match dispatch_flush_events(tab) {
        Ok(()) => {
            let timeout = Duration::from_millis(config.telemetry_flush_timeout_ms);
            if let Err(err) = settle_network(tab, timeout) {
                warn!(session, error = %err, "Telemetry flush did not settle");
            }
        }
        Err(err) => {
            warn!(session, error = %err, "Telemetry flush events failed");
        }
    }
    thread::sleep(FLUSH_GRACE);
}

fn dispatch_flush_events(tab: &Tab) -> Result<()> {
    tab.evaluate(FLUSH_EVENTS_JS, false)
        .context("failed to dispatch flush events into the page")?;
    Ok(())
}

/// Wait until the page's network activity settles: the resource-timing entry
/// count must hold still across one poll interval. Errors when the page stays
/// busy past `timeout` or becomes unreachable.
pub fn settle_network(tab: &Tab, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;
    let mut previous = resource_entry_count(tab)?;
    loop {
        thread::sleep(SETTLE_POLL);
        let current = resource_entry_count(tab)?;
        if current == previous {
            return Ok(());
        }
        previous = current;
        if Instant::now() >= deadline {
            bail!("network still active after {}ms", timeout.as_millis());
        }
    }
}

fn resource_entry_count(tab: &Tab) -> Result<u64> {
    let result = tab.evaluate("performance.getEntriesByType('resource').length", false)?;
    result
        .value
        .as_ref()
        .and_then(|value| value.as_u64())
        .context("resource entry count was not a number")
}
