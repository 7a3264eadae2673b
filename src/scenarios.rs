pub mod crew;
pub mod dashboard;
pub mod docking;
pub mod inventory;
pub mod life_support;
pub mod power;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use headless_chrome::Tab;
use headless_chrome::browser::tab::element::Element;
use rand::Rng;
use tracing::{info, warn};

use crate::config::Config;
use crate::flush::{flush_telemetry, settle_network};
use crate::timing;

use self::crew::CrewScenario;
use self::dashboard::DashboardScenario;
use self::docking::DockingScenario;
use self::inventory::InventoryScenario;
use self::life_support::LifeSupportScenario;
use self::power::PowerScenario;

/// How long an existence probe waits before concluding the target is absent.
/// Absence is a normal page state (no ship to dock, no alert to dismiss),
/// never an error.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Bound on post-click network settling, mirroring a page-transition wait.
const ACTION_SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// One scripted user task. Implementations are stateless descriptors bound to
/// a page and session only for a single run, then discarded.
pub trait Scenario {
    fn name(&self) -> &'static str;
    fn execute(&self, cx: &ScenarioCx<'_>) -> Result<()>;
}

/// Fixed registry of scenario kinds. Lookup by name is an explicit error
/// path; there is no silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioKind {
    Dashboard,
    Docking,
    LifeSupport,
    Power,
    Crew,
    Inventory,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 6] = [
        ScenarioKind::Dashboard,
        ScenarioKind::Docking,
        ScenarioKind::LifeSupport,
        ScenarioKind::Power,
        ScenarioKind::Crew,
        ScenarioKind::Inventory,
    ];

    /// Canonical weight-table key for this scenario.
    pub fn key(self) -> &'static str {
        match self {
            ScenarioKind::Dashboard => "dashboard",
            ScenarioKind::Docking => "docking",
            ScenarioKind::LifeSupport => "lifeSupport",
            ScenarioKind::Power => "power",
            ScenarioKind::Crew => "crew",
            ScenarioKind::Inventory => "inventory",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dashboard" => Some(ScenarioKind::Dashboard),
            "docking" => Some(ScenarioKind::Docking),
            "lifeSupport" | "life-support" => Some(ScenarioKind::LifeSupport),
            "power" => Some(ScenarioKind::Power),
            "crew" => Some(ScenarioKind::Crew),
            "inventory" => Some(ScenarioKind::Inventory),
            _ => None,
        }
    }

    /// Construct a fresh single-use scenario value.
    pub fn build(self) -> Box<dyn Scenario> {
        match self {
            ScenarioKind::Dashboard => Box::new(DashboardScenario),
            ScenarioKind::Docking => Box::new(DockingScenario),
            ScenarioKind::LifeSupport => Box::new(LifeSupportScenario),
            ScenarioKind::Power => Box::new(PowerScenario),
            ScenarioKind::Crew => Box::new(CrewScenario),
            ScenarioKind::Inventory => Box::new(InventoryScenario),
        }
    }
}

/// Pick the next scenario with probability proportional to its weight.
///
/// Subtractive walk over the table: O(number of scenarios), independent of
/// weight magnitude. A table that sums to zero or names an unknown scenario
/// is a hard error; silently defaulting would skew the traffic mix.
pub fn select_scenario<R: Rng>(
    weights: &BTreeMap<String, u32>,
    rng: &mut R,
) -> Result<ScenarioKind> {
    let mut table = Vec::with_capacity(weights.len());
    let mut total: u64 = 0;
    for (name, weight) in weights {
        let kind = ScenarioKind::from_name(name)
            .ok_or_else(|| anyhow!("unknown scenario in weight table: {name}"))?;
        total += u64::from(*weight);
        table.push((kind, u64::from(*weight)));
    }
    if total == 0 {
        bail!("scenario weight table sums to zero");
    }

    let mut draw = rng.random_range(0..total);
    for (kind, weight) in table {
        if draw < weight {
            return Ok(kind);
        }
        draw -= weight;
    }
    bail!("weighted draw exhausted the scenario table")
}

/// Run one scenario to completion: log start, execute, log the outcome,
/// re-raise any failure, and always flush telemetry afterwards.
pub fn run_scenario(kind: ScenarioKind, tab: &Arc<Tab>, session: u32, config: &Config) -> Result<()> {
    let scenario = kind.build();
    let cx = ScenarioCx {
        tab,
        session,
        config,
        name: scenario.name(),
    };

    info!(session, scenario = scenario.name(), "Starting scenario");
    let result = scenario.execute(&cx);
    match &result {
        Ok(()) => info!(session, scenario = scenario.name(), "Scenario completed"),
        Err(err) => {
            warn!(session, scenario = scenario.name(), error = %err, "Scenario failed");
        }
    }
    flush_telemetry(tab, session, config);
    result
}

/// Per-run execution context shared by every scenario script: one page, one
/// session identity, and the helpers the scripts are written against.
pub struct ScenarioCx<'a> {
    tab: &'a Arc<Tab>,
    session: u32,
    config: &'a Config,
    name: &'static str,
}

impl ScenarioCx<'_> {
    pub fn log(&self, message: &str) {
        info!(session = self.session, scenario = self.name, "{message}");
    }

    /// Navigate relative to the configured base URL, wait for the page and
    /// its network activity to settle, then take a think-time pause.
    pub fn navigate(&self, path: &str) -> Result<()> {
        self.log(&format!("Navigating to {path}"));
        let url = join_url(&self.config.base_url, path);
        self.tab.navigate_to(&url)?.wait_until_navigated()?;
        settle_network(self.tab, ACTION_SETTLE_TIMEOUT)?;
        self.slow_mo();
        self.human_delay();
        Ok(())
    }

    /// Click an element that must exist; failure to find it is an error.
    pub fn click(&self, xpath: &str, description: &str) -> Result<()> {
        self.log(&format!("Clicking: {description}"));
        self.tab.wait_for_xpath(xpath)?.click()?;
        self.slow_mo();
        self.human_delay();
        Ok(())
    }

    /// `click` followed by a network-settle wait, for actions that trigger a
    /// page transition or async reload.
    pub fn click_and_wait(&self, xpath: &str, description: &str) -> Result<()> {
        self.click(xpath, description)?;
        settle_network(self.tab, ACTION_SETTLE_TIMEOUT)?;
        Ok(())
    }

    /// Bounded existence check for an interactive element.
    pub fn probe(&self, xpath: &str) -> Option<Element<'_>> {
        self.tab
            .wait_for_xpath_with_custom_timeout(xpath, PROBE_TIMEOUT)
            .ok()
    }

    /// Probe for an element and click it when present. Returns whether a
    /// click happened so callers can log their own no-op message.
    pub fn try_click(&self, xpath: &str, description: &str) -> Result<bool> {
        match self.probe(xpath) {
            Some(element) => {
                self.log(&format!("Clicking: {description}"));
                element.click()?;
                self.slow_mo();
                self.human_delay();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// `try_click` plus a network-settle wait after a successful click.
    pub fn try_click_and_wait(&self, xpath: &str, description: &str) -> Result<bool> {
        if self.try_click(xpath, description)? {
            settle_network(self.tab, ACTION_SETTLE_TIMEOUT)?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn scroll_by(&self, pixels: i64) -> Result<()> {
        self.tab
            .evaluate(&format!("window.scrollBy(0, {pixels})"), false)?;
        Ok(())
    }

    pub fn scroll_to(&self, position: i64) -> Result<()> {
        self.tab
            .evaluate(&format!("window.scrollTo(0, {position})"), false)?;
        Ok(())
    }

    pub fn pause(&self, ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }

    pub fn human_delay(&self) {
        timing::human_delay(self.config);
    }

    /// Pick one entry from a non-empty slice.
    pub fn random_choice<'t, T>(&self, items: &'t [T]) -> &'t T {
        &items[rand::rng().random_range(0..items.len())]
    }

    pub fn random_int(&self, min: u64, max: u64) -> u64 {
        timing::random_in_range(min, max)
    }

    pub fn random_bool(&self, probability: f64) -> bool {
        rand::rng().random_bool(probability)
    }

    fn slow_mo(&self) {
        if self.config.slow_mo_ms > 0 {
            thread::sleep(Duration::from_millis(self.config.slow_mo_ms));
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// XPath for an element whose visible text contains `label`.
pub fn with_text(tag: &str, label: &str) -> String {
    format!("//{tag}[contains(normalize-space(.), \"{label}\")]")
}

pub fn button_with_text(label: &str) -> String {
    with_text("button", label)
}

/// Union over buttons carrying any of the given labels.
pub fn button_with_any_text(labels: &[&str]) -> String {
    labels
        .iter()
        .map(|label| button_with_text(label))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Matches a text node with exactly `label`, or a button containing it.
pub fn text_or_button(label: &str) -> String {
    format!(
        "//*[normalize-space(text())=\"{label}\"] | {}",
        button_with_text(label)
    )
}

/// Navigation link with the exact visible label.
pub fn nav_link(label: &str) -> String {
    format!("//nav//a[normalize-space(.)=\"{label}\"]")
}
