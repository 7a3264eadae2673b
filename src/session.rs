use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use headless_chrome::protocol::cdp::Log::LogEntryLevel;
use headless_chrome::protocol::cdp::Target::CreateTarget;
use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::{info, warn};

use crate::config::Config;
use crate::flush::flush_telemetry;
use crate::pool::ShutdownFlag;
use crate::scenarios::{run_scenario, select_scenario};
use crate::timing;

const VIEWPORT: (u32, u32) = (1920, 1080);
/// Default bound for element waits and navigations on a session's page.
const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(10);
/// Settle pause after a successful in-loop recovery navigation.
const RECOVERY_PAUSE: Duration = Duration::from_millis(2_000);
/// The CDP client tears down browsers it considers idle; sessions sleep
/// between scenarios, so give them a generous allowance.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// One simulated concurrent user. The runner exclusively owns its browser
/// process, browsing context, and the single live page slot; recovery may
/// swap the page in place, but the browser and context live for the whole
/// session.
pub struct SessionRunner {
    id: u32,
    config: Arc<Config>,
    shutdown: Arc<ShutdownFlag>,
    browser: Browser,
    context_id: String,
    tab: Arc<Tab>,
    running: bool,
}

impl SessionRunner {
    /// Launch a dedicated browser process with an isolated context and one
    /// page. Failures here are fatal to pool startup.
    pub fn launch(id: u32, config: Arc<Config>, shutdown: Arc<ShutdownFlag>) -> Result<Self> {
        info!(session = id, "Launching browser");

        // Hardened flags for containerized runs; sandbox(false) adds
        // --no-sandbox on top of these.
        let args = vec![
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--disable-gpu"),
        ];
        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(false)
            .window_size(Some(VIEWPORT))
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .args(args)
            .build()
            .map_err(|err| anyhow!("invalid browser launch options: {err}"))?;

        let browser = Browser::new(options)
            .with_context(|| format!("failed to launch browser for session {id}"))?;
        let context = browser
            .new_context()
            .with_context(|| format!("failed to create browsing context for session {id}"))?;
        let context_id = context.get_id().to_string();

        let tab = Self::open_tab(&browser, &context_id)
            .with_context(|| format!("failed to open page for session {id}"))?;
        Self::prepare_tab(&tab, id)?;

        Ok(Self {
            id,
            config,
            shutdown,
            browser,
            context_id,
            tab,
            running: true,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Drive the session until the iteration cap is reached, the running flag
    /// drops, or a process-wide shutdown is requested. Scenario failures are
    /// recovered in place; only a failed page replacement propagates.
    pub fn run_loop(&mut self) -> Result<()> {
        let cap = self.config.iterations_per_session;
        let mut iterations: u64 = 0;

        if let Err(err) = self.goto_base() {
            warn!(session = self.id, error = %err, "Initial navigation failed");
        }

        while self.running && !self.shutdown.is_requested() {
            if cap > 0 && iterations >= cap {
                info!(session = self.id, iterations, "Iteration cap reached, stopping");
                break;
            }

            let outcome = select_scenario(&self.config.scenario_weights, &mut rand::rng())
                .and_then(|kind| run_scenario(kind, &self.tab, self.id, &self.config));

            match outcome {
                Ok(()) => {
                    iterations += 1;
                    let wait_ms = timing::scenario_wait(&self.config);
                    info!(session = self.id, wait_ms, "Waiting before next scenario");
                    self.shutdown.pause(Duration::from_millis(wait_ms));
                }
                Err(err) => {
                    warn!(session = self.id, error = %err, "Scenario error, recovering");
                    self.recover()?;
                }
            }
        }
        Ok(())
    }

    /// Flush telemetry and tear the browser down. Every step is best-effort;
    /// errors are logged and never returned.
    pub fn close(mut self) {
        self.running = false;
        flush_telemetry(&self.tab, self.id, &self.config);
        if let Err(err) = self.tab.close(true) {
            warn!(session = self.id, error = %err, "Page close failed");
        }
        // Dropping the browser terminates the context and the Chromium
        // process it owns.
        drop(self.browser);
        info!(session = self.id, "Browser closed");
    }

    /// Two-tier recovery: navigate home with the current page, and when that
    /// fails replace the page inside the same context. The browser and
    /// context are never discarded here.
    fn recover(&mut self) -> Result<()> {
        match self.goto_base() {
            Ok(()) => {
                self.shutdown.pause(RECOVERY_PAUSE);
            }
            Err(err) => {
                warn!(session = self.id, error = %err, "Recreating page after error");
                self.replace_page()
                    .context("failed to replace session page")?;
            }
        }
        Ok(())
    }

    fn goto_base(&self) -> Result<()> {
        self.tab
            .navigate_to(&self.config.base_url)?
            .wait_until_navigated()?;
        Ok(())
    }

    fn replace_page(&mut self) -> Result<()> {
        if let Err(err) = self.tab.close(true) {
            warn!(session = self.id, error = %err, "Old page close failed");
        }
        let tab = Self::open_tab(&self.browser, &self.context_id)?;
        Self::prepare_tab(&tab, self.id)?;
        // The slot owns exactly one live page; the old handle is released
        // before the replacement takes its place.
        self.tab = tab;
        Ok(())
    }

    fn open_tab(browser: &Browser, context_id: &str) -> Result<Arc<Tab>> {
        browser.new_tab_with_options(CreateTarget {
            url: "about:blank".to_string(),
            left: None,
            top: None,
            width: Some(VIEWPORT.0),
            height: Some(VIEWPORT.1),
            window_state: None,
            browser_context_id: Some(context_id.to_string()),
            enable_begin_frame_control: None,
            new_window: None,
            background: None,
            for_tab: None,
            hidden: None,
        })
    }

    fn prepare_tab(tab: &Arc<Tab>, id: u32) -> Result<()> {
        tab.set_default_timeout(DEFAULT_OP_TIMEOUT);
        tab.set_user_agent(&format!("NexusRUMLoadGenerator/1.0 Browser/{id}"), None, None)
            .with_context(|| format!("failed to set user agent for session {id}"))?;
        Self::attach_listeners(tab, id);
        Ok(())
    }

    /// Console and page errors are observational only; they never stop the
    /// session. Listener setup itself is also allowed to fail.
    fn attach_listeners(tab: &Arc<Tab>, id: u32) {
        if let Err(err) = tab.enable_log() {
            warn!(session = id, error = %err, "Could not enable console log capture");
        }
        if let Err(err) = tab.enable_runtime() {
            warn!(session = id, error = %err, "Could not enable runtime events");
        }

        let listener = tab.add_event_listener(Arc::new(move |event: &Event| match event {
            Event::LogEntryAdded(entry) => {
                let entry = &entry.params.entry;
                if matches!(entry.level, LogEntryLevel::Error) {
                    warn!(session = id, "Console error: {}", entry.text);
                }
            }
            Event::RuntimeExceptionThrown(exception) => {
                let details = &exception.params.exception_details;
                let message = details
                    .exception
                    .as_ref()
                    .and_then(|remote| remote.description.clone())
                    .unwrap_or_else(|| details.text.clone());
                warn!(session = id, "Page error: {message}");
            }
            _ => {}
        }));
        if let Err(err) = listener {
            warn!(session = id, error = %err, "Could not attach page listeners");
        }
    }
}
