use anyhow::Result;

use super::{Scenario, ScenarioCx, nav_link};

/// Browse the landing page: scroll through the status panels and sometimes
/// hop deeper via the navigation bar.
pub struct DashboardScenario;

impl Scenario for DashboardScenario {
    fn name(&self) -> &'static str {
        "dashboard"
    }

    fn execute(&self, cx: &ScenarioCx<'_>) -> Result<()> {
        cx.navigate("/")?;

        // Scroll through the dashboard to trigger lazy loading.
        for position in [300, 600, 900, 0] {
            cx.scroll_to(position)?;
            cx.log(&format!("Scrolled to position {position}"));
            cx.human_delay();
        }

        if cx.random_bool(0.3) {
            let target = *cx.random_choice(&["Docking", "Power", "Crew", "Life Support", "Inventory"]);
            cx.try_click_and_wait(&nav_link(target), &format!("nav link {target}"))?;
        }

        // Reading time before the session moves on.
        cx.pause(cx.random_int(2_000, 5_000));
        Ok(())
    }
}
