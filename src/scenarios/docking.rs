use anyhow::Result;

use super::{Scenario, ScenarioCx, button_with_text};

/// Visit the docking bays and dock or undock a ship when one is available.
pub struct DockingScenario;

impl Scenario for DockingScenario {
    fn name(&self) -> &'static str {
        "docking"
    }

    fn execute(&self, cx: &ScenarioCx<'_>) -> Result<()> {
        cx.navigate("/docking")?;

        cx.scroll_by(300)?;
        cx.human_delay();

        match *cx.random_choice(&["dock", "undock", "view"]) {
            "dock" => self.attempt_dock(cx),
            "undock" => self.attempt_undock(cx),
            _ => {
                cx.scroll_by(300)?;
                cx.human_delay();
                Ok(())
            }
        }
    }
}

impl DockingScenario {
    fn attempt_dock(&self, cx: &ScenarioCx<'_>) -> Result<()> {
        // The dock button only exists while a ship is inbound.
        if !cx.try_click_and_wait(&button_with_text("Initiate Docking"), "dock button")? {
            cx.log("No ships available for docking");
        }
        Ok(())
    }

    fn attempt_undock(&self, cx: &ScenarioCx<'_>) -> Result<()> {
        if !cx.try_click_and_wait(&button_with_text("Undock Vessel"), "undock button")? {
            cx.log("No ships to undock");
        }
        Ok(())
    }
}
