use anyhow::Result;

use super::{Scenario, ScenarioCx, button_with_any_text, text_or_button};

/// Check the life-support systems: run a self-test, work the alert list, or
/// just look around.
pub struct LifeSupportScenario;

impl Scenario for LifeSupportScenario {
    fn name(&self) -> &'static str {
        "life-support"
    }

    fn execute(&self, cx: &ScenarioCx<'_>) -> Result<()> {
        cx.navigate("/life-support")?;

        cx.scroll_by(300)?;
        cx.human_delay();

        match *cx.random_choice(&["selfTest", "alerts", "view"]) {
            "selfTest" => self.run_self_test(cx),
            "alerts" => self.manage_alerts(cx),
            _ => {
                cx.scroll_by(200)?;
                cx.human_delay();
                Ok(())
            }
        }
    }
}

impl LifeSupportScenario {
    fn run_self_test(&self, cx: &ScenarioCx<'_>) -> Result<()> {
        let button = button_with_any_text(&["Self-Test", "Run Test"]);
        if cx.try_click(&button, "self-test")? {
            cx.log("Running self-test");
            // Give the test cycle time to report before moving on.
            cx.pause(3_000);
            cx.human_delay();
        } else {
            cx.log("No self-test button found");
        }
        Ok(())
    }

    fn manage_alerts(&self, cx: &ScenarioCx<'_>) -> Result<()> {
        if cx.try_click(&text_or_button("Alerts"), "alerts panel")? {
            let acknowledge = button_with_any_text(&["Acknowledge", "Dismiss"]);
            cx.try_click(&acknowledge, "alert acknowledgement")?;
        }
        Ok(())
    }
}
