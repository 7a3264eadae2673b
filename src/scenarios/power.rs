use anyhow::Result;

use super::{Scenario, ScenarioCx, button_with_any_text};

/// Work the power grid: allocate or deallocate power, or just review it.
pub struct PowerScenario;

impl Scenario for PowerScenario {
    fn name(&self) -> &'static str {
        "power"
    }

    fn execute(&self, cx: &ScenarioCx<'_>) -> Result<()> {
        cx.navigate("/power")?;

        cx.scroll_by(300)?;
        cx.human_delay();

        match *cx.random_choice(&["allocate", "deallocate", "view"]) {
            "allocate" => self.allocate_power(cx),
            "deallocate" => self.deallocate_power(cx),
            _ => {
                cx.scroll_by(300)?;
                cx.human_delay();
                Ok(())
            }
        }
    }
}

impl PowerScenario {
    fn allocate_power(&self, cx: &ScenarioCx<'_>) -> Result<()> {
        let allocate = button_with_any_text(&["Allocate", "Add Allocation"]);
        if cx.try_click(&allocate, "power allocation")? {
            let confirm = button_with_any_text(&["Confirm", "Submit"]);
            cx.try_click(&confirm, "allocation confirmation")?;
        } else {
            cx.log("No allocate button found");
        }
        Ok(())
    }

    fn deallocate_power(&self, cx: &ScenarioCx<'_>) -> Result<()> {
        let deallocate = button_with_any_text(&["Deallocate", "Remove"]);
        if !cx.try_click_and_wait(&deallocate, "power deallocation")? {
            cx.log("No deallocate button found");
        }
        Ok(())
    }
}
