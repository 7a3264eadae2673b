use anyhow::Result;

use super::{Scenario, ScenarioCx, button_with_any_text, button_with_text, text_or_button};

/// Manage station supplies: browse stock, inspect cargo manifests, consume a
/// supply, or request a resupply.
pub struct InventoryScenario;

impl Scenario for InventoryScenario {
    fn name(&self) -> &'static str {
        "inventory"
    }

    fn execute(&self, cx: &ScenarioCx<'_>) -> Result<()> {
        cx.navigate("/inventory")?;

        match *cx.random_choice(&["supplies", "cargo", "consume", "resupply"]) {
            "supplies" => self.view_supplies(cx),
            "cargo" => self.view_cargo_manifests(cx),
            "consume" => self.consume_supply(cx),
            _ => self.resupply(cx),
        }
    }
}

impl InventoryScenario {
    fn view_supplies(&self, cx: &ScenarioCx<'_>) -> Result<()> {
        cx.log("Viewing supplies");
        for _ in 0..3 {
            cx.scroll_by(200)?;
            cx.human_delay();
        }
        Ok(())
    }

    fn view_cargo_manifests(&self, cx: &ScenarioCx<'_>) -> Result<()> {
        let cargo_tab = format!("{} | {}", text_or_button("Cargo"), text_or_button("Manifests"));
        if cx.try_click(&cargo_tab, "cargo manifests")? && cx.random_bool(0.3) {
            cx.try_click(&button_with_text("Unload"), "cargo unload")?;
        }
        Ok(())
    }

    fn consume_supply(&self, cx: &ScenarioCx<'_>) -> Result<()> {
        if cx.try_click(&button_with_text("Consume"), "supply consumption")? {
            let confirm = button_with_any_text(&["Confirm", "Submit"]);
            cx.try_click(&confirm, "consumption confirmation")?;
        }
        Ok(())
    }

    fn resupply(&self, cx: &ScenarioCx<'_>) -> Result<()> {
        let resupply = button_with_any_text(&["Resupply", "Request"]);
        if cx.try_click(&resupply, "resupply dialog")? {
            let confirm = button_with_any_text(&["Confirm", "Submit"]);
            if cx.try_click(&confirm, "resupply request")? {
                cx.log("Submitted resupply request");
            }
        }
        Ok(())
    }
}
