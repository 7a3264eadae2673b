use anyhow::Result;

use super::{Scenario, ScenarioCx, button_with_any_text, text_or_button};

/// Review the crew roster or section assignments, occasionally relocating a
/// crew member.
pub struct CrewScenario;

impl Scenario for CrewScenario {
    fn name(&self) -> &'static str {
        "crew"
    }

    fn execute(&self, cx: &ScenarioCx<'_>) -> Result<()> {
        cx.navigate("/crew")?;

        match *cx.random_choice(&["roster", "sections"]) {
            "roster" => self.view_roster(cx)?,
            _ => self.view_sections(cx)?,
        }

        if cx.random_bool(0.3) {
            self.relocate_crew_member(cx)?;
        }
        Ok(())
    }
}

impl CrewScenario {
    fn view_roster(&self, cx: &ScenarioCx<'_>) -> Result<()> {
        cx.scroll_by(400)?;
        cx.log("Viewing crew roster");
        cx.human_delay();

        // Header row is index 1; pick one of the first few entries below it.
        let row = cx.random_int(2, 6);
        if cx.try_click(&format!("(//tr)[{row}]"), "crew member row")? {
            cx.log("Selected crew member");
        }
        Ok(())
    }

    fn view_sections(&self, cx: &ScenarioCx<'_>) -> Result<()> {
        cx.try_click(&text_or_button("Sections"), "sections view")?;
        cx.scroll_by(300)?;
        cx.human_delay();
        Ok(())
    }

    fn relocate_crew_member(&self, cx: &ScenarioCx<'_>) -> Result<()> {
        let relocate = button_with_any_text(&["Relocate", "Move"]);
        if cx.try_click(&relocate, "relocation dialog")? {
            let confirm = button_with_any_text(&["Confirm", "Submit"]);
            if cx.try_click(&confirm, "relocation confirmation")? {
                cx.log("Confirmed relocation");
            }
        }
        Ok(())
    }
}
