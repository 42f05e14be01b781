use crate::{ui, SswHome};
use anyhow::{Context, Result};

pub fn execute(home: &SswHome, app_name: &str) -> Result<()> {
    let app = home.application(app_name)?;

    match app.current_name()? {
        Some(current) => {
            app.unlink()
                .with_context(|| format!("Failed to unlink {app_name}"))?;
            ui::success("Unlinked", format!("{current} for {app_name}"));
        }
        None => ui::info(format!("No environment currently in use for {app_name}")),
    }
    Ok(())
}
