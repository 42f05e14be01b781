use crate::{ui, SswHome, Switch};
use anyhow::{Context, Result};
use std::io;

pub fn execute(home: &SswHome, app_name: &str, env_name: &str) -> Result<()> {
    let app = home.application(app_name)?;

    let switch = app
        .make_current(env_name, &mut io::stdout().lock())
        .with_context(|| format!("Failed to switch {app_name} to {env_name}"))?;

    match switch {
        Switch::AlreadyCurrent => ui::warn(format!(
            "{env_name} is already set as the current environment for {app_name}. Nothing to do."
        )),
        Switch::Switched { previous: Some(previous) } => {
            ui::success("Switched", format!("{app_name} from {previous} to {env_name}"))
        }
        Switch::Switched { previous: None } => {
            ui::success("Using", format!("{env_name} for {app_name}"))
        }
    }
    Ok(())
}
