use crate::{ui, SswHome};
use anyhow::{Context, Result};
use std::io;

pub fn execute(home: &SswHome, app_name: &str, env_name: &str) -> Result<()> {
    let app = home.application(app_name)?;

    let mut env = app
        .new_environment(env_name)
        .with_context(|| format!("Invalid environment name '{env_name}'"))?;
    let existed = env.path().exists();

    // Prompts go to stderr so stdout stays clean
    env.construct(&mut io::stdin().lock(), &mut io::stderr())
        .with_context(|| format!("Failed to write {env_name} for {app_name}"))?;

    let verb = if existed { "Updated" } else { "Created" };
    ui::success(verb, format!("{env_name} for {app_name} at {}", env.path().display()));
    Ok(())
}
