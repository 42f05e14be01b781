use crate::{ui, HomePath, SswHome};
use anyhow::Result;

pub fn execute(home: &SswHome, apps: &[String]) -> Result<()> {
    let root = home.path(HomePath::Root);
    let fresh = !home.exists();

    let created = home.init(apps)?;
    if fresh {
        ui::success("Initialized", root.display());
    } else if created.is_empty() {
        ui::info(format!("{} is already initialized", root.display()));
    }
    for dir in created {
        ui::success("Created", dir.display());
    }
    Ok(())
}
