use crate::ui::Palette;
use crate::{Selection, SswHome};
use anyhow::Result;
use std::io;

pub fn execute(home: &SswHome, apps: Vec<String>) -> Result<()> {
    let set = home.applications(&Selection::from_args(apps))?;
    set.show(&mut io::stdout().lock(), &Palette::stdout())?;
    Ok(())
}
