use crate::{Selection, SswHome};
use anyhow::Result;
use std::io;

pub fn execute(home: &SswHome, apps: Vec<String>) -> Result<()> {
    let set = home.applications(&Selection::from_args(apps))?;
    let failures = set.unload(&mut io::stdout().lock());
    super::load::report(&failures);
    Ok(())
}
