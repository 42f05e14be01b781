use crate::{ui, Error, Selection, SswHome};
use anyhow::Result;
use std::io;

pub fn execute(home: &SswHome, apps: Vec<String>) -> Result<()> {
    let set = home.applications(&Selection::from_args(apps))?;
    let failures = set.load(&mut io::stdout().lock());
    report(&failures);
    Ok(())
}

// Load runs from shell init; one broken application must not stop the rest.
pub(super) fn report(failures: &[(String, Error)]) {
    for (app, err) in failures {
        if err.is_no_current() {
            tracing::debug!("Nothing to do for {app}: {err}");
        } else if matches!(err, Error::HookFailed { .. } | Error::HookSpawn { .. }) {
            ui::warn(err);
        } else {
            ui::error(format!("{app}: {err}"));
        }
    }
}
