use crate::cli::{Cli, Commands};
use crate::SswHome;
use anyhow::Result;

mod init;
mod list;
mod load;
mod new;
mod show;
mod unlink;
mod unload;
mod use_env;

pub fn execute(cli: Cli) -> Result<()> {
    // Resolve the home root - every command works relative to it
    let home = SswHome::resolve(cli.ssw_home.as_deref())?;

    match cli.command {
        Commands::List { apps } => list::execute(&home, apps),

        Commands::Show { apps } => show::execute(&home, apps),

        Commands::Use { app, env } => use_env::execute(&home, &app, &env),

        Commands::Unlink { app } => unlink::execute(&home, &app),

        Commands::Load { apps } => load::execute(&home, apps),

        Commands::Unload { apps } => unload::execute(&home, apps),

        Commands::New { app, env } => new::execute(&home, &app, &env),

        Commands::Init { apps } => init::execute(&home, &apps),
    }
}
