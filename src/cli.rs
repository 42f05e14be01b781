use clap::{Parser, Subcommand};

/// Sellsword - switch between named application environments
///
/// ssw keeps several configurations per application (AWS credential sets,
/// Chef directories, ...) under a home directory and marks one of them as
/// current with a symlink. Variable environments are exported to the shell,
/// so wrap switching commands in eval:
///
///     eval "$(ssw use aws acme)"
#[derive(Parser, Debug)]
#[command(name = "ssw", author, version, about, long_about)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Home directory for ssw (defaults to ~/.ssw)
    #[arg(
        short = 's',
        long = "ssw-home",
        value_name = "DIR",
        env = "SSW_HOME",
        global = true
    )]
    pub ssw_home: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available environments for each application
    List {
        /// Application names (all applications if omitted)
        #[arg(value_name = "APP")]
        apps: Vec<String>,
    },

    /// Show the environment in use for each application
    Show {
        /// Application names (all applications if omitted)
        #[arg(value_name = "APP")]
        apps: Vec<String>,
    },

    /// Make an environment current for an application
    ///
    /// Prints unset/export statements for variable environments; evaluate
    /// the output in your shell.
    Use {
        /// Application name
        #[arg(value_name = "APP")]
        app: String,

        /// Environment name
        #[arg(value_name = "ENV")]
        env: String,
    },

    /// Unlink the current environment, leaving none configured
    Unlink {
        /// Application name
        #[arg(value_name = "APP")]
        app: String,
    },

    /// Print export statements for the current environments (used in shell init)
    Load {
        /// Application names (all applications if omitted)
        #[arg(value_name = "APP")]
        apps: Vec<String>,
    },

    /// Print unset statements and run unload hooks
    Unload {
        /// Application names (all applications if omitted)
        #[arg(value_name = "APP")]
        apps: Vec<String>,
    },

    /// Create or edit a variable environment interactively
    New {
        /// Application name
        #[arg(value_name = "APP")]
        app: String,

        /// Environment name
        #[arg(value_name = "ENV")]
        env: String,
    },

    /// Create the home directory layout
    Init {
        /// Application directories to create
        #[arg(value_name = "APP")]
        apps: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_use() {
        let cli = Cli::try_parse_from(["ssw", "-s", "/tmp/ssw", "use", "aws", "acme"]).unwrap();

        assert_eq!(cli.ssw_home.as_deref(), Some("/tmp/ssw"));
        assert!(matches!(
            cli.command,
            Commands::Use { ref app, ref env } if app == "aws" && env == "acme"
        ));
    }

    #[test]
    fn test_use_requires_env() {
        assert!(Cli::try_parse_from(["ssw", "use", "aws"]).is_err());
    }

    #[test]
    fn test_list_accepts_many_apps() {
        let cli = Cli::try_parse_from(["ssw", "list", "aws", "chef", "-v"]).unwrap();

        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::List { ref apps } if apps.len() == 2));
    }
}
