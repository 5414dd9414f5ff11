use clap::{ArgAction, Parser, Subcommand};
use taskdeck::Priority;

#[derive(Debug, Parser)]
#[command(name = "taskdeck")]
#[command(about = "Terminal client for a personal to-do list")]
pub struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Less log output (-q errors only, -qq none)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Store an auth token (prompted for when not given)
    Login {
        #[arg(long)]
        token: Option<String>,
    },
    /// Remove the stored auth token
    Logout,
    /// List your tasks
    List,
    /// Add a task
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        /// low, medium, high or 1-3
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// Show one task in detail
    Show {
        /// List number or task id
        task: String,
    },
    /// Mark a task complete, or reopen it
    Toggle {
        task: String,
        /// Reopen without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Change a task's title, description or priority
    Edit {
        task: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// Delete a task
    Delete { task: String },
    /// Interactive session against the configured server
    Shell,
    /// Interactive session with local in-memory data
    Dev,
    /// Toggle dark mode
    Theme,
    /// Switch between English and Spanish
    Lang,
    /// Print config path and create default file if missing
    ConfigPath,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_with_priority_code() {
        let cli = Cli::parse_from(["taskdeck", "add", "Buy milk", "-p", "3", "-d", "two liters"]);
        match cli.command {
            Commands::Add {
                title,
                description,
                priority,
            } => {
                assert_eq!(title, "Buy milk");
                assert_eq!(description.as_deref(), Some("two liters"));
                assert_eq!(priority, Some(Priority::High));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn verbosity_flags_are_global() {
        let cli = Cli::parse_from(["taskdeck", "list", "-vv"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.quiet, 0);
    }

    #[test]
    fn rejects_unknown_priority() {
        assert!(Cli::try_parse_from(["taskdeck", "add", "x", "-p", "urgent"]).is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
