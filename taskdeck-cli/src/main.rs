mod app;
mod cli;
mod commands;
mod config;
mod console;
mod i18n;
mod logging;
mod runtime;
mod session_store;
mod ui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::TaskdeckConfig;
use runtime::Action;
use taskdeck::{NewTask, TaskPatch};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init_tracing(cli.verbose, cli.quiet)?;
    let config = TaskdeckConfig::load()?;

    match cli.command {
        Commands::Login { token } => commands::login(token, &config),
        Commands::Logout => commands::logout(&config),
        Commands::ConfigPath => commands::config_path(),
        Commands::Theme => commands::toggle_theme(config),
        Commands::Lang => commands::toggle_language(config),
        Commands::Shell => commands::shell(config).await,
        Commands::Dev => commands::dev(config).await,
        Commands::List => commands::run_task_command(Action::List, config).await,
        Commands::Show { task } => commands::run_task_command(Action::Show(task), config).await,
        Commands::Add {
            title,
            description,
            priority,
        } => {
            let input = NewTask::new(title)
                .with_description(description.unwrap_or_default())
                .with_priority(priority.unwrap_or_default());
            commands::run_task_command(Action::Add(Some(input)), config).await
        }
        Commands::Toggle { task, yes } => {
            let action = Action::Toggle {
                reference: task,
                confirmed: yes,
            };
            commands::run_task_command(action, config).await
        }
        Commands::Edit {
            task,
            title,
            description,
            priority,
        } => {
            let patch = TaskPatch {
                title,
                description,
                priority,
            };
            let action = Action::Edit {
                reference: task,
                patch: (!patch.is_empty()).then_some(patch),
            };
            commands::run_task_command(action, config).await
        }
        Commands::Delete { task } => {
            commands::run_task_command(Action::Delete(task), config).await
        }
    }
}
