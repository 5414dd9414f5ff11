use anyhow::{bail, Context, Result};
use std::io::Write;
use taskdeck::api::{DevBackend, DEV_TOKEN, DEV_USER_ID};
use taskdeck::{Session, SyncController, TaskApi, TasksClient};
use tokio::io::AsyncBufRead;

use crate::app::App;
use crate::config::TaskdeckConfig;
use crate::console::{self, Console};
use crate::i18n::Msg;
use crate::runtime::{run_action, run_shell, Action};
use crate::session_store;

pub fn login(token: Option<String>, config: &TaskdeckConfig) -> Result<()> {
    let lang = config.language;
    let token = match token {
        Some(token) => token,
        None => rpassword::prompt_password(format!("{}: ", lang.t(Msg::LoginPrompt)))
            .context("Failed to read auth token")?,
    };

    let session = match Session::from_token(token) {
        Ok(session) => session,
        Err(e) => bail!("{}: {e}", lang.t(Msg::InvalidSession)),
    };
    session_store::save_token(session.token())?;
    tracing::info!(user_id = %session.user_id(), "stored auth token");
    println!("{}", lang.t(Msg::LoginSuccess));
    Ok(())
}

pub fn logout(config: &TaskdeckConfig) -> Result<()> {
    session_store::clear_token()?;
    println!("{}", config.language.t(Msg::LoggedOut));
    Ok(())
}

pub fn config_path() -> Result<()> {
    let path = TaskdeckConfig::config_path()?;
    if !path.exists() {
        let config = TaskdeckConfig::default();
        config.save_to(&path)?;
        eprintln!("{}", config.language.t(Msg::ConfigWritten));
    }
    println!("{}", path.display());
    Ok(())
}

pub fn toggle_theme(mut config: TaskdeckConfig) -> Result<()> {
    config.theme = config.theme.toggle();
    config.save()?;
    let msg = if config.theme.is_dark() {
        Msg::DarkModeOn
    } else {
        Msg::DarkModeOff
    };
    println!("{}", config.language.t(msg));
    Ok(())
}

pub fn toggle_language(mut config: TaskdeckConfig) -> Result<()> {
    config.language = config.language.toggle();
    config.save()?;
    println!("{}", config.language.t(Msg::LanguageChanged));
    Ok(())
}

/// Run a single task command: load the session, fetch the list, act.
pub async fn run_task_command(action: Action, config: TaskdeckConfig) -> Result<()> {
    let Some(mut app) = connect(config)? else {
        return Ok(());
    };
    run_once(action, &mut app, &mut console::stdio()).await
}

/// A failed fetch only stops actions that refer to an existing task.
async fn run_once<A, R, W>(
    action: Action,
    app: &mut App<A>,
    console: &mut Console<R, W>,
) -> Result<()>
where
    A: TaskApi,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if let Err(e) = app.sync.list_tasks().await {
        let message = format!("{}: {e}", app.lang().t(Msg::SyncFailed));
        match action {
            Action::Add(_) | Action::List => console.say(message)?,
            _ => bail!(message),
        }
    }
    run_action(action, app, console).await
}

pub async fn shell(config: TaskdeckConfig) -> Result<()> {
    let Some(mut app) = connect(config)? else {
        return Ok(());
    };
    run_shell(&mut app, &mut console::stdio()).await
}

pub async fn dev(config: TaskdeckConfig) -> Result<()> {
    println!("{}", config.language.t(Msg::DevMode));
    let sync = SyncController::new(DevBackend::seeded(), config.sync_options())
        .with_session(Session::new(DEV_TOKEN, DEV_USER_ID));
    let mut app = App::new(sync, config);
    run_shell(&mut app, &mut console::stdio()).await
}

/// `None` after telling the user to log in.
fn connect(config: TaskdeckConfig) -> Result<Option<App<TasksClient>>> {
    let lang = config.language;
    let Some(token) = session_store::load_token()? else {
        println!("{}", lang.t(Msg::LoginRequired));
        return Ok(None);
    };
    let session = match Session::from_token(token) {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "stored auth token is unusable");
            println!("{}: {e}", lang.t(Msg::InvalidSession));
            println!("{}", lang.t(Msg::LoginRequired));
            return Ok(None);
        }
    };

    let client = TasksClient::new(config.api_url())
        .with_context(|| format!("Invalid api_url {}", config.api_url()))?;
    tracing::debug!(api_url = %client.base_url(), user_id = %session.user_id(), "connecting");

    let sync = SyncController::new(client, config.sync_options()).with_session(session);
    Ok(Some(App::new(sync, config)))
}
