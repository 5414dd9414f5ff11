use anyhow::Result;
use std::io::Write;
use taskdeck::{NewTask, Priority, SyncError, TaskApi, TaskId, TaskPatch, DESCRIPTION_LIMIT};
use tokio::io::AsyncBufRead;

use crate::app::App;
use crate::console::Console;
use crate::i18n::{Language, Msg};
use crate::ui::{render_task_detail, render_task_list};

use super::action::Action;

pub async fn run_action<A, R, W>(
    action: Action,
    app: &mut App<A>,
    console: &mut Console<R, W>,
) -> Result<()>
where
    A: TaskApi,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let lang = app.lang();
    match action {
        Action::List => show_list(app, console)?,
        Action::Refresh => match app.sync.list_tasks().await {
            Ok(_) => show_list(app, console)?,
            Err(e) => report(console, lang, &e)?,
        },
        Action::Show(reference) => {
            let Some(id) = resolve(app, console, &reference)? else {
                return Ok(());
            };
            if let Some(task) = app.sync.task(&id) {
                console.say(render_task_detail(task, &app.style()))?;
            }
        }
        Action::Add(input) => handle_add(app, console, input).await?,
        Action::Toggle {
            reference,
            confirmed,
        } => handle_toggle(app, console, &reference, confirmed).await?,
        Action::Edit { reference, patch } => handle_edit(app, console, &reference, patch).await?,
        Action::Delete(reference) => {
            let Some(id) = resolve(app, console, &reference)? else {
                return Ok(());
            };
            match app.sync.delete_task(&id).await {
                Ok(()) => console.say(lang.t(Msg::TaskDeleted))?,
                Err(e) => report(console, lang, &e)?,
            }
            show_list(app, console)?;
        }
        Action::ToggleTheme => {
            let msg = if app.toggle_theme()?.is_dark() {
                Msg::DarkModeOn
            } else {
                Msg::DarkModeOff
            };
            console.say(lang.t(msg))?;
        }
        Action::ToggleLanguage => {
            let lang = app.toggle_language()?;
            console.say(lang.t(Msg::LanguageChanged))?;
        }
        Action::Help => console.say(lang.t(Msg::ShellHelp))?,
        Action::Quit => {
            app.quit();
            console.say(lang.t(Msg::Goodbye))?;
        }
    }
    Ok(())
}

async fn handle_add<A, R, W>(
    app: &mut App<A>,
    console: &mut Console<R, W>,
    input: Option<NewTask>,
) -> Result<()>
where
    A: TaskApi,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let lang = app.lang();
    let input = match input {
        Some(input) => Some(input),
        None => prompt_new_task(console, lang).await?,
    };
    let Some(input) = input.filter(|i| !i.title.trim().is_empty()) else {
        console.say(lang.t(Msg::TitleRequired))?;
        return Ok(());
    };

    match app.sync.add_task(input).await {
        Ok(_) => console.say(lang.t(Msg::TaskAdded))?,
        Err(e) => report(console, lang, &e)?,
    }
    show_list(app, console)
}

async fn handle_toggle<A, R, W>(
    app: &mut App<A>,
    console: &mut Console<R, W>,
    reference: &str,
    confirmed: bool,
) -> Result<()>
where
    A: TaskApi,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let lang = app.lang();
    let Some(id) = resolve(app, console, reference)? else {
        return Ok(());
    };

    let reopening = app.sync.task(&id).is_some_and(|t| t.completed);
    if reopening
        && !confirmed
        && !console
            .confirm(lang, lang.t(Msg::ReopenConfirmation))
            .await?
    {
        console.say(lang.t(Msg::Cancelled))?;
        return Ok(());
    }

    match app.sync.toggle_complete(&id).await {
        Ok(true) => console.say(lang.t(Msg::TaskCompleted))?,
        Ok(false) => console.say(lang.t(Msg::TaskReopened))?,
        Err(e) => report(console, lang, &e)?,
    }
    show_list(app, console)
}

async fn handle_edit<A, R, W>(
    app: &mut App<A>,
    console: &mut Console<R, W>,
    reference: &str,
    patch: Option<TaskPatch>,
) -> Result<()>
where
    A: TaskApi,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let lang = app.lang();
    let Some(id) = resolve(app, console, reference)? else {
        return Ok(());
    };

    let patch = match patch {
        Some(patch) => patch,
        None => prompt_patch(app, console, &id).await?,
    };
    if patch.is_empty() {
        console.say(lang.t(Msg::Cancelled))?;
        return Ok(());
    }

    match app.sync.edit_task(&id, patch).await {
        Ok(()) => console.say(lang.t(Msg::TaskUpdated))?,
        Err(e) => report(console, lang, &e)?,
    }
    show_list(app, console)
}

async fn prompt_new_task<R, W>(
    console: &mut Console<R, W>,
    lang: Language,
) -> Result<Option<NewTask>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let Some(title) = console.prompt(lang.t(Msg::Title)).await? else {
        return Ok(None);
    };
    let description = console
        .prompt(&description_label(lang))
        .await?
        .unwrap_or_default();
    let priority = prompt_priority(console, lang, Priority::default()).await?;

    Ok(Some(
        NewTask::new(title.trim())
            .with_description(description.trim())
            .with_priority(priority),
    ))
}

/// Blank answers keep the current value.
async fn prompt_patch<A, R, W>(
    app: &App<A>,
    console: &mut Console<R, W>,
    id: &TaskId,
) -> Result<TaskPatch>
where
    A: TaskApi,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let lang = app.lang();
    let Some(task) = app.sync.task(id).cloned() else {
        return Ok(TaskPatch::default());
    };

    let title = console
        .prompt(&format!("{} [{}]", lang.t(Msg::Title), task.title))
        .await?;
    let description = console.prompt(&description_label(lang)).await?;
    let priority = prompt_priority(console, lang, task.priority).await?;

    Ok(TaskPatch {
        title: changed(title, &task.title),
        description: changed(description, &task.description),
        priority: (priority != task.priority).then_some(priority),
    })
}

async fn prompt_priority<R, W>(
    console: &mut Console<R, W>,
    lang: Language,
    current: Priority,
) -> Result<Priority>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let label = format!("{} [{}]", lang.t(Msg::Priority), lang.priority(current));
    loop {
        let Some(answer) = console.prompt(&label).await? else {
            return Ok(current);
        };
        if answer.trim().is_empty() {
            return Ok(current);
        }
        match lang.parse_priority(&answer) {
            Some(priority) => return Ok(priority),
            None => console.say(lang.t(Msg::InvalidPriority))?,
        }
    }
}

fn description_label(lang: Language) -> String {
    format!(
        "{} (max {DESCRIPTION_LIMIT} {})",
        lang.t(Msg::Description),
        lang.t(Msg::Characters)
    )
}

fn changed(answer: Option<String>, current: &str) -> Option<String> {
    answer
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty() && a != current)
}

fn resolve<A, R, W>(
    app: &App<A>,
    console: &mut Console<R, W>,
    reference: &str,
) -> Result<Option<TaskId>>
where
    A: TaskApi,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let id = app.resolve(reference);
    if id.is_none() {
        console.say(format!(
            "{}: {reference}",
            app.lang().t(Msg::TaskNotFound)
        ))?;
    }
    Ok(id)
}

fn show_list<A, R, W>(app: &App<A>, console: &mut Console<R, W>) -> Result<()>
where
    A: TaskApi,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    console.say(render_task_list(&app.sync.sorted_tasks(), &app.style()))
}

fn report<R, W>(console: &mut Console<R, W>, lang: Language, err: &SyncError) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    match err {
        SyncError::MissingSession => console.say(lang.t(Msg::LoginRequired)),
        SyncError::UnknownTask(id) => console.say(format!("{}: {id}", lang.t(Msg::TaskNotFound))),
        SyncError::Api(e) => console.say(format!("{}: {e}", lang.t(Msg::SyncFailed))),
    }
}
