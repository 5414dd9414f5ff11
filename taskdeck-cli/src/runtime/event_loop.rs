use anyhow::Result;
use std::io::Write;
use taskdeck::TaskApi;
use tokio::io::AsyncBufRead;

use crate::app::App;
use crate::console::Console;
use crate::ui::render_header;

use super::action::{parse_action, Action};
use super::actions::run_action;

/// Read commands until `quit` or end of input. Starts with a refresh so the
/// first thing shown is the current list.
pub async fn run_shell<A, R, W>(app: &mut App<A>, console: &mut Console<R, W>) -> Result<()>
where
    A: TaskApi,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    console.say(render_header(&app.style()))?;
    run_action(Action::Refresh, app, console).await?;

    while app.running {
        let Some(line) = console.ask("> ").await? else {
            break;
        };
        match parse_action(&line) {
            Ok(Some(action)) => {
                tracing::debug!(?action, "shell action");
                run_action(action, app, console).await?;
            }
            Ok(None) => {}
            Err(e) => console.say(e.message(app.lang()))?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaskdeckConfig;
    use crate::i18n::{Language, Msg};
    use taskdeck::api::{DevBackend, DEV_TOKEN, DEV_USER_ID};
    use taskdeck::{Session, SyncController, SyncOptions};

    fn dev_app(backend: DevBackend) -> App<DevBackend> {
        let sync = SyncController::new(backend, SyncOptions::default())
            .with_session(Session::new(DEV_TOKEN, DEV_USER_ID));
        App::detached(sync, TaskdeckConfig::default())
    }

    #[tokio::test]
    async fn scripted_session() {
        let backend = DevBackend::seeded();
        let mut app = dev_app(backend);
        let script = "\
            add Call the bank\n\
            toggle 1\n\
            bogus\n\
            theme\n\
            quit\n\
            list\n";
        let mut console = Console::new(script.as_bytes(), Vec::new());

        run_shell(&mut app, &mut console).await.unwrap();

        let out = String::from_utf8_lossy(console.output()).into_owned();
        assert!(out.starts_with(Language::En.t(Msg::AppTitle)));
        assert!(out.contains(Language::En.t(Msg::TaskAdded)));
        assert!(out.contains(Language::En.t(Msg::TaskCompleted)));
        assert!(out.contains(Language::En.t(Msg::UnknownCommand)));
        assert!(out.contains(Language::En.t(Msg::DarkModeOn)));
        assert!(out.ends_with(&format!("{}\n", Language::En.t(Msg::Goodbye))));
        assert!(!app.running);

        let titles: Vec<String> = app.sync.sorted_tasks().into_iter().map(|t| t.title).collect();
        assert_eq!(
            titles,
            vec!["Call the bank", "Water the plants", "Renew passport", "Send invoice"]
        );
    }

    #[tokio::test]
    async fn end_of_input_ends_the_session() {
        let mut app = dev_app(DevBackend::seeded());
        let mut console = Console::new(&b"list\n"[..], Vec::new());
        run_shell(&mut app, &mut console).await.unwrap();
        assert!(app.running);
    }

    #[tokio::test]
    async fn failed_initial_load_still_opens_the_shell() {
        let backend = DevBackend::seeded();
        backend.fail_next(1);
        let mut app = dev_app(backend);
        let mut console = Console::new(&b"refresh\nquit\n"[..], Vec::new());

        run_shell(&mut app, &mut console).await.unwrap();

        let out = String::from_utf8_lossy(console.output()).into_owned();
        assert!(out.contains(Language::En.t(Msg::SyncFailed)));
        assert_eq!(app.sync.tasks().len(), 3);
    }
}
