use taskdeck::{NewTask, TaskPatch};

use crate::i18n::{Language, Msg};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List,
    Refresh,
    Show(String),
    /// `None` prompts for the fields.
    Add(Option<NewTask>),
    Toggle {
        reference: String,
        confirmed: bool,
    },
    /// `None` prompts for the fields.
    Edit {
        reference: String,
        patch: Option<TaskPatch>,
    },
    Delete(String),
    ToggleTheme,
    ToggleLanguage,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    UnknownCommand,
    MissingTask,
}

impl ParseError {
    pub fn message(self, lang: Language) -> &'static str {
        match self {
            ParseError::UnknownCommand => lang.t(Msg::UnknownCommand),
            ParseError::MissingTask => lang.t(Msg::TaskRequired),
        }
    }
}

/// Parse one shell line. Blank lines yield `Ok(None)`.
pub fn parse_action(line: &str) -> Result<Option<Action>, ParseError> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let action = match command.to_lowercase().as_str() {
        "" => return Ok(None),
        "list" | "ls" => Action::List,
        "refresh" | "r" => Action::Refresh,
        "add" | "new" => Action::Add((!rest.is_empty()).then(|| NewTask::new(rest))),
        "show" => Action::Show(task_ref(rest)?),
        "toggle" | "done" => {
            let mut confirmed = false;
            let mut reference = None;
            for word in rest.split_whitespace() {
                match word {
                    "-y" | "--yes" => confirmed = true,
                    other => reference = Some(other.to_string()),
                }
            }
            Action::Toggle {
                reference: reference.ok_or(ParseError::MissingTask)?,
                confirmed,
            }
        }
        "edit" => Action::Edit {
            reference: task_ref(rest)?,
            patch: None,
        },
        "delete" | "rm" => Action::Delete(task_ref(rest)?),
        "theme" | "dark" => Action::ToggleTheme,
        "lang" | "language" | "idioma" => Action::ToggleLanguage,
        "help" | "?" | "ayuda" => Action::Help,
        "quit" | "exit" | "q" | "salir" => Action::Quit,
        _ => return Err(ParseError::UnknownCommand),
    };
    Ok(Some(action))
}

fn task_ref(rest: &str) -> Result<String, ParseError> {
    rest.split_whitespace()
        .next()
        .map(str::to_string)
        .ok_or(ParseError::MissingTask)
}
