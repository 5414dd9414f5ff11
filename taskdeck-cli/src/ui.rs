use crossterm::style::{Color, Stylize};
use serde::{Deserialize, Serialize};
use taskdeck::{Priority, Task, DESCRIPTION_LIMIT};

use crate::i18n::{Language, Msg};

/// Light or dark colour scheme, persisted in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                heading: Color::DarkBlue,
                high: Color::DarkRed,
                medium: Color::DarkYellow,
                low: Color::DarkGreen,
                done: Color::DarkGrey,
                muted: Color::DarkGrey,
            },
            Theme::Dark => Palette {
                heading: Color::Cyan,
                high: Color::Red,
                medium: Color::Yellow,
                low: Color::Green,
                done: Color::Grey,
                muted: Color::Grey,
            },
        }
    }
}

struct Palette {
    heading: Color,
    high: Color,
    medium: Color,
    low: Color,
    done: Color,
    muted: Color,
}

impl Palette {
    fn priority(&self, priority: Priority) -> Color {
        match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }
}

/// Everything the renderers need to know about presentation.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub language: Language,
    pub theme: Theme,
    /// Emit ANSI colours. Off when stdout is not a terminal.
    pub color: bool,
}

impl Style {
    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).bold().to_string()
        } else {
            text.to_string()
        }
    }
}

const PREVIEW_CHARS: usize = 60;

pub fn render_header(style: &Style) -> String {
    let palette = style.theme.palette();
    style.bold(style.language.t(Msg::AppTitle), palette.heading)
}

/// Numbered list in the order given; the numbers are what `show`, `toggle`,
/// `edit` and `delete` accept.
pub fn render_task_list(tasks: &[Task], style: &Style) -> String {
    let lang = style.language;
    let palette = style.theme.palette();

    if tasks.is_empty() {
        return style.paint(lang.t(Msg::NoTasks), palette.muted);
    }

    let mut out = style.bold(lang.t(Msg::Tasks), palette.heading);
    for (index, task) in tasks.iter().enumerate() {
        let mark = if task.completed { "x" } else { " " };
        let title = if task.completed {
            style.paint(&task.title, palette.done)
        } else {
            task.title.clone()
        };
        let badge = style.paint(
            &format!("[{}]", lang.priority(task.priority)),
            palette.priority(task.priority),
        );
        out.push_str(&format!("\n{:>3}. [{mark}] {title} {badge}", index + 1));

        if let Some(preview) = preview(&task.description) {
            out.push_str(&format!("\n       {}", style.paint(&preview, palette.muted)));
        }
    }
    out
}

pub fn render_task_detail(task: &Task, style: &Style) -> String {
    let lang = style.language;
    let palette = style.theme.palette();

    let status = if task.completed {
        style.paint(lang.t(Msg::Completed), palette.done)
    } else {
        style.paint(lang.t(Msg::Pending), palette.priority(Priority::Medium))
    };
    let priority = style.paint(
        lang.priority(task.priority),
        palette.priority(task.priority),
    );

    let mut out = format!(
        "{}\n  id: {}\n  {}: {priority}\n  {status}",
        style.bold(&task.title, palette.heading),
        task.id,
        lang.t(Msg::Priority)
    );
    if !task.description.is_empty() {
        out.push_str(&format!(
            "\n  {} ({}/{DESCRIPTION_LIMIT} {}):\n  {}",
            lang.t(Msg::Description),
            task.description.chars().count(),
            lang.t(Msg::Characters),
            task.description
        ));
    }
    out
}

fn preview(description: &str) -> Option<String> {
    let first_line = description.lines().find(|l| !l.trim().is_empty())?.trim();
    if first_line.chars().count() <= PREVIEW_CHARS && !description.trim().contains('\n') {
        return Some(first_line.to_string());
    }
    let cut: String = first_line.chars().take(PREVIEW_CHARS).collect();
    Some(format!("{}...", cut.trim_end()))
}
