use anyhow::Result;
use std::io::IsTerminal;
use taskdeck::{SyncController, TaskApi, TaskId};

use crate::config::TaskdeckConfig;
use crate::i18n::Language;
use crate::ui::{Style, Theme};

pub struct App<A> {
    pub sync: SyncController<A>,
    pub config: TaskdeckConfig,
    pub running: bool,
    color: bool,
    persist_config: bool,
}

impl<A: TaskApi> App<A> {
    pub fn new(sync: SyncController<A>, config: TaskdeckConfig) -> Self {
        Self {
            sync,
            config,
            running: true,
            color: std::io::stdout().is_terminal(),
            persist_config: true,
        }
    }

    /// No colours and no config writes.
    #[cfg(test)]
    pub fn detached(sync: SyncController<A>, config: TaskdeckConfig) -> Self {
        Self {
            color: false,
            persist_config: false,
            ..Self::new(sync, config)
        }
    }

    pub fn lang(&self) -> Language {
        self.config.language
    }

    pub fn style(&self) -> Style {
        Style {
            language: self.config.language,
            theme: self.config.theme,
            color: self.color,
        }
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        self.config.theme = self.config.theme.toggle();
        self.save_config()?;
        Ok(self.config.theme)
    }

    pub fn toggle_language(&mut self) -> Result<Language> {
        self.config.language = self.config.language.toggle();
        self.save_config()?;
        Ok(self.config.language)
    }

    /// Resolve what the user typed: a 1-based position in the sorted list,
    /// or a task id.
    pub fn resolve(&self, reference: &str) -> Option<TaskId> {
        let reference = reference.trim();
        let sorted = self.sync.sorted_tasks();

        if let Ok(n) = reference.parse::<usize>() {
            if let Some(task) = n.checked_sub(1).and_then(|i| sorted.get(i)) {
                return Some(task.id.clone());
            }
        }

        let id = TaskId::new(reference);
        self.sync.task(&id).map(|t| t.id.clone())
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    fn save_config(&self) -> Result<()> {
        if self.persist_config {
            self.config.save()?;
        }
        Ok(())
    }
}
