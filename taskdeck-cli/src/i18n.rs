use serde::{Deserialize, Serialize};
use taskdeck::Priority;

/// UI language. Every user-facing string goes through [`Language::t`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    AppTitle,
    Tasks,
    NoTasks,
    Title,
    Description,
    Priority,
    Characters,
    Completed,
    Pending,
    ReopenConfirmation,
    ConfirmHint,
    Cancelled,
    LoginPrompt,
    LoginRequired,
    InvalidSession,
    LoginSuccess,
    LoggedOut,
    TaskAdded,
    TaskUpdated,
    TaskDeleted,
    TaskCompleted,
    TaskReopened,
    TaskNotFound,
    TaskRequired,
    TitleRequired,
    InvalidPriority,
    SyncFailed,
    DarkModeOn,
    DarkModeOff,
    LanguageChanged,
    UnknownCommand,
    ShellHelp,
    DevMode,
    ConfigWritten,
    Goodbye,
}

#[cfg(test)]
impl Msg {
    pub const ALL: [Msg; 35] = [
        Msg::AppTitle,
        Msg::Tasks,
        Msg::NoTasks,
        Msg::Title,
        Msg::Description,
        Msg::Priority,
        Msg::Characters,
        Msg::Completed,
        Msg::Pending,
        Msg::ReopenConfirmation,
        Msg::ConfirmHint,
        Msg::Cancelled,
        Msg::LoginPrompt,
        Msg::LoginRequired,
        Msg::InvalidSession,
        Msg::LoginSuccess,
        Msg::LoggedOut,
        Msg::TaskAdded,
        Msg::TaskUpdated,
        Msg::TaskDeleted,
        Msg::TaskCompleted,
        Msg::TaskReopened,
        Msg::TaskNotFound,
        Msg::TaskRequired,
        Msg::TitleRequired,
        Msg::InvalidPriority,
        Msg::SyncFailed,
        Msg::DarkModeOn,
        Msg::DarkModeOff,
        Msg::LanguageChanged,
        Msg::UnknownCommand,
        Msg::ShellHelp,
        Msg::DevMode,
        Msg::ConfigWritten,
        Msg::Goodbye,
    ];
}

impl Language {
    pub fn toggle(self) -> Self {
        match self {
            Language::En => Language::Es,
            Language::Es => Language::En,
        }
    }

    pub fn priority(self, priority: Priority) -> &'static str {
        match (self, priority) {
            (Language::En, Priority::Low) => "Low",
            (Language::En, Priority::Medium) => "Medium",
            (Language::En, Priority::High) => "High",
            (Language::Es, Priority::Low) => "Baja",
            (Language::Es, Priority::Medium) => "Media",
            (Language::Es, Priority::High) => "Alta",
        }
    }

    /// Parse a priority typed by the user: English labels, codes 1-3, or
    /// the localized labels of either language.
    pub fn parse_priority(self, input: &str) -> Option<Priority> {
        if let Ok(priority) = input.parse::<Priority>() {
            return Some(priority);
        }
        let input = input.trim();
        Priority::ALL.into_iter().find(|&p| {
            [Language::En, Language::Es]
                .iter()
                .any(|lang| lang.priority(p).eq_ignore_ascii_case(input))
        })
    }

    /// Accepts y/yes and s/si/sí regardless of the current language.
    pub fn is_yes(self, answer: &str) -> bool {
        matches!(
            answer.trim().to_lowercase().as_str(),
            "y" | "yes" | "s" | "si" | "sí"
        )
    }

    pub fn t(self, msg: Msg) -> &'static str {
        match self {
            Language::En => english(msg),
            Language::Es => spanish(msg),
        }
    }
}

fn english(msg: Msg) -> &'static str {
    match msg {
        Msg::AppTitle => "Task Manager",
        Msg::Tasks => "Tasks",
        Msg::NoTasks => "No tasks yet. Add one!",
        Msg::Title => "Title",
        Msg::Description => "Description",
        Msg::Priority => "Priority",
        Msg::Characters => "characters",
        Msg::Completed => "Completed",
        Msg::Pending => "Pending",
        Msg::ReopenConfirmation => "Are you sure you want to reopen this task?",
        Msg::ConfirmHint => "[y/N]",
        Msg::Cancelled => "Cancelled.",
        Msg::LoginPrompt => "Auth token",
        Msg::LoginRequired => "You are not logged in. Run `taskdeck login` first.",
        Msg::InvalidSession => "The stored auth token is not valid",
        Msg::LoginSuccess => "Login successful. Session saved.",
        Msg::LoggedOut => "Logged out.",
        Msg::TaskAdded => "Task added.",
        Msg::TaskUpdated => "Task updated.",
        Msg::TaskDeleted => "Task deleted.",
        Msg::TaskCompleted => "Task marked as complete.",
        Msg::TaskReopened => "Task reopened.",
        Msg::TaskNotFound => "No such task",
        Msg::TaskRequired => "Which task? Give its number or id.",
        Msg::TitleRequired => "A title is required.",
        Msg::InvalidPriority => "Priority must be low, medium or high.",
        Msg::SyncFailed => "Could not sync with the server",
        Msg::DarkModeOn => "Dark mode on.",
        Msg::DarkModeOff => "Dark mode off.",
        Msg::LanguageChanged => "Language set to English.",
        Msg::UnknownCommand => "Unknown command. Type `help` for the list of commands.",
        Msg::ShellHelp => {
            "Commands:\n  \
             list                 show tasks\n  \
             refresh              reload tasks from the server\n  \
             add [title]          add a task\n  \
             show <task>          show task details\n  \
             toggle <task> [-y]   mark complete / reopen\n  \
             edit <task>          edit title, description, priority\n  \
             delete <task>        delete a task\n  \
             theme                toggle dark mode\n  \
             lang                 switch language\n  \
             quit                 leave"
        }
        Msg::DevMode => "Dev mode: using local in-memory data.",
        Msg::ConfigWritten => "Wrote default config",
        Msg::Goodbye => "Goodbye!",
    }
}

fn spanish(msg: Msg) -> &'static str {
    match msg {
        Msg::AppTitle => "Gestor de Tareas",
        Msg::Tasks => "Tareas",
        Msg::NoTasks => "Aún no hay tareas. ¡Añade una!",
        Msg::Title => "Título",
        Msg::Description => "Descripción",
        Msg::Priority => "Prioridad",
        Msg::Characters => "caracteres",
        Msg::Completed => "Completada",
        Msg::Pending => "Pendiente",
        Msg::ReopenConfirmation => "¿Seguro que quieres reabrir esta tarea?",
        Msg::ConfirmHint => "[s/N]",
        Msg::Cancelled => "Cancelado.",
        Msg::LoginPrompt => "Token de acceso",
        Msg::LoginRequired => "No has iniciado sesión. Ejecuta `taskdeck login` primero.",
        Msg::InvalidSession => "El token guardado no es válido",
        Msg::LoginSuccess => "Sesión iniciada y guardada.",
        Msg::LoggedOut => "Sesión cerrada.",
        Msg::TaskAdded => "Tarea añadida.",
        Msg::TaskUpdated => "Tarea actualizada.",
        Msg::TaskDeleted => "Tarea eliminada.",
        Msg::TaskCompleted => "Tarea marcada como completada.",
        Msg::TaskReopened => "Tarea reabierta.",
        Msg::TaskNotFound => "No existe la tarea",
        Msg::TaskRequired => "¿Qué tarea? Indica su número o id.",
        Msg::TitleRequired => "El título es obligatorio.",
        Msg::InvalidPriority => "La prioridad debe ser baja, media o alta.",
        Msg::SyncFailed => "No se pudo sincronizar con el servidor",
        Msg::DarkModeOn => "Modo oscuro activado.",
        Msg::DarkModeOff => "Modo oscuro desactivado.",
        Msg::LanguageChanged => "Idioma cambiado a español.",
        Msg::UnknownCommand => "Comando desconocido. Escribe `help` para ver los comandos.",
        Msg::ShellHelp => {
            "Comandos:\n  \
             list                 ver tareas\n  \
             refresh              recargar tareas del servidor\n  \
             add [título]         añadir una tarea\n  \
             show <tarea>         ver detalles\n  \
             toggle <tarea> [-y]  completar / reabrir\n  \
             edit <tarea>         editar título, descripción, prioridad\n  \
             delete <tarea>       eliminar una tarea\n  \
             theme                cambiar modo oscuro\n  \
             lang                 cambiar idioma\n  \
             quit                 salir"
        }
        Msg::DevMode => "Modo desarrollo: usando datos locales en memoria.",
        Msg::ConfigWritten => "Configuración por defecto escrita",
        Msg::Goodbye => "¡Hasta luego!",
    }
}
