mod action;
mod actions;
mod event_loop;

pub use action::{parse_action, Action, ParseError};
pub use actions::run_action;
pub use event_loop::run_shell;
