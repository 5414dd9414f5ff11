pub mod api;
pub mod domain;
mod normalize;
mod session;
mod sync;

pub use api::{ApiError, DevBackend, TaskApi, TasksClient};
pub use domain::*;
pub use normalize::*;
pub use session::*;
pub use sync::*;
