mod sort;
mod task;

pub use sort::*;
pub use task::*;
