//! Small helpers shared by the feed core and the terminal UI.
//!
//! - **Text**: width-aware truncation and sanitising of API-supplied strings
//! - **Tasks**: panic capture for spawned loads

mod task;
mod text;

pub(crate) use task::catch_task_panic;
pub use text::{display_width, single_line, strip_control_chars, truncate_to_width};
