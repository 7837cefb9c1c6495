//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Detail load result processing
//! - `helpers` - Background task spawning
//! - `render` - View rendering dispatch
//! - `categories` - Category chip bar for the Latest tab
//! - `news_list` - Popular and Latest list widget
//! - `reader` - Detail reader widget
//! - `status` - Status bar widget

mod categories;
mod events;
mod helpers;
mod input;
mod loop_runner;
mod news_list;
pub mod reader;
mod render;
mod status;

// Re-export the public API
pub use loop_runner::{run, Action};
pub use news_list::meta_line;

/// Braille frames for the loading spinner.
const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

fn spinner(frame: usize) -> char {
    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
}
