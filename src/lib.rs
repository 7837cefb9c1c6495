//! Terminal client for a read-only news-feeds JSON API.
//!
//! The core is UI-agnostic: [`api`] fetches, [`feed`] arranges the records
//! and runs one actor per mounted screen. [`ui`] is a ratatui front-end
//! driven by [`app::App`].

pub mod api;
pub mod app;
pub mod config;
pub mod feed;
pub mod theme;
pub mod ui;
pub mod util;
