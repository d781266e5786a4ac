//! Terminal front end: an intro screen, then a search screen that renders
//! the published results as a two-column grid.

mod app;
pub mod command;
pub mod navigation;
pub mod render;

pub use app::{run_once, App};
