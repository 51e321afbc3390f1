//! Terminal UI: reflects the session context and turns key presses into
//! user commands.

mod app;
mod game_view;

pub use app::{App, InputMode};
