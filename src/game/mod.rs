//! Core Connect Four game logic: the copy-on-write board, disc colors, and the
//! session state machine that enforces turn ownership.

mod board;
mod player;
mod session;

pub use board::{Board, Cell, DropError, Landing, COLS, ROWS};
pub use player::Player;
pub use session::{MoveError, Phase, Session};
