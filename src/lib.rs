//! # P2P Connect Four
//!
//! Two-player Connect Four over a direct peer link. One side hosts a room
//! identified by a four-digit code, the other joins by that code, and the
//! game is kept in sync by exchanging move messages. No server holds game
//! state.
//!
//! ## Modules
//!
//! - [`game`]: Board, disc colors, session state machine
//! - [`net`]: Room codes, transport trait, in-process and TCP transports
//! - [`protocol`]: Wire messages exchanged between peers
//! - [`context`]: Owned session context and event dispatcher
//! - [`notify`]: Transient notifications for the UI
//! - [`ui`]: Terminal UI
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod config;
pub mod context;
pub mod error;
pub mod game;
pub mod net;
pub mod notify;
pub mod protocol;
pub mod ui;
