//! Transport abstraction for the direct peer link.
//!
//! The game runs on a single-threaded event loop, so a transport never calls
//! back into game code. It queues [`LinkEvent`]s and the loop drains them with
//! [`PeerTransport::poll_event`]. Production uses [`super::TcpTransport`], tests
//! use [`super::MemoryTransport`].

use crate::error::LinkError;

use super::RoomCode;

/// Lifecycle notifications from a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A link to `remote_id` is established and ready for messages.
    Opened { remote_id: String },
    /// One complete message from the peer.
    Data(String),
    /// The link is gone. No further data will arrive on it.
    Closed,
    /// A non-fatal transport failure.
    Errored(String),
}

/// Connection sub-state of the peer link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Listening,
    Connecting,
    Open,
    Closed,
    Failed,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Listening => "waiting for opponent",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "connected",
            ConnectionState::Closed => "disconnected",
            ConnectionState::Failed => "failed",
        }
    }
}

/// A message transport with ordered, reliable delivery once a link is open.
///
/// Convergence of the two game states depends on in-order delivery, so an
/// implementation that cannot guarantee it is not a valid transport.
pub trait PeerTransport {
    /// Start accepting one inbound link addressed to `local_id`.
    fn listen(&mut self, local_id: RoomCode) -> Result<(), LinkError>;

    /// Start an outbound link to `remote_id`.
    ///
    /// Returns once the attempt is under way. Success arrives later as
    /// [`LinkEvent::Opened`]; the transport never times out on its own.
    fn connect(&mut self, local_id: RoomCode, remote_id: RoomCode) -> Result<(), LinkError>;

    /// Send one message over the open link.
    fn send(&mut self, payload: &str) -> Result<(), LinkError>;

    /// Next pending event, if any. Never blocks.
    fn poll_event(&mut self) -> Option<LinkEvent>;

    /// Drop the current link or pending attempt. Events from it are discarded.
    fn close(&mut self);
}
