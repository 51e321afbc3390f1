//! Peer channel adapter: room identity, the transport trait, and its
//! in-process and TCP implementations.

mod memory;
mod room;
mod tcp;
mod transport;

pub use memory::{MemoryNetwork, MemoryTransport};
pub use room::RoomCode;
pub use tcp::TcpTransport;
pub use transport::{ConnectionState, LinkEvent, PeerTransport};
