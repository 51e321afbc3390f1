//! In-process transport for tests and deterministic two-peer scenarios.
//!
//! Every [`MemoryTransport`] created from one [`MemoryNetwork`] shares a hub
//! keyed by room code. Delivery is immediate and FIFO. A connect to a room
//! nobody is listening on stays pending forever, which is how a join timeout
//! looks from the caller's side.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use tracing::trace;

use crate::error::LinkError;

use super::{LinkEvent, PeerTransport, RoomCode};

type EndpointId = usize;

#[derive(Default)]
struct Endpoint {
    inbox: VecDeque<LinkEvent>,
    peer: Option<EndpointId>,
}

#[derive(Default)]
struct Hub {
    listeners: HashMap<RoomCode, EndpointId>,
    endpoints: Vec<Endpoint>,
}

impl Hub {
    fn unlisten(&mut self, id: EndpointId) {
        self.listeners.retain(|_, owner| *owner != id);
    }
}

/// Shared rendezvous for in-process transports.
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    hub: Rc<RefCell<Hub>>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new endpoint attached to this network.
    pub fn endpoint(&self) -> MemoryTransport {
        let mut hub = self.hub.borrow_mut();
        hub.endpoints.push(Endpoint::default());
        MemoryTransport {
            hub: Rc::clone(&self.hub),
            id: hub.endpoints.len() - 1,
        }
    }
}

/// One side of an in-process link.
pub struct MemoryTransport {
    hub: Rc<RefCell<Hub>>,
    id: EndpointId,
}

impl MemoryTransport {
    /// Queue an event for this endpoint as if the transport had raised it.
    pub fn inject_event(&self, event: LinkEvent) {
        self.hub.borrow_mut().endpoints[self.id].inbox.push_back(event);
    }

    pub fn is_linked(&self) -> bool {
        self.hub.borrow().endpoints[self.id].peer.is_some()
    }
}

impl PeerTransport for MemoryTransport {
    fn listen(&mut self, local_id: RoomCode) -> Result<(), LinkError> {
        let mut hub = self.hub.borrow_mut();
        if hub.endpoints[self.id].peer.is_some() {
            return Err(LinkError::Busy("open"));
        }
        let owner = hub.listeners.get(&local_id).copied();
        match owner {
            Some(owner) if owner != self.id => Err(LinkError::RoomTaken(local_id.to_string())),
            _ => {
                hub.listeners.insert(local_id, self.id);
                trace!(endpoint = self.id, room = %local_id, "listening");
                Ok(())
            }
        }
    }

    fn connect(&mut self, local_id: RoomCode, remote_id: RoomCode) -> Result<(), LinkError> {
        let mut hub = self.hub.borrow_mut();
        if hub.endpoints[self.id].peer.is_some() {
            return Err(LinkError::Busy("open"));
        }

        let Some(host) = hub.listeners.remove(&remote_id) else {
            trace!(endpoint = self.id, room = %remote_id, "no listener, connect stays pending");
            return Ok(());
        };

        hub.endpoints[self.id].peer = Some(host);
        hub.endpoints[host].peer = Some(self.id);
        hub.endpoints[self.id].inbox.push_back(LinkEvent::Opened {
            remote_id: remote_id.to_string(),
        });
        hub.endpoints[host].inbox.push_back(LinkEvent::Opened {
            remote_id: local_id.to_string(),
        });
        trace!(guest = self.id, host, room = %remote_id, "linked");
        Ok(())
    }

    fn send(&mut self, payload: &str) -> Result<(), LinkError> {
        let mut hub = self.hub.borrow_mut();
        let peer = hub.endpoints[self.id].peer.ok_or(LinkError::NotConnected)?;
        hub.endpoints[peer]
            .inbox
            .push_back(LinkEvent::Data(payload.to_string()));
        Ok(())
    }

    fn poll_event(&mut self) -> Option<LinkEvent> {
        self.hub.borrow_mut().endpoints[self.id].inbox.pop_front()
    }

    fn close(&mut self) {
        let mut hub = self.hub.borrow_mut();
        hub.unlisten(self.id);
        hub.endpoints[self.id].inbox.clear();
        if let Some(peer) = hub.endpoints[self.id].peer.take() {
            hub.endpoints[peer].peer = None;
            hub.endpoints[peer].inbox.push_back(LinkEvent::Closed);
        }
    }
}

impl Drop for MemoryTransport {
    fn drop(&mut self) {
        self.close();
    }
}
