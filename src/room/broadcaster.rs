use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::room::{ConnectionId, Room};
use crate::websocket::message::{ClientEvent, ServerEvent};

/// Outbound queue of one connection.
pub type Outbound = UnboundedSender<Arc<ServerEvent>>;

/// Who receives a relayed delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Everyone in the room except the originator.
    Others,
    /// Everyone in the room, originator included.
    All,
}

/// How clients are brought back in line after a mutation.
///
/// Additive events are streamed as deltas. Anything that removes or reorders
/// shared state pushes the full room to everyone, so a lost or reordered delta
/// can never leave a client diverged for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    Delta(Audience),
    Snapshot,
}

impl Reconciliation {
    pub fn for_event(event: &ClientEvent) -> Self {
        match event {
            // The joiner gets a snapshot of its own; peers only hear about it.
            ClientEvent::Join(_) => Reconciliation::Delta(Audience::Others),
            ClientEvent::DrawingAction(_) => Reconciliation::Delta(Audience::Others),
            ClientEvent::CursorMove(_) => Reconciliation::Delta(Audience::Others),
            ClientEvent::ChatMessage(_) => Reconciliation::Delta(Audience::All),
            ClientEvent::AddPage {}
            | ClientEvent::DeletePage(_)
            | ClientEvent::Undo(_)
            | ClientEvent::ClearPage(_) => Reconciliation::Snapshot,
        }
    }
}

/// Fan-out to connection queues. Sends never block; a closed queue just means
/// the connection is on its way out.
#[derive(Default)]
pub struct Broadcaster {
    connections: HashMap<ConnectionId, Outbound>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: ConnectionId, outbound: Outbound) {
        self.connections.insert(id, outbound);
    }

    pub fn unregister(&mut self, id: &ConnectionId) -> Option<Outbound> {
        self.connections.remove(id)
    }

    pub fn is_connected(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Send to a single connection.
    pub fn send(&self, id: &ConnectionId, event: ServerEvent) -> bool {
        self.deliver(id, &Arc::new(event))
    }

    /// Send to every participant of `room`. Returns the number of queues reached.
    pub fn to_all(&self, room: &Room, event: ServerEvent) -> usize {
        self.fan_out(room, None, event)
    }

    /// Send to every participant of `room` except `origin`.
    pub fn to_others(&self, room: &Room, origin: &ConnectionId, event: ServerEvent) -> usize {
        self.fan_out(room, Some(origin), event)
    }

    /// Push the full room state to every participant.
    pub fn resync(&self, room: &Room) -> usize {
        self.to_all(room, ServerEvent::RoomState(room.snapshot()))
    }

    /// Apply `policy` for a mutation made by `origin`. `delta` is only built when relayed.
    pub fn publish<F>(
        &self,
        room: &Room,
        origin: &ConnectionId,
        policy: Reconciliation,
        delta: F,
    ) -> usize
    where
        F: FnOnce() -> ServerEvent,
    {
        match policy {
            Reconciliation::Snapshot => self.resync(room),
            Reconciliation::Delta(Audience::All) => self.to_all(room, delta()),
            Reconciliation::Delta(Audience::Others) => self.to_others(room, origin, delta()),
        }
    }

    fn fan_out(&self, room: &Room, skip: Option<&ConnectionId>, event: ServerEvent) -> usize {
        let name = event.name();
        let event = Arc::new(event);
        let mut delivered = 0;

        for id in room.connection_ids() {
            if Some(id) == skip {
                continue;
            }
            if self.deliver(id, &event) {
                delivered += 1;
            }
        }

        tracing::trace!("{} fanned out to {} connection(s) in room {}", name, delivered, room.id());
        delivered
    }

    fn deliver(&self, id: &ConnectionId, event: &Arc<ServerEvent>) -> bool {
        match self.connections.get(id) {
            Some(outbound) => {
                if outbound.send(Arc::clone(event)).is_err() {
                    tracing::debug!("Dropping {} for closed connection {}", event.name(), id);
                    return false;
                }
                true
            }
            None => false,
        }
    }
}
