//! Session gateway: binds connections to rooms and applies their events.
//!
//! Every inbound event is applied to the authoritative room state and then
//! handed to the [`Broadcaster`] together with the [`Reconciliation`] policy
//! for its kind. The gateway is driven from behind a single lock, so each
//! event runs to completion before the next one touches any room.
//!
//! Only join validation is reported back to the client. Everything else that
//! targets a missing room or page is dropped silently; the sender has either
//! not joined yet or is about to be resynced.

use std::collections::HashMap;

use crate::drawing::Point;
use crate::error::WhiteboardError;
use crate::room::{
    Broadcaster, ChatEntry, ConnectionId, Outbound, Participant, Reconciliation, Room, RoomId,
    RoomRegistry,
};
use crate::websocket::message::{
    ClientEvent, CursorUpdate, DrawingPayload, JoinRequest, PageRef, ServerEvent, UserJoined,
};

pub struct SessionGateway {
    registry: RoomRegistry,
    bindings: HashMap<ConnectionId, RoomId>,
    broadcaster: Broadcaster,
}

impl SessionGateway {
    pub fn new(registry: RoomRegistry) -> Self {
        Self {
            registry,
            bindings: HashMap::new(),
            broadcaster: Broadcaster::new(),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Room the connection is currently bound to.
    pub fn room_of(&self, conn: &ConnectionId) -> Option<&RoomId> {
        self.bindings.get(conn)
    }

    /// Register the outbound queue of a new connection. It is not in any room yet.
    pub fn connect(&mut self, conn: ConnectionId, outbound: Outbound) {
        self.broadcaster.register(conn, outbound);
    }

    /// Apply one inbound event. Only a rejected join yields an error.
    pub fn handle(&mut self, conn: ConnectionId, event: ClientEvent) -> Result<(), WhiteboardError> {
        if !self.broadcaster.is_connected(&conn) {
            tracing::debug!("Ignoring {} from closed connection {}", event.name(), conn);
            return Ok(());
        }

        let policy = Reconciliation::for_event(&event);
        match event {
            ClientEvent::Join(request) => return self.join(conn, request, policy),
            ClientEvent::DrawingAction(payload) => self.apply_drawing_action(conn, payload, policy),
            ClientEvent::AddPage {} => self.add_page(conn, policy),
            ClientEvent::DeletePage(PageRef { page_id }) => {
                self.mutate_page(conn, policy, |room| room.delete_page(page_id))
            }
            ClientEvent::Undo(PageRef { page_id }) => {
                self.mutate_page(conn, policy, |room| room.undo(page_id))
            }
            ClientEvent::ClearPage(PageRef { page_id }) => {
                self.mutate_page(conn, policy, |room| room.clear_page(page_id))
            }
            ClientEvent::ChatMessage(text) => self.chat_message(conn, &text, policy),
            ClientEvent::CursorMove(position) => self.cursor_move(conn, position, policy),
        }
        Ok(())
    }

    /// Drop the connection, leaving its room and closing the room if it was the last one.
    pub fn disconnect(&mut self, conn: ConnectionId) {
        self.broadcaster.unregister(&conn);
        self.leave(&conn);
    }

    fn join(
        &mut self,
        conn: ConnectionId,
        request: JoinRequest,
        policy: Reconciliation,
    ) -> Result<(), WhiteboardError> {
        let (room_id, display_name) = match validate_join(&request) {
            Ok(valid) => valid,
            Err(err) => {
                tracing::info!("Join rejected for {}: {}", conn, err);
                self.broadcaster
                    .send(&conn, ServerEvent::JoinError(err.to_string()));
                return Err(err);
            }
        };

        // Rejoining the same room only refreshes the participant entry.
        let switching_rooms = self
            .bindings
            .get(&conn)
            .is_some_and(|current| *current != room_id);
        if switching_rooms {
            self.leave(&conn);
        }

        let participant = Participant::new(display_name.clone());
        let cursor = participant.cursor;

        let room = self.registry.get_or_create(&room_id);
        room.add_participant(conn, participant);
        self.bindings.insert(conn, room_id.clone());

        self.broadcaster
            .send(&conn, ServerEvent::RoomState(room.snapshot()));
        self.broadcaster.publish(room, &conn, policy, || {
            ServerEvent::UserJoined(UserJoined {
                participant_id: conn,
                display_name: display_name.clone(),
                cursor,
            })
        });
        self.broadcaster.publish(room, &conn, policy, || {
            ServerEvent::UpdateUserList(room.participants().clone())
        });

        tracing::info!(
            "{} ({}) joined room {}. Participants: {}",
            display_name,
            conn,
            room_id,
            room.participant_count()
        );
        Ok(())
    }

    fn apply_drawing_action(
        &mut self,
        conn: ConnectionId,
        payload: DrawingPayload,
        policy: Reconciliation,
    ) {
        if let Err(e) = payload.action.validate() {
            tracing::warn!("Invalid drawing action from {}: {}", conn, e);
            return;
        }

        let Some((room, broadcaster)) = self.bound_room(&conn) else {
            return;
        };

        if room.apply_action(payload.page_id, payload.action.clone()) {
            broadcaster.publish(room, &conn, policy, || ServerEvent::DrawingAction(payload));
        } else {
            tracing::debug!("Drawing action for missing page {} from {}", payload.page_id, conn);
        }
    }

    fn add_page(&mut self, conn: ConnectionId, policy: Reconciliation) {
        self.mutate_page(conn, policy, |room| {
            room.add_page();
            true
        });
    }

    /// Run a structural page mutation and publish it if it changed anything.
    fn mutate_page<F>(&mut self, conn: ConnectionId, policy: Reconciliation, mutation: F)
    where
        F: FnOnce(&mut Room) -> bool,
    {
        let Some((room, broadcaster)) = self.bound_room(&conn) else {
            return;
        };

        if mutation(&mut *room) {
            broadcaster.publish(room, &conn, policy, || ServerEvent::RoomState(room.snapshot()));
        }
    }

    fn chat_message(&mut self, conn: ConnectionId, text: &str, policy: Reconciliation) {
        let text = sanitize_html(text.trim());
        if text.is_empty() {
            return;
        }

        let Some((room, broadcaster)) = self.bound_room(&conn) else {
            return;
        };
        let Some(display_name) = room.participant(&conn).map(|p| p.display_name.clone()) else {
            return;
        };

        let entry = ChatEntry::now(display_name, text);
        tracing::debug!("[{}] {}: {}", room.id(), entry.display_name, entry.text);
        room.push_chat(entry.clone());
        broadcaster.publish(room, &conn, policy, || ServerEvent::ChatMessage(entry));
    }

    fn cursor_move(&mut self, conn: ConnectionId, position: Point, policy: Reconciliation) {
        let Some((room, broadcaster)) = self.bound_room(&conn) else {
            return;
        };

        if room.move_cursor(&conn, position) {
            broadcaster.publish(room, &conn, policy, || {
                ServerEvent::CursorMove(CursorUpdate {
                    participant_id: conn,
                    x: position.x,
                    y: position.y,
                })
            });
        }
    }

    fn leave(&mut self, conn: &ConnectionId) {
        let Some(room_id) = self.bindings.remove(conn) else {
            return;
        };
        let Some(room) = self.registry.get_mut(&room_id) else {
            return;
        };
        let Some(participant) = room.remove_participant(conn) else {
            return;
        };

        tracing::info!(
            "{} ({}) left room {}. Remaining participants: {}",
            participant.display_name,
            conn,
            room_id,
            room.participant_count()
        );

        if room.is_empty() {
            self.registry.remove_if_empty(&room_id);
            return;
        }

        self.broadcaster.to_all(room, ServerEvent::UserLeft(*conn));
        self.broadcaster
            .to_all(room, ServerEvent::UpdateUserList(room.participants().clone()));
    }

    fn bound_room(&mut self, conn: &ConnectionId) -> Option<(&mut Room, &Broadcaster)> {
        let room_id = self.bindings.get(conn)?;
        let room = self.registry.get_mut(room_id)?;
        Some((room, &self.broadcaster))
    }
}

fn validate_join(request: &JoinRequest) -> Result<(RoomId, String), WhiteboardError> {
    let room_id = RoomId::parse(&request.room_id)?;
    let display_name = request.display_name.trim();
    if display_name.is_empty() {
        return Err(WhiteboardError::EmptyDisplayName);
    }
    Ok((room_id, display_name.to_string()))
}

/// Sanitize HTML to prevent XSS attacks in rendered chat
fn sanitize_html(input: &str) -> String {
    ammonia::clean(input)
}
