use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::drawing::{DrawingAction, Point};
use crate::error::WhiteboardError;
use crate::room::{ChatEntry, ConnectionId, Participant, RoomSnapshot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub room_id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingPayload {
    pub page_id: usize,
    pub action: DrawingAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRef {
    pub page_id: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorUpdate {
    pub participant_id: ConnectionId,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserJoined {
    pub participant_id: ConnectionId,
    pub display_name: String,
    pub cursor: Point,
}

/// Events sent from client to server.
///
/// Wire form: `{"event": "<name>", "data": <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    Join(JoinRequest),
    DrawingAction(DrawingPayload),
    AddPage {},
    DeletePage(PageRef),
    Undo(PageRef),
    ClearPage(PageRef),
    ChatMessage(String),
    CursorMove(Point),
}

impl ClientEvent {
    pub fn parse(text: &str) -> Result<Self, WhiteboardError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Join(_) => "join",
            ClientEvent::DrawingAction(_) => "drawingAction",
            ClientEvent::AddPage {} => "addPage",
            ClientEvent::DeletePage(_) => "deletePage",
            ClientEvent::Undo(_) => "undo",
            ClientEvent::ClearPage(_) => "clearPage",
            ClientEvent::ChatMessage(_) => "chatMessage",
            ClientEvent::CursorMove(_) => "cursorMove",
        }
    }
}

/// Events sent from server to client, same envelope as [`ClientEvent`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    JoinError(String),
    RoomState(RoomSnapshot),
    DrawingAction(DrawingPayload),
    ChatMessage(ChatEntry),
    CursorMove(CursorUpdate),
    UserJoined(UserJoined),
    UserLeft(ConnectionId),
    UpdateUserList(HashMap<ConnectionId, Participant>),
}

impl ServerEvent {
    pub fn to_ws_message(&self) -> Result<Message, WhiteboardError> {
        Ok(Message::Text(serde_json::to_string(self)?))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::JoinError(_) => "joinError",
            ServerEvent::RoomState(_) => "roomState",
            ServerEvent::DrawingAction(_) => "drawingAction",
            ServerEvent::ChatMessage(_) => "chatMessage",
            ServerEvent::CursorMove(_) => "cursorMove",
            ServerEvent::UserJoined(_) => "userJoined",
            ServerEvent::UserLeft(_) => "userLeft",
            ServerEvent::UpdateUserList(_) => "updateUserList",
        }
    }
}
