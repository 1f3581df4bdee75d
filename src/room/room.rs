use serde::Serialize;
use std::collections::HashMap;

use crate::drawing::{DrawingAction, Page, Point};
use crate::room::{ConnectionId, Participant, RoomId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEntry {
    pub display_name: String,
    pub text: String,
    /// Unix time in milliseconds
    pub timestamp: i64,
}

impl ChatEntry {
    pub fn now(display_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            text: text.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Complete state pushed to clients to force convergence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomSnapshot {
    pub pages: Vec<Page>,
    pub chat: Vec<ChatEntry>,
    pub participants: HashMap<ConnectionId, Participant>,
}

pub struct Room {
    id: RoomId,
    participants: HashMap<ConnectionId, Participant>,
    pages: Vec<Page>,
    chat: Vec<ChatEntry>,
}

impl Room {
    /// A fresh room with a single blank page.
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            participants: HashMap::new(),
            pages: vec![Page::new()],
            chat: Vec::new(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn add_participant(&mut self, id: ConnectionId, participant: Participant) {
        self.participants.insert(id, participant);
    }

    pub fn remove_participant(&mut self, id: &ConnectionId) -> Option<Participant> {
        self.participants.remove(id)
    }

    pub fn participant(&self, id: &ConnectionId) -> Option<&Participant> {
        self.participants.get(id)
    }

    pub fn participants(&self) -> &HashMap<ConnectionId, Participant> {
        &self.participants
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn connection_ids(&self) -> impl Iterator<Item = &ConnectionId> {
        self.participants.keys()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, page_id: usize) -> Option<&Page> {
        self.pages.get(page_id)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn chat(&self) -> &[ChatEntry] {
        &self.chat
    }

    /// Apply a drawing action to a page. Returns false if the page does not exist.
    pub fn apply_action(&mut self, page_id: usize, action: DrawingAction) -> bool {
        match self.pages.get_mut(page_id) {
            Some(page) => {
                page.apply(action);
                true
            }
            None => false,
        }
    }

    pub fn add_page(&mut self) {
        self.pages.push(Page::new());
    }

    /// Delete a page unless it is missing or the last one left.
    pub fn delete_page(&mut self, page_id: usize) -> bool {
        if page_id >= self.pages.len() || self.pages.len() <= 1 {
            return false;
        }
        self.pages.remove(page_id);
        true
    }

    /// Remove the last action of a page. Returns false if there was nothing to undo.
    pub fn undo(&mut self, page_id: usize) -> bool {
        self.pages
            .get_mut(page_id)
            .and_then(|page| page.undo())
            .is_some()
    }

    pub fn clear_page(&mut self, page_id: usize) -> bool {
        match self.pages.get_mut(page_id) {
            Some(page) => {
                page.clear();
                true
            }
            None => false,
        }
    }

    pub fn push_chat(&mut self, entry: ChatEntry) {
        self.chat.push(entry);
    }

    pub fn move_cursor(&mut self, id: &ConnectionId, position: Point) -> bool {
        match self.participants.get_mut(id) {
            Some(participant) => {
                participant.move_cursor(position);
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            pages: self.pages.clone(),
            chat: self.chat.clone(),
            participants: self.participants.clone(),
        }
    }
}
