use std::collections::HashMap;

use crate::room::{Room, RoomId};

/// Owns every live room. Rooms are created on first join and dropped once empty.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, id: &RoomId) -> &mut Room {
        self.rooms.entry(id.clone()).or_insert_with(|| {
            tracing::info!("Room {} created", id);
            Room::new(id.clone())
        })
    }

    pub fn get(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn get_mut(&mut self, id: &RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(id)
    }

    /// Drop the room if nobody is left in it. Returns true if it was removed.
    pub fn remove_if_empty(&mut self, id: &RoomId) -> bool {
        if self.rooms.get(id).is_some_and(Room::is_empty) {
            self.rooms.remove(id);
            tracing::info!("Room {} closed", id);
            return true;
        }
        false
    }

    pub fn contains(&self, id: &RoomId) -> bool {
        self.rooms.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
