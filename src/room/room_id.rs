use serde::Serialize;
use std::fmt;

use crate::error::WhiteboardError;

/// Reserved id for ad-hoc private rooms.
pub const PRIVATE_ROOM: &str = "NEW_PRIVATE_ROOM";

pub const ROOM_ID_LEN: usize = 4;

pub fn is_valid_room_id(value: &str) -> bool {
    value == PRIVATE_ROOM
        || (value.len() == ROOM_ID_LEN && value.chars().all(|ch| ch.is_ascii_digit()))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn parse(value: &str) -> Result<Self, WhiteboardError> {
        if !is_valid_room_id(value) {
            return Err(WhiteboardError::InvalidRoomId(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_private(&self) -> bool {
        self.0 == PRIVATE_ROOM
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for RoomId {
    type Err = WhiteboardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}
