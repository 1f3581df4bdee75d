pub mod broadcaster;
pub mod participant;
pub mod registry;
#[allow(clippy::module_inception)]
pub mod room;
pub mod room_id;

pub use broadcaster::{Audience, Broadcaster, Outbound, Reconciliation};
pub use participant::Participant;
pub use registry::RoomRegistry;
pub use room::{ChatEntry, Room, RoomSnapshot};
pub use room_id::{RoomId, PRIVATE_ROOM};

/// Identifies one live socket.
pub type ConnectionId = uuid::Uuid;
