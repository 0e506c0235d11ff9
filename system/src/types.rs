use serde::{Deserialize, Serialize};

pub type ConnectionId = u16;
pub type CommandId = u16;
pub type SessionId = String;
pub type ParticipantId = String;
pub type ObjectId = String;

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

pub fn now() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}

pub fn new_object_id() -> ObjectId {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
