use crate::error::SessionError;
use crate::property_bag::PropertyBag;
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifiableCommand {
    pub command_id: CommandId,
    pub command: SessionCommand,
}

/// Commands a client sends over its connection. `session_id`, where optional,
/// is checked against the connection's binding when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SessionCommand {
    Join {
        session_id: SessionId,
        participant_id: ParticipantId,
        display_name: String,
    },
    Leave {
        session_id: Option<SessionId>,
        participant_id: Option<ParticipantId>,
    },
    AddObject {
        session_id: Option<SessionId>,
        object: NewObject,
    },
    ModifyObject {
        session_id: Option<SessionId>,
        object_id: ObjectId,
        properties: PropertyBag,
    },
    DeleteObject {
        session_id: Option<SessionId>,
        object_id: ObjectId,
    },
    ClearCanvas {
        session_id: Option<SessionId>,
    },
    MoveCursor {
        session_id: Option<SessionId>,
        position: Position,
    },
}

impl SessionCommand {
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            Self::Join { session_id, .. } => Some(session_id),
            Self::Leave { session_id, .. }
            | Self::AddObject { session_id, .. }
            | Self::ModifyObject { session_id, .. }
            | Self::DeleteObject { session_id, .. }
            | Self::ClearCanvas { session_id }
            | Self::MoveCursor { session_id, .. } => session_id.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CommandResult {
    Joined {
        session_id: SessionId,
        session_snapshot: SessionSnapshot,
        document_snapshot: DocumentSnapshot,
    },
    Left { session_id: SessionId },
    /// `message` is the error's display text, for clients that only log it.
    Error { error: SessionError, message: String },
}

impl From<SessionError> for CommandResult {
    fn from(error: SessionError) -> Self {
        let message = error.to_string();
        CommandResult::Error { error, message }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum IdentifiableEvent {
    /// Reply to one of the receiver's own commands.
    ByMyself {
        command_id: CommandId,
        result: CommandResult,
    },
    /// Something another participant did in the receiver's session.
    BySystem { session_event: SessionEvent },
    /// An inbound frame could not be decoded at all.
    Rejected { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SessionEvent {
    ParticipantJoined(Participant),
    ParticipantLeft {
        participant_id: ParticipantId,
        display_name: String,
    },
    ObjectAdded(DrawingObject),
    ObjectModified {
        object_id: ObjectId,
        properties: PropertyBag,
        updated_by: ParticipantId,
        updated_at: Timestamp,
    },
    ObjectDeleted {
        object_id: ObjectId,
    },
    CanvasCleared {
        cleared_by: ParticipantId,
    },
    CursorMoved(LiveCursorEvent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
    pub color: String,
    pub cursor: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveCursorEvent {
    pub participant_id: ParticipantId,
    pub display_name: String,
    pub color: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingObject {
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub object_type: String,
    pub created_by: ParticipantId,
    pub created_at: Timestamp,
    pub updated_by: Option<ParticipantId>,
    pub updated_at: Option<Timestamp>,
    pub properties: PropertyBag,
}

/// An object as proposed by a client. Authorship and creation time are
/// stamped by the server; a missing id is generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewObject {
    pub id: Option<ObjectId>,
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default)]
    pub properties: PropertyBag,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub objects: Vec<DrawingObject>,
}
