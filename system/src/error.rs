use crate::types::{ObjectId, ParticipantId, SessionId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a command was refused. None of them mutate state or unbind the
/// connection; they are reported back to the sender only.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SessionError {
    #[error("connection isn't in any session")]
    NotInSession,
    #[error("connection is already in session {0}")]
    AlreadyInSession(SessionId),
    #[error("command targets session {requested} but connection is in {bound}")]
    SessionMismatch {
        bound: SessionId,
        requested: SessionId,
    },
    #[error("participant {0} is already connected to this session")]
    ParticipantIdInUse(ParticipantId),
    #[error("command names participant {requested} but connection is {bound}")]
    ParticipantMismatch {
        bound: ParticipantId,
        requested: ParticipantId,
    },
    #[error("object {0} already exists")]
    DuplicateObjectId(ObjectId),
    #[error("malformed command: {0}")]
    Malformed(String),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The command names a session or participant the connection isn't bound to.
    Membership,
    /// The command collides with existing document state.
    Conflict,
    /// Required fields are missing or empty.
    Malformed,
}

impl SessionError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotInSession
            | Self::AlreadyInSession(_)
            | Self::SessionMismatch { .. }
            | Self::ParticipantIdInUse(_)
            | Self::ParticipantMismatch { .. } => ErrorKind::Membership,
            Self::DuplicateObjectId(_) => ErrorKind::Conflict,
            Self::Malformed(_) => ErrorKind::Malformed,
        }
    }
}
