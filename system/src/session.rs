use crate::document_store::DocumentStore;
use crate::message::{DocumentSnapshot, SessionSnapshot};
use crate::palette::ColorPicker;
use crate::participant_tracker::ParticipantTracker;
use crate::types::SessionId;

/// Live state of one collaborative surface.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    pub participants: ParticipantTracker,
    pub document: DocumentStore,
}

impl Session {
    pub fn new(id: SessionId, colors: ColorPicker) -> Self {
        Self {
            id,
            participants: ParticipantTracker::new(colors),
            document: DocumentStore::new(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn snapshot(&self) -> (SessionSnapshot, DocumentSnapshot) {
        (self.participants.snapshot(), self.document.snapshot())
    }
}
