use serde::Serialize;
use tokio::sync::oneshot::Sender;
use whiteboard_system::{Session, SessionId};

#[derive(Debug)]
pub enum AdminCommand {
    ListSessions { tx: Sender<Vec<SessionSummary>> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub participants: Vec<String>,
    pub object_count: usize,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id().clone(),
            participants: session
                .participants
                .list()
                .into_iter()
                .map(|p| p.display_name)
                .collect(),
            object_count: session.document.len(),
        }
    }
}
