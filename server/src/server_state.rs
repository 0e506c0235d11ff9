use std::collections::HashMap;
use std::num::Wrapping;
use whiteboard_system::{
    ConnectionId, DocumentSnapshot, Participant, ParticipantId, SessionError, SessionId,
    SessionRegistry, SessionSnapshot,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub session_id: SessionId,
    pub participant_id: ParticipantId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Unbound,
    Bound(Binding),
}

pub struct Joined {
    pub participant: Participant,
    pub session_snapshot: SessionSnapshot,
    pub document_snapshot: DocumentSnapshot,
}

pub struct Departed {
    pub binding: Binding,
    pub participant: Option<Participant>,
    pub reaped: bool,
}

/// Connection state machine plus the session registry. Binding changes and
/// tracker changes happen together inside one method, so a bound connection
/// is always a member of its session's tracker.
pub struct ServerState {
    connection_id_source: Wrapping<ConnectionId>,
    pub connection_states: HashMap<ConnectionId, ConnectionState>,
    pub registry: SessionRegistry,
}

impl ServerState {
    pub fn new(registry: SessionRegistry) -> Self {
        Self {
            connection_id_source: Wrapping(0),
            connection_states: HashMap::new(),
            registry,
        }
    }

    pub fn create_connection(&mut self) -> ConnectionId {
        let connection_id = self.new_connection_id();
        self.connection_states
            .insert(connection_id, ConnectionState::Unbound);

        connection_id
    }

    pub fn is_connected(&self, connection_id: &ConnectionId) -> bool {
        self.connection_states.contains_key(connection_id)
    }

    pub fn join_session(
        &mut self,
        connection_id: &ConnectionId,
        session_id: &SessionId,
        participant_id: &ParticipantId,
        display_name: &str,
    ) -> Result<Joined, SessionError> {
        if let Some(ConnectionState::Bound(binding)) = self.connection_states.get(connection_id) {
            return Err(SessionError::AlreadyInSession(binding.session_id.clone()));
        }
        if self
            .registry
            .get(session_id)
            .map_or(false, |s| s.participants.contains(participant_id))
        {
            return Err(SessionError::ParticipantIdInUse(participant_id.clone()));
        }

        let session = self.registry.get_or_create(session_id);
        let participant = session
            .participants
            .join(*connection_id, participant_id, display_name);
        let (session_snapshot, document_snapshot) = session.snapshot();
        self.connection_states.insert(
            *connection_id,
            ConnectionState::Bound(Binding {
                session_id: session_id.clone(),
                participant_id: participant_id.clone(),
            }),
        );
        log::info!(
            "Connection {} joined session {} as {} ({} participants)",
            connection_id,
            session_id,
            participant_id,
            session_snapshot.participants.len()
        );

        Ok(Joined {
            participant,
            session_snapshot,
            document_snapshot,
        })
    }

    /// Unbinds the connection, drops its participant and reaps the session
    /// if it became empty. `None` when the connection wasn't bound.
    pub fn leave_session(&mut self, connection_id: &ConnectionId) -> Option<Departed> {
        let binding = match self.connection_states.get_mut(connection_id) {
            Some(state) => match std::mem::replace(state, ConnectionState::Unbound) {
                ConnectionState::Bound(binding) => binding,
                ConnectionState::Unbound => return None,
            },
            None => return None,
        };

        let participant = self
            .registry
            .get_mut(&binding.session_id)
            .and_then(|s| s.participants.leave(&binding.participant_id))
            .map(|departure| departure.participant);
        if participant.is_none() {
            log::warn!(
                "Participant {} was missing from session {}",
                binding.participant_id,
                binding.session_id
            );
        }
        let reaped = self.registry.reap_if_empty(&binding.session_id);
        log::info!(
            "Connection {} left session {}",
            connection_id,
            binding.session_id
        );

        Some(Departed {
            binding,
            participant,
            reaped,
        })
    }

    pub fn disconnect(&mut self, connection_id: &ConnectionId) -> Option<Departed> {
        let departed = self.leave_session(connection_id);
        self.connection_states.remove(connection_id);
        departed
    }

    /// The connection's binding, provided `requested` (when given) names the
    /// bound session.
    pub fn binding(
        &self,
        connection_id: &ConnectionId,
        requested: Option<&SessionId>,
    ) -> Result<Binding, SessionError> {
        match self.connection_states.get(connection_id) {
            Some(ConnectionState::Bound(binding)) => match requested {
                Some(requested) if requested != &binding.session_id => {
                    Err(SessionError::SessionMismatch {
                        bound: binding.session_id.clone(),
                        requested: requested.clone(),
                    })
                }
                _ => Ok(binding.clone()),
            },
            _ => Err(SessionError::NotInSession),
        }
    }

    /// Delivery targets for a session broadcast, straight from its tracker.
    pub fn connection_ids_in_session(
        &self,
        session_id: &SessionId,
        without: Option<&ConnectionId>,
    ) -> Vec<ConnectionId> {
        self.registry
            .get(session_id)
            .map(|s| s.participants.connection_ids())
            .unwrap_or_default()
            .into_iter()
            .filter(|c| without.map_or(true, |w| w != c))
            .collect()
    }

    fn new_connection_id(&mut self) -> ConnectionId {
        loop {
            self.connection_id_source += Wrapping(1);
            let candidate = self.connection_id_source.0;
            if !self.connection_states.contains_key(&candidate) {
                break candidate;
            }
        }
    }
}
