use tokio::sync::mpsc::{channel, Sender};

use whiteboard_system::{
    new_object_id, now, CommandId, CommandResult, ConnectionId, DrawingObject, IdentifiableCommand,
    IdentifiableEvent, LiveCursorEvent, NewObject, ObjectId, ParticipantId, Position,
    PropertyBag, SessionCommand, SessionError, SessionEvent, SessionId, SessionRegistry,
};

use crate::admin::{AdminCommand, SessionSummary};
use crate::connection::{ConnectionCommand, ConnectionEvent};
use crate::connection_tx_storage::ConnectionTxStorage;
use crate::server_state::ServerState;

pub type ServerTx = Sender<ServerCommand>;

#[derive(Debug)]
pub enum ServerCommand {
    Connection(ConnectionCommand),
    Admin(AdminCommand),
}

/// The sync engine. Owns all session state and processes one command at a
/// time to completion, so nothing in here needs a lock.
pub struct Server {
    server_state: ServerState,
    connections: ConnectionTxStorage,
}

impl Server {
    pub fn new(registry: SessionRegistry) -> Self {
        Self {
            server_state: ServerState::new(registry),
            connections: ConnectionTxStorage::new(),
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.server_state.registry
    }

    /// Connections the engine currently holds state for, bound or not.
    pub fn connection_count(&self) -> usize {
        self.server_state.connection_states.len()
    }

    pub fn handle_server_command(&mut self, command: ServerCommand) {
        match command {
            ServerCommand::Connection(command) => self.handle_connection_command(command),
            ServerCommand::Admin(command) => self.handle_admin_command(command),
        }
    }

    fn handle_connection_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect { tx } => {
                let connection_id = self.server_state.create_connection();
                self.connections.insert(connection_id, tx);
                if self
                    .connections
                    .send(&connection_id, ConnectionEvent::Connected { connection_id })
                {
                    log::info!("Connection {} connected", connection_id);
                } else {
                    self.server_state.disconnect(&connection_id);
                    self.connections.remove(&connection_id);
                }
            }
            ConnectionCommand::Disconnect { from } => {
                self.disconnect(&from);
            }
            ConnectionCommand::IdentifiableCommand {
                from,
                command:
                    IdentifiableCommand {
                        command_id,
                        command,
                    },
            } => {
                if !self.server_state.is_connected(&from) {
                    log::warn!("Command from unknown connection {} ignored", from);
                    return;
                }
                match self.handle_session_command(&from, command) {
                    Ok(Some(result)) => self.reply(&from, command_id, result),
                    Ok(None) => {}
                    Err(session_error) => {
                        log::warn!(
                            "Rejected command {} from connection {}: {}",
                            command_id,
                            from,
                            session_error
                        );
                        self.reply(&from, command_id, session_error.into());
                    }
                }
            }
        }
    }

    fn handle_session_command(
        &mut self,
        from: &ConnectionId,
        command: SessionCommand,
    ) -> Result<Option<CommandResult>, SessionError> {
        match command {
            SessionCommand::Join {
                session_id,
                participant_id,
                display_name,
            } => self
                .join_session(from, session_id, participant_id, display_name)
                .map(Some),
            SessionCommand::Leave {
                session_id,
                participant_id,
            } => self
                .leave_session(from, session_id, participant_id)
                .map(|session_id| Some(CommandResult::Left { session_id })),
            SessionCommand::AddObject { session_id, object } => {
                self.add_object(from, session_id, object).map(|_| None)
            }
            SessionCommand::ModifyObject {
                session_id,
                object_id,
                properties,
            } => self
                .modify_object(from, session_id, object_id, properties)
                .map(|_| None),
            SessionCommand::DeleteObject {
                session_id,
                object_id,
            } => self
                .delete_object(from, session_id, object_id)
                .map(|_| None),
            SessionCommand::ClearCanvas { session_id } => {
                self.clear_canvas(from, session_id).map(|_| None)
            }
            SessionCommand::MoveCursor {
                session_id,
                position,
            } => {
                self.move_cursor(from, session_id, position);
                Ok(None)
            }
        }
    }

    fn join_session(
        &mut self,
        from: &ConnectionId,
        session_id: SessionId,
        participant_id: ParticipantId,
        display_name: String,
    ) -> Result<CommandResult, SessionError> {
        if session_id.is_empty() {
            return Err(SessionError::malformed("session id is required"));
        }
        if participant_id.is_empty() {
            return Err(SessionError::malformed("participant id is required"));
        }
        let joined =
            self.server_state
                .join_session(from, &session_id, &participant_id, &display_name)?;
        self.broadcast_session_event(
            &session_id,
            SessionEvent::ParticipantJoined(joined.participant),
            Some(from),
        );
        Ok(CommandResult::Joined {
            session_id,
            session_snapshot: joined.session_snapshot,
            document_snapshot: joined.document_snapshot,
        })
    }

    fn leave_session(
        &mut self,
        from: &ConnectionId,
        session_id: Option<SessionId>,
        participant_id: Option<ParticipantId>,
    ) -> Result<SessionId, SessionError> {
        let binding = self.server_state.binding(from, session_id.as_ref())?;
        if let Some(requested) = participant_id {
            if requested != binding.participant_id {
                return Err(SessionError::ParticipantMismatch {
                    bound: binding.participant_id,
                    requested,
                });
            }
        }
        self.unbind(from).ok_or(SessionError::NotInSession)
    }

    fn add_object(
        &mut self,
        from: &ConnectionId,
        session_id: Option<SessionId>,
        object: NewObject,
    ) -> Result<(), SessionError> {
        let binding = self.server_state.binding(from, session_id.as_ref())?;
        if object.object_type.is_empty() {
            return Err(SessionError::malformed("object type is required"));
        }
        let id = match object.id {
            Some(id) if id.is_empty() => {
                return Err(SessionError::malformed("object id must not be empty"))
            }
            Some(id) => id,
            None => new_object_id(),
        };
        let drawing_object = DrawingObject {
            id,
            object_type: object.object_type,
            created_by: binding.participant_id,
            created_at: now(),
            updated_by: None,
            updated_at: None,
            properties: object.properties,
        };

        self.server_state
            .registry
            .get_mut(&binding.session_id)
            .ok_or(SessionError::NotInSession)?
            .document
            .add(drawing_object.clone())?;
        self.broadcast_session_event(
            &binding.session_id,
            SessionEvent::ObjectAdded(drawing_object),
            Some(from),
        );
        Ok(())
    }

    fn modify_object(
        &mut self,
        from: &ConnectionId,
        session_id: Option<SessionId>,
        object_id: ObjectId,
        properties: PropertyBag,
    ) -> Result<(), SessionError> {
        let binding = self.server_state.binding(from, session_id.as_ref())?;
        let updated_at = now();
        let modified = self
            .server_state
            .registry
            .get_mut(&binding.session_id)
            .and_then(|s| {
                s.document.modify(
                    &object_id,
                    properties.clone(),
                    &binding.participant_id,
                    updated_at,
                )
            })
            .is_some();

        if modified {
            self.broadcast_session_event(
                &binding.session_id,
                SessionEvent::ObjectModified {
                    object_id,
                    properties,
                    updated_by: binding.participant_id,
                    updated_at,
                },
                Some(from),
            );
        } else {
            log::debug!("Modify of missing object {} dropped", object_id);
        }
        Ok(())
    }

    fn delete_object(
        &mut self,
        from: &ConnectionId,
        session_id: Option<SessionId>,
        object_id: ObjectId,
    ) -> Result<(), SessionError> {
        let binding = self.server_state.binding(from, session_id.as_ref())?;
        let removed = self
            .server_state
            .registry
            .get_mut(&binding.session_id)
            .and_then(|s| s.document.remove(&object_id))
            .is_some();

        if removed {
            self.broadcast_session_event(
                &binding.session_id,
                SessionEvent::ObjectDeleted { object_id },
                Some(from),
            );
        } else {
            log::debug!("Delete of missing object {} dropped", object_id);
        }
        Ok(())
    }

    fn clear_canvas(
        &mut self,
        from: &ConnectionId,
        session_id: Option<SessionId>,
    ) -> Result<(), SessionError> {
        let binding = self.server_state.binding(from, session_id.as_ref())?;
        if let Some(session) = self.server_state.registry.get_mut(&binding.session_id) {
            let cleared = session.document.clear();
            log::info!(
                "Session {} cleared by {} ({} objects)",
                binding.session_id,
                binding.participant_id,
                cleared
            );
        }
        self.broadcast_session_event(
            &binding.session_id,
            SessionEvent::CanvasCleared {
                cleared_by: binding.participant_id,
            },
            Some(from),
        );
        Ok(())
    }

    /// Cursor traffic is high-volume and disposable: anything invalid is dropped quietly.
    fn move_cursor(
        &mut self,
        from: &ConnectionId,
        session_id: Option<SessionId>,
        position: Position,
    ) {
        let binding = match self.server_state.binding(from, session_id.as_ref()) {
            Ok(binding) => binding,
            Err(e) => {
                log::debug!("Cursor move from connection {} dropped: {}", from, e);
                return;
            }
        };
        let cursor_event = self
            .server_state
            .registry
            .get_mut(&binding.session_id)
            .and_then(|s| {
                s.participants
                    .update_cursor(&binding.participant_id, position)
            })
            .map(|participant| LiveCursorEvent {
                participant_id: participant.id.clone(),
                display_name: participant.display_name.clone(),
                color: participant.color.clone(),
                position,
            });

        if let Some(cursor_event) = cursor_event {
            self.broadcast_session_event(
                &binding.session_id,
                SessionEvent::CursorMoved(cursor_event),
                Some(from),
            );
        }
    }

    fn broadcast_session_event(
        &mut self,
        session_id: &SessionId,
        session_event: SessionEvent,
        without: Option<&ConnectionId>,
    ) {
        for connection_id in self
            .server_state
            .connection_ids_in_session(session_id, without)
        {
            let event = ConnectionEvent::IdentifiableEvent(IdentifiableEvent::BySystem {
                session_event: session_event.clone(),
            });
            self.connections.send(&connection_id, event);
        }
    }

    fn reply(&mut self, to: &ConnectionId, command_id: CommandId, result: CommandResult) {
        self.connections.send(
            to,
            ConnectionEvent::IdentifiableEvent(IdentifiableEvent::ByMyself { command_id, result }),
        );
    }

    /// Unbinds the connection and tells the rest of the room. Returns the session it left.
    fn unbind(&mut self, connection_id: &ConnectionId) -> Option<SessionId> {
        let departed = self.server_state.leave_session(connection_id)?;
        if let Some(participant) = departed.participant {
            self.broadcast_session_event(
                &departed.binding.session_id,
                SessionEvent::ParticipantLeft {
                    participant_id: participant.id,
                    display_name: participant.display_name,
                },
                Some(connection_id),
            );
        }
        Some(departed.binding.session_id)
    }

    fn disconnect(&mut self, connection_id: &ConnectionId) {
        self.unbind(connection_id);
        self.server_state.disconnect(connection_id);
        if self.connections.contains(connection_id) {
            self.connections.send(
                connection_id,
                ConnectionEvent::Disconnected {
                    connection_id: *connection_id,
                },
            );
            self.connections.remove(connection_id);
            log::info!("Connection {} disconnected", connection_id);
        }
    }

    fn handle_admin_command(&mut self, command: AdminCommand) {
        match command {
            AdminCommand::ListSessions { tx } => {
                let registry = &self.server_state.registry;
                let summaries = registry
                    .session_ids()
                    .iter()
                    .filter_map(|id| registry.get(id))
                    .map(SessionSummary::from)
                    .collect::<Vec<_>>();
                if tx.send(summaries).is_err() {
                    log::warn!("Admin requester went away before the reply");
                }
            }
        }
    }
}

pub fn spawn_server(registry: SessionRegistry, queue: usize) -> ServerTx {
    let (srv_tx, mut srv_rx) = channel::<ServerCommand>(queue);

    tokio::spawn(async move {
        let mut server = Box::new(Server::new(registry));

        while let Some(command) = srv_rx.recv().await {
            server.handle_server_command(command);
        }
        log::info!("Sync engine stopped");
    });

    srv_tx
}
