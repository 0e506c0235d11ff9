use crate::connection::ConnectionEvent;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use whiteboard_system::ConnectionId;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("outbox is full")]
    Full,
    #[error("connection is closed")]
    Closed,
}

/// Where the engine drops events for one connection. Delivery never waits:
/// a slow peer loses events instead of stalling the room.
pub trait EventSink: Send + fmt::Debug {
    fn try_deliver(&mut self, event: ConnectionEvent) -> Result<(), DeliveryError>;
}

impl EventSink for tokio::sync::mpsc::Sender<ConnectionEvent> {
    fn try_deliver(&mut self, event: ConnectionEvent) -> Result<(), DeliveryError> {
        self.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

pub type ConnectionTx = Box<dyn EventSink>;

pub struct ConnectionTxStorage {
    connection_txs: HashMap<ConnectionId, ConnectionTx>,
}

impl ConnectionTxStorage {
    pub fn new() -> Self {
        Self {
            connection_txs: HashMap::new(),
        }
    }

    pub fn insert(&mut self, connection_id: ConnectionId, tx: ConnectionTx) {
        self.connection_txs.insert(connection_id, tx);
    }

    /// Returns whether the event was queued for the connection.
    pub fn send(&mut self, to: &ConnectionId, event: ConnectionEvent) -> bool {
        if let Some(tx) = self.connection_txs.get_mut(to) {
            match tx.try_deliver(event) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Dropped event for connection {}: {}", to, e);
                    false
                }
            }
        } else {
            log::warn!("No outbox for connection {}", to);
            false
        }
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<ConnectionTx> {
        self.connection_txs.remove(connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.connection_txs.contains_key(connection_id)
    }
}

impl Default for ConnectionTxStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn it_queues_events_on_channel() {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<ConnectionEvent>(4);
        let mut storage = ConnectionTxStorage::new();
        storage.insert(1, Box::new(tx));

        assert!(storage.send(&1, ConnectionEvent::Connected { connection_id: 1 }));
        match rx.recv().await {
            Some(ConnectionEvent::Connected { connection_id }) => assert_eq!(connection_id, 1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn it_reports_closed_and_unknown_connections() {
        let (tx, rx) = tokio::sync::mpsc::channel::<ConnectionEvent>(4);
        let mut storage = ConnectionTxStorage::new();
        storage.insert(1, Box::new(tx));
        drop(rx);

        assert!(!storage.send(&1, ConnectionEvent::Connected { connection_id: 1 }));
        assert!(!storage.send(&2, ConnectionEvent::Connected { connection_id: 2 }));
        assert!(storage.remove(&1).is_some());
        assert!(!storage.contains(&1));
    }
}
