use crate::palette::ColorPicker;
use crate::session::Session;
use crate::types::SessionId;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::HashMap;

/// Every live session, by id. Sessions appear on first join and are reaped
/// once their last participant is gone; nothing survives a reap.
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
    seeds: StdRng,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            seeds: StdRng::from_entropy(),
        }
    }

    /// Colour assignment in every session created by this registry follows
    /// from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            sessions: HashMap::new(),
            seeds: StdRng::seed_from_u64(seed),
        }
    }

    pub fn get_or_create(&mut self, session_id: &SessionId) -> &mut Session {
        let seeds = &mut self.seeds;
        self.sessions.entry(session_id.clone()).or_insert_with(|| {
            log::info!("Session {} created", session_id);
            Session::new(session_id.clone(), ColorPicker::seeded(seeds.next_u64()))
        })
    }

    pub fn get(&self, session_id: &SessionId) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    pub fn get_mut(&mut self, session_id: &SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(session_id)
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn remove(&mut self, session_id: &SessionId) -> Option<Session> {
        self.sessions.remove(session_id)
    }

    /// Removes the session if nobody is left in it. Returns whether it was removed.
    pub fn reap_if_empty(&mut self, session_id: &SessionId) -> bool {
        let empty = self
            .sessions
            .get(session_id)
            .map(|s| s.participants.is_empty())
            .unwrap_or(false);
        if empty {
            self.sessions.remove(session_id);
            log::info!("Session {} deleted - no participants remaining", session_id);
        }
        empty
    }

    /// Session ids in lexical order.
    pub fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.sessions.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
