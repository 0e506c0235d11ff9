use crate::message::{Participant, SessionSnapshot};
use crate::palette::ColorPicker;
use crate::types::{ConnectionId, ParticipantId, Position};

#[derive(Debug, Clone)]
struct Member {
    connection_id: ConnectionId,
    participant: Participant,
}

/// Result of removing a participant from its session.
#[derive(Debug, Clone, PartialEq)]
pub struct Departure {
    pub participant: Participant,
    pub session_empty: bool,
}

/// Who is in one session, where their cursor is, and which connection
/// delivers to them. Members keep their join order.
#[derive(Debug, Clone)]
pub struct ParticipantTracker {
    members: Vec<Member>,
    colors: ColorPicker,
}

impl ParticipantTracker {
    pub fn new(colors: ColorPicker) -> Self {
        Self {
            members: Vec::new(),
            colors,
        }
    }

    /// Adds a participant with a fresh colour. Joining again under an id
    /// that is already present replaces the record and resets its cursor,
    /// keeping the original position in the join order.
    pub fn join(
        &mut self,
        connection_id: ConnectionId,
        participant_id: &ParticipantId,
        display_name: &str,
    ) -> Participant {
        let participant = Participant {
            id: participant_id.clone(),
            display_name: display_name.to_owned(),
            color: self.colors.pick().to_owned(),
            cursor: None,
        };
        let member = Member {
            connection_id,
            participant: participant.clone(),
        };
        match self.position(participant_id) {
            Some(index) => self.members[index] = member,
            None => self.members.push(member),
        }
        participant
    }

    pub fn leave(&mut self, participant_id: &ParticipantId) -> Option<Departure> {
        let index = self.position(participant_id)?;
        let member = self.members.remove(index);
        Some(Departure {
            participant: member.participant,
            session_empty: self.members.is_empty(),
        })
    }

    /// Returns `None` without complaint when the participant isn't here.
    pub fn update_cursor(
        &mut self,
        participant_id: &ParticipantId,
        position: Position,
    ) -> Option<&Participant> {
        let index = self.position(participant_id)?;
        let participant = &mut self.members[index].participant;
        participant.cursor = Some(position);
        Some(participant)
    }

    pub fn get(&self, participant_id: &ParticipantId) -> Option<&Participant> {
        self.position(participant_id)
            .map(|index| &self.members[index].participant)
    }

    pub fn contains(&self, participant_id: &ParticipantId) -> bool {
        self.position(participant_id).is_some()
    }

    pub fn connection_of(&self, participant_id: &ParticipantId) -> Option<ConnectionId> {
        self.position(participant_id)
            .map(|index| self.members[index].connection_id)
    }

    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.members.iter().map(|m| m.connection_id).collect()
    }

    pub fn list(&self) -> Vec<Participant> {
        self.members.iter().map(|m| m.participant.clone()).collect()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            participants: self.list(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn position(&self, participant_id: &ParticipantId) -> Option<usize> {
        self.members
            .iter()
            .position(|m| &m.participant.id == participant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PALETTE;

    fn tracker() -> ParticipantTracker {
        ParticipantTracker::new(ColorPicker::seeded(7))
    }

    #[test]
    fn it_lists_participants_in_join_order() {
        let mut tracker = tracker();
        tracker.join(1, &"a".into(), "Alice");
        tracker.join(2, &"b".into(), "Bob");
        tracker.join(3, &"c".into(), "Carol");

        let ids: Vec<_> = tracker.list().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(tracker.connection_ids(), vec![1, 2, 3]);
        assert!(tracker
            .list()
            .iter()
            .all(|p| PALETTE.contains(&p.color.as_str())));
    }

    #[test]
    fn it_replaces_on_rejoin_and_resets_cursor() {
        let mut tracker = tracker();
        tracker.join(1, &"a".into(), "Alice");
        tracker.join(2, &"b".into(), "Bob");
        tracker.update_cursor(&"a".into(), Position::new(3.0, 4.0));

        let rejoined = tracker.join(5, &"a".into(), "Alice again");

        assert_eq!(tracker.len(), 2);
        assert_eq!(rejoined.cursor, None);
        assert_eq!(tracker.list()[0].display_name, "Alice again");
        assert_eq!(tracker.connection_of(&"a".into()), Some(5));
    }

    #[test]
    fn it_reports_emptiness_on_leave() {
        let mut tracker = tracker();
        tracker.join(1, &"a".into(), "Alice");
        tracker.join(2, &"b".into(), "Bob");

        let first = tracker.leave(&"a".into()).expect("member");
        assert_eq!(first.participant.id, "a");
        assert!(!first.session_empty);

        assert_eq!(tracker.leave(&"a".into()), None);

        let last = tracker.leave(&"b".into()).expect("member");
        assert!(last.session_empty);
        assert!(tracker.is_empty());
    }

    #[test]
    fn it_ignores_cursor_of_strangers() {
        let mut tracker = tracker();
        tracker.join(1, &"a".into(), "Alice");

        assert!(tracker
            .update_cursor(&"nobody".into(), Position::new(1.0, 1.0))
            .is_none());
        let moved = tracker
            .update_cursor(&"a".into(), Position::new(1.5, 2.5))
            .expect("member");
        assert_eq!(moved.cursor, Some(Position::new(1.5, 2.5)));
        assert_eq!(
            tracker.get(&"a".into()).and_then(|p| p.cursor),
            Some(Position::new(1.5, 2.5))
        );
    }
}
