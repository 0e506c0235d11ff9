use crate::error::SessionError;
use crate::message::{DocumentSnapshot, DrawingObject};
use crate::property_bag::PropertyBag;
use crate::types::{ObjectId, ParticipantId, Timestamp};

/// Ordered drawing objects of one session.
///
/// Order is the order of `add` calls: removing an object leaves the others
/// where they were and modifying never moves one. There is no history, so a
/// removed object is gone for good.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    objects: Vec<DrawingObject>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    pub fn add(&mut self, object: DrawingObject) -> Result<(), SessionError> {
        if self.contains(&object.id) {
            return Err(SessionError::DuplicateObjectId(object.id));
        }
        self.objects.push(object);
        Ok(())
    }

    /// Merges `partial` into the object's properties and stamps the modifier.
    /// An unknown id is ignored, so a modify that lost a race with a delete
    /// simply disappears.
    pub fn modify(
        &mut self,
        object_id: &ObjectId,
        partial: PropertyBag,
        modified_by: &ParticipantId,
        modified_at: Timestamp,
    ) -> Option<&DrawingObject> {
        let index = self.position(object_id)?;
        let object = &mut self.objects[index];
        object.properties.merge(partial);
        object.updated_by = Some(modified_by.clone());
        object.updated_at = Some(modified_at);
        Some(object)
    }

    pub fn remove(&mut self, object_id: &ObjectId) -> Option<DrawingObject> {
        let index = self.position(object_id)?;
        Some(self.objects.remove(index))
    }

    /// Empties the document and returns how many objects were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.objects.len();
        self.objects.clear();
        count
    }

    pub fn get(&self, object_id: &ObjectId) -> Option<&DrawingObject> {
        self.position(object_id).map(|index| &self.objects[index])
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.position(object_id).is_some()
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            objects: self.objects.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn position(&self, object_id: &ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| &o.id == object_id)
    }
}
