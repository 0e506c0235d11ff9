use serde::de::{self, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::convert::TryFrom;

/// Renderer-owned properties of a drawing object (coordinates, colour, width, ...).
///
/// The core never looks inside. It only stores, merges and relays the bag.
/// Human-readable formats see a plain JSON object; binary formats carry the
/// object as an embedded JSON string, since bincode cannot decode
/// self-describing values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag(Map<String, Value>);

impl PropertyBag {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Shallow merge: every top-level key of `partial` overwrites ours.
    pub fn merge(&mut self, partial: PropertyBag) {
        for (key, value) in partial.0 {
            self.0.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for PropertyBag {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for PropertyBag {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

impl From<PropertyBag> for Value {
    fn from(bag: PropertyBag) -> Self {
        Value::Object(bag.0)
    }
}

impl Serialize for PropertyBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            self.0.serialize(serializer)
        } else {
            let encoded = serde_json::to_string(&self.0).map_err(ser::Error::custom)?;
            serializer.serialize_str(&encoded)
        }
    }
}

impl<'de> Deserialize<'de> for PropertyBag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            Map::deserialize(deserializer).map(Self)
        } else {
            let encoded = String::deserialize(deserializer)?;
            serde_json::from_str(&encoded)
                .map(Self)
                .map_err(de::Error::custom)
        }
    }
}
