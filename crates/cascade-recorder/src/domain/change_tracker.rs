use serde::{Deserialize, Serialize};

/// Deltas accumulated by the engine during the most recent step
///
/// The recorder treats the tracker as an opaque payload: it is serialized
/// as-is into step records and its structure is never inspected here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeTracker {
    changes: serde_json::Value,
}

impl ChangeTracker {
    /// Wrap an engine-produced delta
    #[inline]
    pub fn new(changes: serde_json::Value) -> Self {
        Self { changes }
    }

    /// A tracker holding no changes
    #[inline]
    pub fn empty() -> Self {
        Self {
            changes: serde_json::Value::Null,
        }
    }

    /// Build a tracker from any serializable delta type
    pub fn from_serializable<T: Serialize>(changes: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::to_value(changes)?))
    }

    /// Get the inner JSON value
    #[inline]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.changes
    }

    /// Take ownership of the inner JSON value
    #[inline]
    pub fn into_value(self) -> serde_json::Value {
        self.changes
    }

    /// True when the tracker carries nothing
    pub fn is_empty(&self) -> bool {
        match &self.changes {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            serde_json::Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }
}
