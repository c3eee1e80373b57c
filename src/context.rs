//! Opaque, caller-supplied data threaded through every resolution frame.
//!
//! The engine never inspects the entries; they ride along so resolvers can
//! read request-scoped data such as the viewer identity.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use serde_json_bytes::Value;

use crate::error::QueryError;
use crate::json_ext::Object;

/// Holds [`Context`] entries.
pub type Entries = Arc<DashMap<String, Value>>;

/// Context handed to [`crate::Query::parse`] and passed to every resolver.
#[derive(Clone, Debug, Default)]
pub struct Context {
    entries: Entries,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<K, V>(&self, key: K) -> Result<Option<V>, QueryError>
    where
        K: Into<String>,
        V: for<'de> serde::Deserialize<'de>,
    {
        self.entries
            .get(&key.into())
            .map(|v| serde_json_bytes::from_value(v.value().clone()))
            .transpose()
            .map_err(|e| QueryError::Context(e.to_string()))
    }

    pub fn insert<K, V>(&self, key: K, value: V) -> Result<(), QueryError>
    where
        K: Into<String>,
        V: Serialize,
    {
        let value = serde_json_bytes::to_value(value).map_err(|e| QueryError::Context(e.to_string()))?;
        self.entries.insert(key.into(), value);
        Ok(())
    }

    /// Snapshot of the entries as a JSON object, backing the `context` root call.
    pub fn to_value(&self) -> Value {
        let mut object = Object::new();
        for entry in self.entries.iter() {
            object.insert(entry.key().as_str(), entry.value().clone());
        }
        Value::Object(object)
    }
}
