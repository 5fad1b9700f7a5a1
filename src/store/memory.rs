use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{ContentStore, EntityKind, Record, RecordId};
use crate::error::IngestError;

/// Process-local store for dry runs and tests. Rows are kept as the JSON
/// payloads they were created with, plus an `id`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
    latency: Option<Duration>,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    rows: HashMap<EntityKind, Vec<Value>>,
    create_log: Vec<EntityKind>,
    lookups: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every call, to widen interleavings in tests.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Insert a row directly, bypassing the create log.
    pub fn seed(&self, kind: EntityKind, mut fields: Value) -> RecordId {
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        if let Value::Object(map) = &mut fields {
            map.insert("id".into(), Value::from(id));
        }
        state.rows.entry(kind).or_default().push(fields);
        RecordId::Int(id)
    }

    pub fn rows(&self, kind: EntityKind) -> Vec<Value> {
        self.lock().rows.get(&kind).cloned().unwrap_or_default()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.lock().rows.get(&kind).map_or(0, Vec::len)
    }

    /// Kinds of every `create` call, in call order.
    pub fn create_log(&self) -> Vec<EntityKind> {
        self.lock().create_log.clone()
    }

    pub fn lookups(&self) -> usize {
        self.lock().lookups
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A panic while holding the lock cannot leave rows half-written.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn pause(&self) {
        if let Some(d) = self.latency {
            tokio::time::sleep(d).await;
        }
    }
}

fn to_record(row: &Value) -> Result<Record, IngestError> {
    serde_json::from_value(row.clone())
        .map_err(|e| IngestError::parse(format!("stored row is not a record: {e}")))
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn find_by_name(&self, kind: EntityKind, name: &str) -> Result<Vec<Record>, IngestError> {
        self.pause().await;
        let mut state = self.lock();
        state.lookups += 1;
        state
            .rows
            .get(&kind)
            .into_iter()
            .flatten()
            .filter(|row| row.get("name").and_then(Value::as_str) == Some(name))
            .map(to_record)
            .collect()
    }

    async fn create(&self, kind: EntityKind, mut fields: Value) -> Result<Record, IngestError> {
        self.pause().await;
        let Value::Object(map) = &mut fields else {
            return Err(IngestError::parse(format!("{kind} payload must be an object")));
        };
        let mut state = self.lock();
        state.next_id += 1;
        map.insert("id".into(), Value::from(state.next_id));
        let record = to_record(&fields)?;
        state.rows.entry(kind).or_default().push(fields);
        state.create_log.push(kind);
        Ok(record)
    }
}
