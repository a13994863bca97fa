use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::broadcast;

use super::DocumentStore;
use crate::errors::StoreError;

const WATCHER_BUFFER: usize = 16;

/// In-memory document store with last-write-wins semantics per path.
///
/// Documents are stored at the deepest written path; reading a shallower
/// path assembles the descendants into a nested object ordered by key.
/// Push keys are chronologically ordered, so key order is insertion order.
///
/// Used by the test suite and for local development; it deliberately keeps
/// the same observable semantics the external store exposes, including
/// subscriptions that deliver the subscriber's own writes.
pub struct MemoryStore {
    docs: DashMap<String, Value>,
    watchers: DashMap<String, broadcast::Sender<Option<Value>>>,
    push_seq: AtomicU64,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            docs: DashMap::new(),
            watchers: DashMap::new(),
            push_seq: AtomicU64::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Fault injection for tests: while enabled, every mutation fails
    /// without touching stored state.
    pub fn fail_writes(&self, enabled: bool) {
        self.fail_writes.store(enabled, Ordering::SeqCst);
    }

    fn check_writable(&self, path: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::write(path, "injected failure"));
        }
        Ok(())
    }

    fn next_push_key(&self) -> String {
        let millis = Utc::now().timestamp_millis().max(0) as u64;
        let seq = self.push_seq.fetch_add(1, Ordering::SeqCst);
        format!("{:011x}{:05x}", millis, seq & 0xf_ffff)
    }

    fn read_sync(&self, path: &str) -> Option<Value> {
        if let Some(doc) = self.docs.get(path) {
            return Some(doc.value().clone());
        }

        let prefix = format!("{}/", path);
        let mut root = Map::new();
        let mut found = false;
        for entry in self.docs.iter() {
            if let Some(rel) = entry.key().strip_prefix(&prefix) {
                insert_nested(&mut root, rel, entry.value().clone());
                found = true;
            }
        }
        found.then(|| Value::Object(root))
    }

    /// Delivers the current value at every subscribed path the mutation
    /// at `path` affects: the path itself, its ancestors, and its
    /// descendants.
    fn notify(&self, path: &str) {
        for watcher in self.watchers.iter() {
            if affects(watcher.key(), path) {
                let _ = watcher.value().send(self.read_sync(watcher.key()));
            }
        }
    }

    fn remove_subtree(&self, path: &str) {
        let prefix = format!("{}/", path);
        self.docs.remove(path);
        self.docs.retain(|key, _| !key.starts_with(&prefix));
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.read_sync(normalize(path)))
    }

    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let path = normalize(path);
        self.check_writable(path)?;

        self.remove_subtree(path);
        self.docs.insert(path.to_string(), value);
        self.notify(path);
        Ok(())
    }

    async fn update(&self, path: &str, patch: Map<String, Value>) -> Result<(), StoreError> {
        let path = normalize(path);
        self.check_writable(path)?;

        let mut doc = match self.docs.get(path).map(|d| d.value().clone()) {
            Some(Value::Object(existing)) => existing,
            _ => Map::new(),
        };
        for (key, value) in patch {
            doc.insert(key, value);
        }
        self.docs.insert(path.to_string(), Value::Object(doc));
        self.notify(path);
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        let path = normalize(path);
        self.check_writable(path)?;

        self.remove_subtree(path);
        self.notify(path);
        Ok(())
    }

    fn new_child_key(&self, _path: &str) -> String {
        self.next_push_key()
    }

    fn subscribe(&self, path: &str) -> broadcast::Receiver<Option<Value>> {
        let path = normalize(path);
        self.watchers
            .entry(path.to_string())
            .or_insert_with(|| broadcast::channel(WATCHER_BUFFER).0)
            .subscribe()
    }
}

fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}

/// Whether a mutation at `written` changes the value seen at `subscribed`.
fn affects(subscribed: &str, written: &str) -> bool {
    covers(subscribed, written) || covers(written, subscribed)
}

fn covers(ancestor: &str, path: &str) -> bool {
    path == ancestor
        || (path.len() > ancestor.len()
            && path.starts_with(ancestor)
            && path.as_bytes()[ancestor.len()] == b'/')
}

fn insert_nested(root: &mut Map<String, Value>, rel_path: &str, value: Value) {
    let mut segments = rel_path.split('/').peekable();
    let mut current = root;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        match slot {
            Value::Object(map) => current = map,
            other => {
                // A deeper write shadows a shallower leaf.
                *other = Value::Object(Map::new());
                match other {
                    Value::Object(map) => current = map,
                    _ => unreachable!(),
                }
            }
        }
    }
}
