//! Remote document store client.
//!
//! Speaks the Firebase Realtime Database REST shape: every collection lives at
//! `{base}/{collection}.json`. Calls are single best-effort attempts; failures
//! are logged and reported as `None`, never as errors.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, warn};

/// Failure talking to the remote store. Only surfaces in logs.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("remote store is offline")]
    Offline,
}

/// A JSON document store addressed by collection path.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// GET a whole collection. `None` means empty, absent, or failed.
    async fn fetch_collection(&self, path: &str) -> Option<Value>;

    /// POST a record into a collection. Returns the key wrapper (`{"name": key}`).
    async fn create_record(&self, path: &str, data: Value) -> Option<Value>;

    /// PUT a collection wholesale, replacing whatever the store held.
    async fn replace_collection(&self, path: &str, data: Value) -> Option<Value>;
}

/// Extract the generated key from a create response.
pub fn created_key(response: &Value) -> Option<String> {
    response
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// REST client for a Firebase Realtime Database.
#[derive(Debug, Clone)]
pub struct FirebaseClient {
    client: reqwest::Client,
    base_url: String,
}

impl FirebaseClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Endpoint URL for a collection.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path.trim_matches('/'))
    }

    async fn get_json(&self, path: &str) -> Result<Value, RemoteError> {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json::<Value>().await?)
    }

    async fn post_json(&self, path: &str, data: &Value) -> Result<Value, RemoteError> {
        let resp = self
            .client
            .post(self.url(path))
            .json(data)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json::<Value>().await?)
    }

    async fn put_json(&self, path: &str, data: &Value) -> Result<Value, RemoteError> {
        let resp = self
            .client
            .put(self.url(path))
            .json(data)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json::<Value>().await?)
    }
}

#[async_trait]
impl RemoteStore for FirebaseClient {
    async fn fetch_collection(&self, path: &str) -> Option<Value> {
        match self.get_json(path).await {
            Ok(Value::Null) => {
                debug!(collection = %path, "Remote collection is empty");
                None
            }
            Ok(value) => Some(value),
            Err(e) => {
                warn!(collection = %path, error = %e, "Failed to fetch remote collection");
                None
            }
        }
    }

    async fn create_record(&self, path: &str, data: Value) -> Option<Value> {
        match self.post_json(path, &data).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(collection = %path, error = %e, "Failed to create remote record");
                None
            }
        }
    }

    async fn replace_collection(&self, path: &str, data: Value) -> Option<Value> {
        match self.put_json(path, &data).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(collection = %path, error = %e, "Failed to replace remote collection");
                None
            }
        }
    }
}

/// In-process document store.
///
/// Used when no remote URL is configured, and as the test double for the
/// REST client. Keys are generated from a counter so they sort in creation order.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    collections: Mutex<HashMap<String, Value>>,
    next_key: AtomicUsize,
    fetches: AtomicUsize,
    offline: AtomicBool,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection.
    pub fn with_collection(self, path: &str, value: Value) -> Self {
        self.lock().insert(path.to_string(), value);
        self
    }

    /// Simulate a network outage: every call fails.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    /// Number of `fetch_collection` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Current raw contents of a collection.
    pub fn collection(&self, path: &str) -> Option<Value> {
        self.lock().get(path).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        // A poisoned map is still a usable map.
        self.collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_online(&self, path: &str) -> Result<(), RemoteError> {
        if self.offline.load(Ordering::Relaxed) {
            let err = RemoteError::Offline;
            warn!(collection = %path, error = %err, "Remote call failed");
            return Err(err);
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn fetch_collection(&self, path: &str) -> Option<Value> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.check_online(path).ok()?;
        match self.lock().get(path) {
            Some(Value::Null) | None => None,
            Some(value) => Some(value.clone()),
        }
    }

    async fn create_record(&self, path: &str, data: Value) -> Option<Value> {
        self.check_online(path).ok()?;
        let n = self.next_key.fetch_add(1, Ordering::Relaxed);
        let key = format!("-Join{:08}", n);
        let mut collections = self.lock();
        let entry = collections
            .entry(path.to_string())
            .or_insert_with(|| json!({}));
        if !entry.is_object() {
            *entry = json!({});
        }
        if let Some(map) = entry.as_object_mut() {
            map.insert(key.clone(), data);
        }
        Some(json!({ "name": key }))
    }

    async fn replace_collection(&self, path: &str, data: Value) -> Option<Value> {
        self.check_online(path).ok()?;
        self.lock().insert(path.to_string(), data.clone());
        Some(data)
    }
}
