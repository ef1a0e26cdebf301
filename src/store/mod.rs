//! Session cache over the remote document store.
//!
//! The cache mirrors the `tasks`, `contacts` and `users` collections. It is
//! hydrated once per session (from session storage if a blob exists, from the
//! remote store otherwise) and written back to session storage as one JSON blob
//! after every mutation.

pub mod contacts;
pub mod tasks;
pub mod users;

use crate::contacts::assign_colors;
use crate::error::{JoinResult, StorageError};
use crate::remote::{RemoteStore, created_key};
use crate::session::{self, CACHE_KEY, SessionStorage};
use crate::types::{Collection, CollectionKind, Contact, Keyed, Task, User, to_collection, to_records};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The serialized shape of the cache. `None` marks a collection that was never loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub tasks: Option<Collection<Task>>,
    pub contacts: Option<Collection<Contact>>,
    pub users: Option<Collection<User>>,
}

/// Session-scoped data store.
pub struct DataStore {
    remote: Arc<dyn RemoteStore>,
    storage: Arc<dyn SessionStorage>,
    cache: CacheSnapshot,
    initialized: bool,
    write_through: bool,
}

impl DataStore {
    /// Create a store. Nothing is loaded until [`DataStore::initialize`].
    pub fn new(remote: Arc<dyn RemoteStore>, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            remote,
            storage,
            cache: CacheSnapshot::default(),
            initialized: false,
            write_through: false,
        }
    }

    /// Push whole collections to the remote store after mutations.
    pub fn with_write_through(mut self, enabled: bool) -> Self {
        self.write_through = enabled;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn write_through(&self) -> bool {
        self.write_through
    }

    /// Session storage shared with auth and summary.
    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.storage
    }

    pub fn remote(&self) -> &Arc<dyn RemoteStore> {
        &self.remote
    }

    /// Hydrate the cache.
    ///
    /// A blob already in session storage is used verbatim. Otherwise all three
    /// collections are fetched and the result is persisted right away. Calling
    /// this again is a no-op until [`DataStore::clear`].
    pub async fn initialize(&mut self) -> JoinResult<()> {
        if self.initialized {
            return Ok(());
        }

        match session::load_json::<CacheSnapshot>(self.storage.as_ref(), CACHE_KEY) {
            Ok(Some(snapshot)) => {
                debug!("Session cache restored from session storage");
                self.cache = snapshot;
                self.fill_keys();
                self.initialized = true;
                return Ok(());
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session cache");
            }
        }

        let tasks = parse_collection::<Task>(
            CollectionKind::Tasks,
            self.remote.fetch_collection(CollectionKind::Tasks.path()).await,
        );
        let contacts = parse_collection::<Contact>(
            CollectionKind::Contacts,
            self.remote.fetch_collection(CollectionKind::Contacts.path()).await,
        );
        let users = parse_collection::<User>(
            CollectionKind::Users,
            self.remote.fetch_collection(CollectionKind::Users.path()).await,
        );

        info!(
            tasks = tasks.len(),
            contacts = contacts.len(),
            users = users.len(),
            "Session cache hydrated from remote store"
        );

        self.cache = CacheSnapshot {
            tasks: Some(tasks),
            contacts: Some(contacts),
            users: Some(users),
        };
        self.initialized = true;

        if let Err(e) = self.persist() {
            warn!(error = %e, "Failed to persist freshly hydrated session cache");
        }
        Ok(())
    }

    /// Drop the session blob. The next [`DataStore::initialize`] refetches.
    pub fn clear(&mut self) -> JoinResult<()> {
        self.storage.remove_item(CACHE_KEY)?;
        self.cache = CacheSnapshot::default();
        self.initialized = false;
        info!("Session cache cleared");
        Ok(())
    }

    /// All tasks, each carrying its id.
    pub fn get_tasks(&self) -> Vec<Task> {
        self.cache.tasks.as_ref().map(to_records).unwrap_or_default()
    }

    /// All contacts, each carrying its id and a stable badge color.
    ///
    /// Contacts missing a color get one here; the assignment is written back to
    /// the cache so later calls return the same colors.
    pub fn get_contacts(&mut self) -> Vec<Contact> {
        let mut contacts: Vec<Contact> = self.cache.contacts.as_ref().map(to_records).unwrap_or_default();
        if assign_colors(&mut contacts) > 0 {
            let mut next = self.cache.clone();
            next.contacts = Some(to_collection(contacts.iter().cloned()));
            if let Err(e) = self.commit(next) {
                // Colors stay assigned in the returned list; the next call
                // recomputes the same ones from the same order.
                warn!(error = %e, "Failed to persist contact colors");
            }
        }
        contacts
    }

    /// All users, each carrying its id.
    pub fn get_users(&self) -> Vec<User> {
        self.cache.users.as_ref().map(to_records).unwrap_or_default()
    }

    /// The raw task mapping.
    pub fn tasks(&self) -> Collection<Task> {
        self.cache.tasks.clone().unwrap_or_default()
    }

    /// The raw contact mapping.
    pub fn contacts(&self) -> Collection<Contact> {
        self.cache.contacts.clone().unwrap_or_default()
    }

    /// The raw user mapping.
    pub fn users(&self) -> Collection<User> {
        self.cache.users.clone().unwrap_or_default()
    }

    /// Replace the task collection wholesale and persist.
    pub fn update_tasks(&mut self, tasks: Collection<Task>) -> JoinResult<()> {
        let mut next = self.cache.clone();
        next.tasks = Some(tasks);
        self.commit(next)
    }

    /// Replace the contact collection wholesale and persist.
    pub fn update_contacts(&mut self, contacts: Collection<Contact>) -> JoinResult<()> {
        let mut next = self.cache.clone();
        next.contacts = Some(contacts);
        self.commit(next)
    }

    /// Replace the user collection wholesale and persist.
    pub fn update_users(&mut self, users: Collection<User>) -> JoinResult<()> {
        let mut next = self.cache.clone();
        next.users = Some(users);
        self.commit(next)
    }

    /// Push a collection to the remote store when write-through is enabled.
    ///
    /// Returns whether the remote accepted the write. Failures are only logged.
    pub async fn sync(&self, kind: CollectionKind) -> bool {
        if !self.write_through {
            return false;
        }
        let body = match kind {
            CollectionKind::Tasks => serde_json::to_value(self.cache.tasks.as_ref()),
            CollectionKind::Contacts => serde_json::to_value(self.cache.contacts.as_ref()),
            CollectionKind::Users => serde_json::to_value(self.cache.users.as_ref()),
        };
        match body {
            Ok(body) => self
                .remote
                .replace_collection(kind.path(), body)
                .await
                .is_some(),
            Err(e) => {
                warn!(collection = %kind, error = %e, "Failed to serialize collection for sync");
                false
            }
        }
    }

    /// Swap in a new cache and persist it. On failure the previous cache is restored.
    fn commit(&mut self, next: CacheSnapshot) -> JoinResult<()> {
        let previous = std::mem::replace(&mut self.cache, next);
        if let Err(e) = self.persist() {
            warn!(error = %e, "Session cache write failed; keeping previous state");
            self.cache = previous;
            return Err(e.into());
        }
        Ok(())
    }

    /// Stored records do not carry their ids; copy each key back in.
    fn fill_keys(&mut self) {
        fn fill<T: Keyed>(collection: Option<&mut Collection<T>>) {
            for (key, record) in collection.into_iter().flatten() {
                record.set_key(key.clone());
            }
        }
        fill(self.cache.tasks.as_mut());
        fill(self.cache.contacts.as_mut());
        fill(self.cache.users.as_mut());
    }

    fn persist(&self) -> Result<(), StorageError> {
        session::save_json(self.storage.as_ref(), CACHE_KEY, &self.cache)
    }

    /// POST a new record and return the key to file it under.
    ///
    /// Falls back to a timestamp-derived local id when the remote store does
    /// not answer, skipping ids already present.
    async fn new_key<T: Serialize>(
        &self,
        kind: CollectionKind,
        record: &T,
        taken: impl Fn(&str) -> bool,
    ) -> String {
        let remote_key = match serde_json::to_value(record) {
            Ok(body) => self
                .remote
                .create_record(kind.path(), body)
                .await
                .as_ref()
                .and_then(created_key),
            Err(e) => {
                warn!(collection = %kind, error = %e, "Failed to serialize new record");
                None
            }
        };
        if let Some(key) = remote_key.filter(|k| !taken(k)) {
            return key;
        }
        let mut stamp = crate::now_ms();
        loop {
            let candidate = format!("{}{}", kind.id_prefix(), stamp);
            if !taken(&candidate) {
                debug!(collection = %kind, id = %candidate, "Using local id for new record");
                return candidate;
            }
            stamp += 1;
        }
    }
}

/// Turn a remote collection into a keyed mapping.
///
/// Records that fail to parse are skipped with a warning; `None` and
/// non-object payloads become an empty collection.
pub fn parse_collection<T: DeserializeOwned + Keyed>(
    kind: CollectionKind,
    value: Option<Value>,
) -> Collection<T> {
    let Some(Value::Object(map)) = value else {
        return Collection::new();
    };
    let mut collection = Collection::new();
    for (key, raw) in map {
        match serde_json::from_value::<T>(raw) {
            Ok(mut record) => {
                record.set_key(key.clone());
                collection.insert(key, record);
            }
            Err(e) => {
                warn!(collection = %kind, key = %key, error = %e, "Skipping malformed record");
            }
        }
    }
    collection
}
