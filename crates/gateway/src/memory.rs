//! In-memory backend for tests/dev.
//!
//! - No IO; every call completes immediately
//! - Insertion-ordered collections, ids minted as UUIDv7
//! - Push fan-out to live listeners after every mutation
//! - Per-call counters and fault injection, so tests can assert that a
//!   rejected request never reached the backend

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use admindash_core::{Fields, Record, RecordId};

use crate::auth::{AuthGateway, Session};
use crate::blob::BlobStore;
use crate::collection::CollectionGateway;
use crate::error::GatewayError;
use crate::subscription::{SnapshotSender, Subscription};

/// Which kinds of call should fail on purpose.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Faults {
    pub reads: bool,
    pub writes: bool,
    pub auth: bool,
    pub storage: bool,
}

/// How many times each gateway operation was invoked.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub creates: usize,
    pub reads: usize,
    pub updates: usize,
    pub deletes: usize,
    pub subscribes: usize,
    pub authentications: usize,
    pub uploads: usize,
}

impl CallCounts {
    pub fn writes(&self) -> usize {
        self.creates + self.updates + self.deletes
    }
}

#[derive(Debug, Default)]
struct Counters {
    creates: AtomicUsize,
    reads: AtomicUsize,
    updates: AtomicUsize,
    deletes: AtomicUsize,
    subscribes: AtomicUsize,
    authentications: AtomicUsize,
    uploads: AtomicUsize,
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Clone)]
struct Account {
    user_id: String,
    password: String,
}

#[derive(Debug, Clone)]
struct Blob {
    content_type: String,
    bytes: Vec<u8>,
}

/// Backend double implementing every gateway trait.
#[derive(Debug)]
pub struct InMemoryBackend {
    collections: RwLock<HashMap<String, Vec<Record>>>,
    listeners: Mutex<HashMap<String, Vec<SnapshotSender>>>,
    accounts: RwLock<HashMap<String, Account>>,
    blobs: RwLock<BTreeMap<String, Blob>>,
    faults: RwLock<Faults>,
    counters: Counters,
    session_ttl: Duration,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            listeners: Mutex::new(HashMap::new()),
            accounts: RwLock::new(HashMap::new()),
            blobs: RwLock::new(BTreeMap::new()),
            faults: RwLock::new(Faults::default()),
            counters: Counters::default(),
            session_ttl: Duration::hours(1),
        }
    }
}

fn poisoned() -> GatewayError {
    GatewayError::unavailable("in-memory backend lock poisoned")
}

fn mint_id() -> Result<RecordId, GatewayError> {
    RecordId::parse(Uuid::now_v7().simple().to_string())
        .map_err(|e| GatewayError::write(e.to_string()))
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sign-in account.
    pub fn with_account(self, email: impl Into<String>, password: impl Into<String>) -> Self {
        if let Ok(mut accounts) = self.accounts.write() {
            accounts.insert(
                email.into(),
                Account {
                    user_id: Uuid::now_v7().simple().to_string(),
                    password: password.into(),
                },
            );
        }
        self
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Insert a record directly, as another client would. Not counted as a
    /// dashboard call, but listeners are notified.
    pub fn seed(&self, collection: &str, fields: Fields) -> Result<RecordId, GatewayError> {
        let id = mint_id()?;
        self.collections
            .write()
            .map_err(|_| poisoned())?
            .entry(collection.to_string())
            .or_default()
            .push(Record::new(id.clone(), fields));
        self.publish(collection);
        Ok(id)
    }

    /// Current contents of a collection, bypassing counters and faults.
    pub fn records(&self, collection: &str) -> Vec<Record> {
        self.collections
            .read()
            .ok()
            .and_then(|map| map.get(collection).cloned())
            .unwrap_or_default()
    }

    pub fn set_faults(&self, faults: Faults) {
        if let Ok(mut current) = self.faults.write() {
            *current = faults;
        }
    }

    pub fn calls(&self) -> CallCounts {
        let c = &self.counters;
        CallCounts {
            creates: c.creates.load(Ordering::Relaxed),
            reads: c.reads.load(Ordering::Relaxed),
            updates: c.updates.load(Ordering::Relaxed),
            deletes: c.deletes.load(Ordering::Relaxed),
            subscribes: c.subscribes.load(Ordering::Relaxed),
            authentications: c.authentications.load(Ordering::Relaxed),
            uploads: c.uploads.load(Ordering::Relaxed),
        }
    }

    /// Number of listeners on `collection` whose consumer is still alive.
    pub fn live_listeners(&self, collection: &str) -> usize {
        let Ok(mut listeners) = self.listeners.lock() else {
            return 0;
        };
        match listeners.get_mut(collection) {
            Some(senders) => {
                senders.retain(|tx| !tx.is_closed());
                senders.len()
            }
            None => 0,
        }
    }

    /// Bytes stored under `path`, with their content type.
    pub fn blob(&self, path: &str) -> Option<(String, Vec<u8>)> {
        let blobs = self.blobs.read().ok()?;
        blobs
            .get(path)
            .map(|b| (b.content_type.clone(), b.bytes.clone()))
    }

    fn faults(&self) -> Faults {
        self.faults.read().map(|f| *f).unwrap_or_default()
    }

    /// Fan the current collection out to every live listener.
    /// Lock order: listeners, then collections. Mutations release the
    /// collections lock before publishing.
    fn publish(&self, collection: &str) {
        let Ok(mut listeners) = self.listeners.lock() else {
            return;
        };
        let snapshot = self.records(collection);
        if let Some(senders) = listeners.get_mut(collection) {
            // Drop any dead listeners while publishing.
            senders.retain(|tx| tx.send(Ok(snapshot.clone())));
            tracing::debug!(collection, listeners = senders.len(), "pushed snapshot");
        }
    }
}

#[async_trait]
impl CollectionGateway for InMemoryBackend {
    async fn create_record(&self, collection: &str, fields: Fields) -> Result<RecordId, GatewayError> {
        bump(&self.counters.creates);
        if self.faults().writes {
            return Err(GatewayError::write("injected write failure"));
        }

        let id = mint_id()?;
        {
            let mut map = self.collections.write().map_err(|_| poisoned())?;
            map.entry(collection.to_string())
                .or_default()
                .push(Record::new(id.clone(), fields));
        }
        tracing::debug!(collection, %id, "created record");
        self.publish(collection);
        Ok(id)
    }

    async fn read_all_records(&self, collection: &str) -> Result<Vec<Record>, GatewayError> {
        bump(&self.counters.reads);
        if self.faults().reads {
            return Err(GatewayError::unavailable("injected read failure"));
        }
        let map = self.collections.read().map_err(|_| poisoned())?;
        Ok(map.get(collection).cloned().unwrap_or_default())
    }

    async fn update_record(
        &self,
        collection: &str,
        id: &RecordId,
        patch: Fields,
    ) -> Result<(), GatewayError> {
        bump(&self.counters.updates);
        if self.faults().writes {
            return Err(GatewayError::write("injected write failure"));
        }

        {
            let mut map = self.collections.write().map_err(|_| poisoned())?;
            let record = map
                .get_mut(collection)
                .and_then(|records| records.iter_mut().find(|r| &r.id == id))
                .ok_or_else(|| GatewayError::not_found(collection, id.as_str()))?;
            record.fields.merge(&patch);
        }
        tracing::debug!(collection, %id, keys = patch.len(), "updated record");
        self.publish(collection);
        Ok(())
    }

    async fn delete_record(&self, collection: &str, id: &RecordId) -> Result<(), GatewayError> {
        bump(&self.counters.deletes);
        if self.faults().writes {
            return Err(GatewayError::write("injected write failure"));
        }

        {
            let mut map = self.collections.write().map_err(|_| poisoned())?;
            let records = map
                .get_mut(collection)
                .ok_or_else(|| GatewayError::not_found(collection, id.as_str()))?;
            let before = records.len();
            records.retain(|r| &r.id != id);
            if records.len() == before {
                return Err(GatewayError::not_found(collection, id.as_str()));
            }
        }
        tracing::debug!(collection, %id, "deleted record");
        self.publish(collection);
        Ok(())
    }

    async fn subscribe_to_collection(&self, collection: &str) -> Result<Subscription, GatewayError> {
        bump(&self.counters.subscribes);
        if self.faults().reads {
            return Err(GatewayError::unavailable("injected read failure"));
        }

        // Registering under the listeners lock means a concurrent write is
        // either in the initial snapshot or published to this listener.
        let (tx, sub) = Subscription::channel(collection);
        let mut listeners = self.listeners.lock().map_err(|_| poisoned())?;
        tx.send(Ok(self.records(collection)));
        listeners.entry(collection.to_string()).or_default().push(tx);
        drop(listeners);
        tracing::debug!(collection, "registered collection listener");
        Ok(sub)
    }
}

#[async_trait]
impl AuthGateway for InMemoryBackend {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        bump(&self.counters.authentications);
        if self.faults().auth {
            return Err(GatewayError::unavailable("injected auth failure"));
        }

        let account = {
            let accounts = self.accounts.read().map_err(|_| poisoned())?;
            accounts.get(email).cloned()
        };
        match account {
            Some(account) if account.password == password => {
                let issued_at = Utc::now();
                Ok(Session {
                    user_id: account.user_id,
                    email: email.to_string(),
                    id_token: Uuid::now_v7().to_string(),
                    issued_at,
                    expires_at: issued_at + self.session_ttl,
                })
            }
            _ => Err(GatewayError::auth("INVALID_LOGIN_CREDENTIALS")),
        }
    }
}

#[async_trait]
impl BlobStore for InMemoryBackend {
    async fn upload_binary(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, GatewayError> {
        bump(&self.counters.uploads);
        if self.faults().storage {
            return Err(GatewayError::storage("injected storage failure"));
        }
        if path.trim().is_empty() {
            return Err(GatewayError::storage("empty object path"));
        }

        self.blobs.write().map_err(|_| poisoned())?.insert(
            path.to_string(),
            Blob {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        Ok(format!("memory://{path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(title: &str) -> Fields {
        Fields::new().with("title", title).with("completed", false)
    }

    #[tokio::test]
    async fn create_assigns_unique_ids_in_insertion_order() {
        let backend = InMemoryBackend::new();
        let a = backend.create_record("todos", todo("a")).await.unwrap();
        let b = backend.create_record("todos", todo("b")).await.unwrap();
        assert_ne!(a, b);

        let records = backend.read_all_records("todos").await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(backend.calls().creates, 2);
        assert_eq!(backend.calls().reads, 1);
    }

    #[tokio::test]
    async fn update_merges_patch_keys_only() {
        let backend = InMemoryBackend::new();
        let id = backend.create_record("todos", todo("milk")).await.unwrap();

        backend
            .update_record("todos", &id, Fields::new().with("completed", true))
            .await
            .unwrap();

        let fields = &backend.records("todos")[0].fields;
        assert_eq!(fields.text("title").unwrap(), "milk");
        assert!(fields.bool("completed").unwrap());
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let backend = InMemoryBackend::new();
        let ghost = RecordId::parse("ghost").unwrap();

        let err = backend.delete_record("todos", &ghost).await.unwrap_err();
        assert_eq!(err, GatewayError::not_found("todos", "ghost"));

        backend.seed("todos", todo("x")).unwrap();
        let err = backend
            .update_record("todos", &ghost, todo("y"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
        assert_eq!(backend.records("todos").len(), 1);
    }

    #[tokio::test]
    async fn listeners_get_initial_and_post_mutation_snapshots() {
        let backend = InMemoryBackend::new();
        backend.seed("posts", Fields::new().with("content", "first")).unwrap();

        let mut sub = backend.subscribe_to_collection("posts").await.unwrap();
        assert_eq!(sub.next().await.unwrap().unwrap().len(), 1);

        backend
            .create_record("posts", Fields::new().with("content", "second"))
            .await
            .unwrap();
        assert_eq!(sub.next().await.unwrap().unwrap().len(), 2);
        assert_eq!(backend.live_listeners("posts"), 1);

        drop(sub);
        assert_eq!(backend.live_listeners("posts"), 0);
    }

    #[test]
    fn subscribing_during_writes_never_misses_one() {
        let backend = InMemoryBackend::new();
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

        let subs: Vec<_> = std::thread::scope(|s| {
            s.spawn(|| {
                for n in 0..200 {
                    backend.seed("posts", Fields::new().with("content", format!("p{n}"))).unwrap();
                }
            });
            (0..50)
                .map(|_| runtime.block_on(backend.subscribe_to_collection("posts")).unwrap())
                .collect()
        });

        for mut sub in subs {
            let mut last = None;
            while let Some(snapshot) = sub.try_next() {
                last = Some(snapshot.unwrap());
            }
            assert_eq!(last.unwrap().len(), 200);
        }
    }

    #[tokio::test]
    async fn faults_reject_without_touching_state() {
        let backend = InMemoryBackend::new();
        backend.set_faults(Faults { writes: true, ..Faults::default() });

        let err = backend.create_record("todos", todo("x")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Write(_)));
        assert!(backend.records("todos").is_empty());

        backend.set_faults(Faults { reads: true, ..Faults::default() });
        assert!(matches!(
            backend.read_all_records("todos").await,
            Err(GatewayError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn authenticate_checks_password() {
        let backend = InMemoryBackend::new().with_account("admin@example.com", "s3cret");

        let session = backend.authenticate("admin@example.com", "s3cret").await.unwrap();
        assert_eq!(session.email, "admin@example.com");
        assert!(session.expires_at > session.issued_at);

        let err = backend.authenticate("admin@example.com", "nope").await.unwrap_err();
        assert!(matches!(err, GatewayError::Auth(_)));
        assert_eq!(backend.calls().authentications, 2);
    }

    #[tokio::test]
    async fn upload_stores_bytes_and_returns_url() {
        let backend = InMemoryBackend::new();
        let url = backend
            .upload_binary("photos/cat.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();

        assert_eq!(url, "memory://photos/cat.png");
        assert_eq!(
            backend.blob("photos/cat.png"),
            Some(("image/png".to_string(), vec![1, 2, 3]))
        );
    }
}
