use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use crib_common::{Document, Patch, ProfileId, Query, Snapshot, Url};
use futures::stream;
use tokio::sync::{watch, Mutex};
use tracing::debug;
use uuid::Uuid;

use super::{AuthProvider, BlobStore, DocumentStore, Subscription};
use crate::error::BackendError;
use crate::session::Session;

/// In-process backend. Clones share the same data.
#[derive(Clone)]
pub struct MemoryBackend {
    inner: Arc<Inner>,
}

struct Inner {
    data: Mutex<Data>,
    changes: watch::Sender<u64>,
    offline: AtomicBool,
    queries: AtomicUsize,
}

#[derive(Default)]
struct Data {
    collections: HashMap<String, BTreeMap<String, Document>>,
    accounts: HashMap<String, Account>,
    blobs: HashMap<String, Vec<u8>>,
}

struct Account {
    password: String,
    user_id: ProfileId,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                data: Mutex::new(Data::default()),
                changes,
                offline: AtomicBool::new(false),
                queries: AtomicUsize::new(0),
            }),
        }
    }

    /// While offline every call fails with [`BackendError::Unreachable`].
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of `query` calls served so far, subscriptions included.
    pub fn query_count(&self) -> usize {
        self.inner.queries.load(Ordering::SeqCst)
    }

    pub async fn blob(&self, path: &str) -> Option<Vec<u8>> {
        self.inner.data.lock().await.blobs.get(path).cloned()
    }

    pub async fn document_count(&self, collection: &str) -> usize {
        self.inner
            .data
            .lock()
            .await
            .collections
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    fn check_online(&self) -> Result<(), BackendError> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(BackendError::Unreachable(String::from("memory backend is offline")));
        }
        Ok(())
    }

    fn notify(&self) {
        self.inner.changes.send_modify(|version| *version += 1);
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Snapshot>, BackendError> {
        self.check_online()?;
        let data = self.inner.data.lock().await;
        Ok(data
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|doc| Snapshot::new(id, doc.clone())))
    }

    async fn set(&self, collection: &str, id: &str, fields: &Patch) -> Result<(), BackendError> {
        self.check_online()?;
        {
            let mut data = self.inner.data.lock().await;
            data.collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), fields.into_document(Utc::now()));
        }
        self.notify();
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: &Patch) -> Result<(), BackendError> {
        self.check_online()?;
        {
            let mut data = self.inner.data.lock().await;
            let doc = data
                .collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| BackendError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                })?;
            patch.apply(doc, Utc::now());
        }
        self.notify();
        Ok(())
    }

    async fn add(&self, collection: &str, fields: &Patch) -> Result<String, BackendError> {
        let id = Uuid::new_v4().simple().to_string();
        self.set(collection, &id, fields).await?;
        Ok(id)
    }

    async fn query(&self, query: &Query) -> Result<Vec<Snapshot>, BackendError> {
        self.check_online()?;
        self.inner.queries.fetch_add(1, Ordering::SeqCst);
        let data = self.inner.data.lock().await;
        let docs = data
            .collections
            .get(&query.collection)
            .into_iter()
            .flat_map(|docs| docs.iter())
            .map(|(id, doc)| Snapshot::new(id.clone(), doc.clone()));
        Ok(query.run(docs))
    }

    fn subscribe(&self, query: Query) -> Subscription {
        let changes = self.inner.changes.subscribe();
        let state = (self.clone(), changes, query, true);
        Subscription::new(stream::unfold(
            state,
            |(backend, mut changes, query, first)| async move {
                if first {
                    let _ = changes.borrow_and_update();
                } else if changes.changed().await.is_err() {
                    return None;
                }
                let result = backend.query(&query).await;
                Some((result, (backend, changes, query, false)))
            },
        ))
    }
}

#[async_trait]
impl AuthProvider for MemoryBackend {
    async fn create_account(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        self.check_online()?;
        let mut data = self.inner.data.lock().await;
        if data.accounts.contains_key(email) {
            return Err(BackendError::Conflict(format!("{email} is already registered")));
        }
        let user_id = ProfileId(Uuid::new_v4().simple().to_string());
        data.accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user_id: user_id.clone(),
            },
        );
        debug!(%user_id, "created account");
        Ok(Session::new(user_id, email))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        self.check_online()?;
        let data = self.inner.data.lock().await;
        match data.accounts.get(email) {
            Some(account) if account.password == password => {
                Ok(Session::new(account.user_id.clone(), email))
            }
            _ => Err(BackendError::Unauthorized(String::from("wrong email or password"))),
        }
    }
}

#[async_trait]
impl BlobStore for MemoryBackend {
    async fn upload(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> Result<Url, BackendError> {
        self.check_online()?;
        self.inner.data.lock().await.blobs.insert(path.to_string(), bytes);
        Ok(Url(format!("memory://blobs/{path}")))
    }
}
