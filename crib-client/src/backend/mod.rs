//! Capabilities the app borrows from its hosted backend.
//!
//! The client never talks to a transport directly. Every screen goes through
//! these traits, which are implemented by [`MemoryBackend`] (in-process, used
//! by tests and offline runs) and [`HttpBackend`] (talks to `crib-server`).

mod http;
mod memory;

use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use crib_common::{Patch, Query, Snapshot, Url};
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;

pub use http::HttpBackend;
pub use memory::MemoryBackend;

use crate::error::BackendError;
use crate::session::Session;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Snapshot>, BackendError>;

    /// Replaces the document with `fields`, creating it if needed.
    async fn set(&self, collection: &str, id: &str, fields: &Patch) -> Result<(), BackendError>;

    /// Applies `patch` to an existing document. Fails with
    /// [`BackendError::NotFound`] when the document is absent.
    async fn update(&self, collection: &str, id: &str, patch: &Patch) -> Result<(), BackendError>;

    /// Creates a document under a fresh id and returns that id.
    async fn add(&self, collection: &str, fields: &Patch) -> Result<String, BackendError>;

    async fn query(&self, query: &Query) -> Result<Vec<Snapshot>, BackendError>;

    /// Live view of `query`. Nothing is fetched until the subscription is
    /// polled; each item is the complete result set.
    fn subscribe(&self, query: Query) -> Subscription;
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn create_account(&self, email: &str, password: &str) -> Result<Session, BackendError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `path` and returns a durable download URL.
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<Url, BackendError>;
}

/// Everything a screen needs, bundled so components take a single handle.
pub trait Backend: DocumentStore + AuthProvider + BlobStore + Clone + 'static {}

impl<T> Backend for T where T: DocumentStore + AuthProvider + BlobStore + Clone + 'static {}

pub type SnapshotResult = Result<Vec<Snapshot>, BackendError>;

/// Stream of full result sets for one query. Dropping it unsubscribes.
pub struct Subscription {
    inner: BoxStream<'static, SnapshotResult>,
}

impl Subscription {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = SnapshotResult> + Send + 'static,
    {
        Self { inner: stream.boxed() }
    }

    pub fn cancel(self) {}
}

impl Stream for Subscription {
    type Item = SnapshotResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

pub(crate) fn decode<T: DeserializeOwned>(snapshot: &Snapshot) -> Result<T, BackendError> {
    Ok(snapshot.decode()?)
}
