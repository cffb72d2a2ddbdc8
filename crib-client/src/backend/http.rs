use std::time::Duration;

use async_trait::async_trait;
use crib_common::{Patch, Query, Snapshot, Url};
use futures::stream;
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{AuthProvider, BlobStore, DocumentStore, Subscription};
use crate::config::{ClientConfig, MIN_POLL_INTERVAL};
use crate::error::BackendError;
use crate::session::Session;

/// Backend reached over HTTP, served by `crib-server`.
#[derive(Clone)]
pub struct HttpBackend {
    http: HttpClient,
    base_url: String,
    poll_interval: Duration,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct Created {
    id: String,
}

#[derive(Deserialize)]
struct Uploaded {
    url: Url,
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Unreachable(err.to_string())
    }
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            http: HttpClient::new(),
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            poll_interval: config.poll_interval.max(MIN_POLL_INTERVAL),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        self.url(&format!("/collections/{collection}/{id}"))
    }

    async fn check(resp: Response, what: &str) -> Result<Response, BackendError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => {
                let (collection, id) = what.split_once('/').unwrap_or((what, ""));
                BackendError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                }
            }
            StatusCode::CONFLICT => BackendError::Conflict(body),
            StatusCode::UNAUTHORIZED => BackendError::Unauthorized(body),
            _ => BackendError::Storage(format!("HTTP {status}: {body}")),
        })
    }
}

#[async_trait]
impl DocumentStore for HttpBackend {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Snapshot>, BackendError> {
        let resp = self.http.get(self.document_url(collection, id)).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::check(resp, &format!("{collection}/{id}")).await?;
        Ok(Some(resp.json().await?))
    }

    async fn set(&self, collection: &str, id: &str, fields: &Patch) -> Result<(), BackendError> {
        let resp = self
            .http
            .put(self.document_url(collection, id))
            .json(fields)
            .send()
            .await?;
        Self::check(resp, &format!("{collection}/{id}")).await?;
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: &Patch) -> Result<(), BackendError> {
        let resp = self
            .http
            .patch(self.document_url(collection, id))
            .json(patch)
            .send()
            .await?;
        Self::check(resp, &format!("{collection}/{id}")).await?;
        Ok(())
    }

    async fn add(&self, collection: &str, fields: &Patch) -> Result<String, BackendError> {
        let resp = self
            .http
            .post(self.url(&format!("/collections/{collection}")))
            .json(fields)
            .send()
            .await?;
        let created: Created = Self::check(resp, collection).await?.json().await?;
        Ok(created.id)
    }

    async fn query(&self, query: &Query) -> Result<Vec<Snapshot>, BackendError> {
        let resp = self.http.post(self.url("/query")).json(query).send().await?;
        Ok(Self::check(resp, &query.collection).await?.json().await?)
    }

    /// Polls the query and yields whenever the result set differs from the
    /// last one delivered. Failures are yielded too and polling goes on.
    fn subscribe(&self, query: Query) -> Subscription {
        let state = (self.clone(), query, None::<Vec<Snapshot>>, false);
        Subscription::new(stream::unfold(
            state,
            |(backend, query, mut last, mut started)| async move {
                loop {
                    if started {
                        tokio::time::sleep(backend.poll_interval).await;
                    }
                    started = true;
                    match backend.query(&query).await {
                        Ok(snapshots) if last.as_ref() == Some(&snapshots) => continue,
                        Ok(snapshots) => {
                            debug!(collection = %query.collection, hits = snapshots.len(), "subscription update");
                            last = Some(snapshots.clone());
                            return Some((Ok(snapshots), (backend, query, last, started)));
                        }
                        Err(err) => {
                            warn!("subscription poll failed: {err}");
                            return Some((Err(err), (backend, query, last, started)));
                        }
                    }
                }
            },
        ))
    }
}

#[async_trait]
impl AuthProvider for HttpBackend {
    async fn create_account(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let resp = self
            .http
            .post(self.url("/auth/signup"))
            .json(&Credentials { email, password })
            .send()
            .await?;
        Ok(Self::check(resp, "accounts").await?.json().await?)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let resp = self
            .http
            .post(self.url("/auth/signin"))
            .json(&Credentials { email, password })
            .send()
            .await?;
        Ok(Self::check(resp, "accounts").await?.json().await?)
    }
}

#[async_trait]
impl BlobStore for HttpBackend {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<Url, BackendError> {
        let resp = self
            .http
            .put(self.url(&format!("/blobs/{path}")))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        let uploaded: Uploaded = Self::check(resp, "blobs").await?.json().await?;
        Ok(uploaded.url)
    }
}
