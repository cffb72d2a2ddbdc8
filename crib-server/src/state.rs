use anyhow::Context;
use argon2::Argon2;
use chrono::Utc;
use crib_common::{Document, Patch, Query, Snapshot, Url};
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use serde::{Deserialize, Serialize};
use sled::{Db, Tree};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;

/// Identity returned by sign-up and sign-in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionBody {
    pub user_id: String,
    pub email: String,
}

#[derive(Serialize, Deserialize)]
struct Account {
    user_id: String,
    password_hash: String,
}

#[derive(Clone)]
pub struct State {
    db: Db,
    accounts: Tree,
    blobs: Tree,
    public_url: String,
}

impl State {
    pub fn new(db: Db, public_url: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            accounts: db.open_tree("accounts")?,
            blobs: db.open_tree("blobs")?,
            db,
            public_url: public_url.into(),
        })
    }

    fn collection(&self, name: &str) -> anyhow::Result<Tree> {
        let valid = !name.is_empty()
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidName(name.to_string()).into());
        }
        Ok(self.db.open_tree(format!("collection/{name}"))?)
    }

    pub fn document(&self, collection: &str, id: &str) -> anyhow::Result<Option<Snapshot>> {
        let Some(raw) = self.collection(collection)?.get(id)? else {
            return Ok(None);
        };
        let data: Document = serde_json::from_slice(&raw)
            .with_context(|| format!("corrupt document {collection}/{id}"))?;
        Ok(Some(Snapshot::new(id, data)))
    }

    pub fn set_document(&self, collection: &str, id: &str, fields: &Patch) -> anyhow::Result<()> {
        let doc = fields.into_document(Utc::now());
        self.collection(collection)?.insert(id, serde_json::to_vec(&doc)?)?;
        debug!(collection, id, "set document");
        Ok(())
    }

    /// Applies `patch` to an existing document. Concurrent patches to the same
    /// document are retried so array unions are never lost.
    pub fn update_document(&self, collection: &str, id: &str, patch: &Patch) -> anyhow::Result<()> {
        let tree = self.collection(collection)?;
        loop {
            let current = tree.get(id)?.ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
            let mut doc: Document = serde_json::from_slice(&current)
                .with_context(|| format!("corrupt document {collection}/{id}"))?;
            patch.apply(&mut doc, Utc::now());
            let next = serde_json::to_vec(&doc)?;
            if tree.compare_and_swap(id, Some(current), Some(next))?.is_ok() {
                debug!(collection, id, "updated document");
                return Ok(());
            }
            debug!(collection, id, "document changed underneath update, retrying");
        }
    }

    pub fn add_document(&self, collection: &str, fields: &Patch) -> anyhow::Result<String> {
        let id = Uuid::new_v4().simple().to_string();
        self.set_document(collection, &id, fields)?;
        Ok(id)
    }

    /// Runs `query` over the collection in key order.
    pub fn query(&self, query: &Query) -> anyhow::Result<Vec<Snapshot>> {
        let tree = self.collection(&query.collection)?;
        let mut docs = Vec::new();
        for entry in tree.iter() {
            let (key, raw) = entry?;
            let id = String::from_utf8(key.to_vec()).context("non utf-8 document id")?;
            let data: Document = serde_json::from_slice(&raw)
                .with_context(|| format!("corrupt document {}/{id}", query.collection))?;
            docs.push(Snapshot::new(id, data));
        }
        Ok(query.run(docs))
    }

    pub fn sign_up(&self, email: &str, password: &str) -> anyhow::Result<SessionBody> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("hashing password: {e}"))?
            .to_string();
        let account = Account {
            user_id: Uuid::new_v4().simple().to_string(),
            password_hash,
        };
        let inserted = self.accounts.compare_and_swap(
            email,
            None as Option<&[u8]>,
            Some(serde_json::to_vec(&account)?),
        )?;
        if inserted.is_err() {
            return Err(StoreError::EmailTaken(email.to_string()).into());
        }
        info!(user_id = %account.user_id, "account created");
        Ok(SessionBody {
            user_id: account.user_id,
            email: email.to_string(),
        })
    }

    pub fn sign_in(&self, email: &str, password: &str) -> anyhow::Result<SessionBody> {
        let raw = self.accounts.get(email)?.ok_or(StoreError::BadCredentials)?;
        let account: Account = serde_json::from_slice(&raw).context("corrupt account record")?;
        let verified = PasswordHash::new(&account.password_hash)
            .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
            .unwrap_or(false);
        if !verified {
            return Err(StoreError::BadCredentials.into());
        }
        Ok(SessionBody {
            user_id: account.user_id,
            email: email.to_string(),
        })
    }

    pub fn put_blob(&self, path: &str, bytes: &[u8]) -> anyhow::Result<Url> {
        self.blobs.insert(path, bytes)?;
        info!(path, size = bytes.len(), "stored blob");
        Ok(Url(format!("{}/blobs/{path}", self.public_url)))
    }

    pub fn blob(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        let raw = self.blobs.get(path)?.ok_or_else(|| StoreError::NotFound {
            collection: String::from("blobs"),
            id: path.to_string(),
        })?;
        Ok(raw.to_vec())
    }
}
