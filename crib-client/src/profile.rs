use chrono::Utc;
use crib_common::collections::USERS;
use crib_common::{encode, Patch, Profile, ProfileId, Url};
use tracing::{debug, info};

use crate::backend::{decode, Backend};
use crate::error::{ClientError, Result};
use crate::session::Session;

/// Self-edits from the profile screen. `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileEdit {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub age: Option<u32>,
}

impl ProfileEdit {
    pub fn to_patch(&self) -> Patch {
        Patch::new()
            .set_opt("name", self.name.clone())
            .set_opt("bio", self.bio.clone())
            .set_opt("age", self.age)
    }

    pub fn apply(&self, profile: &mut Profile) {
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(bio) = &self.bio {
            profile.bio = bio.clone();
        }
        if self.age.is_some() {
            profile.age = self.age;
        }
    }
}

/// Reads and writes profile documents on behalf of the signed-in user.
#[derive(Clone)]
pub struct ProfileStore<B> {
    backend: B,
    session: Session,
}

impl<B: Backend> ProfileStore<B> {
    pub fn new(backend: B, session: Session) -> Self {
        Self { backend, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn get(&self, id: &ProfileId) -> Result<Option<Profile>> {
        match self.backend.get(USERS, id.as_str()).await? {
            Some(snapshot) => Ok(Some(decode(&snapshot)?)),
            None => Ok(None),
        }
    }

    /// The signed-in user's own profile.
    pub async fn current(&self) -> Result<Profile> {
        let id = &self.session.user_id;
        self.get(id).await?.ok_or_else(|| {
            debug!(%id, "no profile document for session");
            ClientError::MissingProfile(id.clone())
        })
    }

    /// Writes a whole profile for the signed-in user, replacing any existing one.
    pub async fn put(&self, profile: &Profile) -> Result<()> {
        let fields = Patch::from(encode(profile)?);
        self.backend.set(USERS, self.session.user_id.as_str(), &fields).await?;
        Ok(())
    }

    pub async fn update(&self, edit: &ProfileEdit) -> Result<()> {
        let patch = edit.to_patch();
        if patch.is_empty() {
            return Ok(());
        }
        self.backend.update(USERS, self.session.user_id.as_str(), &patch).await?;
        Ok(())
    }

    pub async fn append_like(&self, target: &ProfileId) -> Result<()> {
        self.append("likes", target).await
    }

    pub async fn append_dislike(&self, target: &ProfileId) -> Result<()> {
        self.append("dislikes", target).await
    }

    async fn append(&self, field: &str, target: &ProfileId) -> Result<()> {
        let patch = Patch::new().union(field, [target.as_str()]);
        self.backend.update(USERS, self.session.user_id.as_str(), &patch).await?;
        debug!(%target, field, "recorded swipe");
        Ok(())
    }

    /// Uploads a photo and appends its URL to the profile's photo list.
    pub async fn add_photo(&self, bytes: Vec<u8>) -> Result<Url> {
        let path = format!(
            "profile_photos/{}/{}.jpg",
            self.session.user_id,
            Utc::now().timestamp_millis()
        );
        let url = self.backend.upload(&path, bytes, "image/jpeg").await?;
        let patch = Patch::new().union("photos", [url.0.as_str()]);
        self.backend.update(USERS, self.session.user_id.as_str(), &patch).await?;
        info!(%path, "uploaded profile photo");
        Ok(url)
    }
}
