use crib_common::Profile;

use super::{report, Alert, Alerts};
use crate::backend::Backend;
use crate::profile::{ProfileEdit, ProfileStore};
use crate::registration::ValidationError;
use crate::session::Session;

pub struct ProfileScreen<B> {
    store: ProfileStore<B>,
    profile: Option<Profile>,
    editing: bool,
    loading: bool,
    pub name: String,
    pub bio: String,
    pub age: String,
    pub alerts: Alerts,
}

impl<B: Backend> ProfileScreen<B> {
    pub async fn mount(backend: B, session: Session) -> Self {
        let mut screen = Self {
            store: ProfileStore::new(backend, session),
            profile: None,
            editing: false,
            loading: false,
            name: String::new(),
            bio: String::new(),
            age: String::new(),
            alerts: Alerts::default(),
        };
        match screen.store.current().await {
            Ok(profile) => screen.load_fields(profile),
            Err(err) => report(&mut screen.alerts, &err, "fetching profile", "Failed to load profile"),
        }
        screen
    }

    fn load_fields(&mut self, profile: Profile) {
        self.name = profile.name.clone();
        self.bio = profile.bio.clone();
        self.age = profile.age.map(|age| age.to_string()).unwrap_or_default();
        self.profile = Some(profile);
    }

    /// `None` while the profile has not loaded.
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn begin_edit(&mut self) {
        if self.profile.is_some() {
            self.editing = true;
        }
    }

    pub async fn save(&mut self) {
        let age = match self.age.trim().parse::<u32>() {
            Ok(age) => age,
            Err(_) => {
                self.alerts.push(Alert::new("Error", ValidationError::InvalidAge.to_string()));
                return;
            }
        };
        let edit = ProfileEdit {
            name: Some(self.name.clone()),
            bio: Some(self.bio.clone()),
            age: Some(age),
        };
        match self.store.update(&edit).await {
            Ok(()) => {
                if let Some(profile) = self.profile.as_mut() {
                    edit.apply(profile);
                }
                self.editing = false;
                self.alerts.push(Alert::new("Success", "Profile updated successfully"));
            }
            Err(err) => report(&mut self.alerts, &err, "updating profile", "Failed to update profile"),
        }
    }

    pub async fn upload_photo(&mut self, bytes: Vec<u8>) {
        self.loading = true;
        match self.store.add_photo(bytes).await {
            Ok(url) => {
                if let Some(profile) = self.profile.as_mut() {
                    profile.photos.push(url);
                }
            }
            Err(err) => report(&mut self.alerts, &err, "uploading image", "Failed to upload image"),
        }
        self.loading = false;
    }
}
