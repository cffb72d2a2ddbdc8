//! Three-step sign-up: basic info, lifestyle, contact.
//!
//! Each step is validated before the next one opens; nothing is written to
//! the backend until the last step passes. The profile document is then
//! built from present fields only.

use crib_common::catalog::is_known_avatar;
use crib_common::collections::USERS;
use crib_common::{Patch, Socials};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::backend::Backend;
use crate::error::Result;
use crate::session::Session;

pub const MIN_SEARCH_RADIUS: u32 = 5;
pub const MAX_SEARCH_RADIUS: u32 = 50;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all required fields")]
    MissingRequired,

    #[error("Password must be at least {0} characters long")]
    PasswordTooShort(usize),

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please use a {0} email address")]
    WrongSchool(String),

    #[error("Please enter a valid graduation year")]
    InvalidGradYear,

    #[error("Please write a bio")]
    MissingBio,

    #[error("Please provide a contact email")]
    MissingContactEmail,

    #[error("Please enter a valid age")]
    InvalidAge,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationPolicy {
    /// Suffix every sign-up email must carry, e.g. `@stanford.edu`.
    pub email_domain: String,
    pub school_name: String,
    pub min_password_len: usize,
}

impl Default for RegistrationPolicy {
    fn default() -> Self {
        Self {
            email_domain: String::from("@stanford.edu"),
            school_name: String::from("Stanford"),
            min_password_len: 6,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Basic,
    Lifestyle,
    Contact,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagKind {
    Lifestyle,
    Professional,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub name: String,
    pub internship_city: String,
    pub internship_company: String,
    pub university: String,
    pub grad_year: String,
    pub search_radius: u32,
    pub looking_for_roommate: bool,
    pub avatar: Option<String>,
    pub lifestyle_tags: Vec<String>,
    pub professional_tags: Vec<String>,
    pub bio: String,
    pub instagram: String,
    pub linkedin: String,
    pub contact_email: String,
    pub opted_into_ig: bool,
    pub ig_caption: String,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            name: String::new(),
            internship_city: String::new(),
            internship_company: String::new(),
            university: String::new(),
            grad_year: String::new(),
            search_radius: 10,
            looking_for_roommate: true,
            avatar: None,
            lifestyle_tags: Vec::new(),
            professional_tags: Vec::new(),
            bio: String::new(),
            instagram: String::new(),
            linkedin: String::new(),
            contact_email: String::new(),
            opted_into_ig: false,
            ig_caption: String::new(),
        }
    }
}

fn present(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl RegistrationForm {
    pub fn toggle_tag(&mut self, kind: TagKind, tag: &str) {
        let tags = match kind {
            TagKind::Lifestyle => &mut self.lifestyle_tags,
            TagKind::Professional => &mut self.professional_tags,
        };
        if let Some(pos) = tags.iter().position(|t| t == tag) {
            tags.remove(pos);
        } else {
            tags.push(tag.to_string());
        }
    }

    pub fn set_search_radius(&mut self, miles: u32) {
        self.search_radius = miles.clamp(MIN_SEARCH_RADIUS, MAX_SEARCH_RADIUS);
    }

    /// Unknown avatar ids are ignored.
    pub fn select_avatar(&mut self, id: &str) {
        if is_known_avatar(id) {
            self.avatar = Some(id.to_string());
        }
    }

    pub fn validate(&self, step: Step, policy: &RegistrationPolicy) -> std::result::Result<(), ValidationError> {
        match step {
            Step::Basic => {
                let required = [
                    &self.email,
                    &self.password,
                    &self.name,
                    &self.internship_city,
                    &self.internship_company,
                    &self.university,
                    &self.grad_year,
                ];
                if required.iter().any(|field| field.is_empty()) {
                    return Err(ValidationError::MissingRequired);
                }
                if self.password.chars().count() < policy.min_password_len {
                    return Err(ValidationError::PasswordTooShort(policy.min_password_len));
                }
                if !self.email.contains('@') {
                    return Err(ValidationError::InvalidEmail);
                }
                if !self.email.ends_with(&policy.email_domain) {
                    return Err(ValidationError::WrongSchool(policy.school_name.clone()));
                }
                self.parsed_grad_year()?;
                Ok(())
            }
            Step::Lifestyle if self.bio.is_empty() => Err(ValidationError::MissingBio),
            Step::Contact if self.contact_email.is_empty() => Err(ValidationError::MissingContactEmail),
            Step::Lifestyle | Step::Contact => Ok(()),
        }
    }

    fn parsed_grad_year(&self) -> std::result::Result<u16, ValidationError> {
        self.grad_year
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidGradYear)
    }

    /// Profile document fields. Blank optional inputs are left out.
    pub fn to_patch(&self) -> Result<Patch> {
        let socials = Socials {
            instagram: present(&self.instagram),
            linkedin: present(&self.linkedin),
            email: self.contact_email.clone(),
        };
        let patch = Patch::new()
            .set("name", self.name.as_str())
            .set("email", self.email.as_str())
            .set("internshipCity", self.internship_city.as_str())
            .set("searchRadius", self.search_radius)
            .set("internshipCompany", self.internship_company.as_str())
            .set("school", self.university.as_str())
            .set("gradYear", self.parsed_grad_year()?)
            .set("lookingForRoommate", self.looking_for_roommate)
            .set("lifestyleTags", self.lifestyle_tags.clone())
            .set("professionalTags", self.professional_tags.clone())
            .set("bio", self.bio.as_str())
            .set_serialized("socials", &socials)?
            .set("optedIntoIG", self.opted_into_ig)
            .set_opt("igCaption", present(&self.ig_caption))
            .set_opt("avatar", self.avatar.as_ref().map(|id| json!({ "avatarId": id })))
            .server_timestamp("lastActive");
        Ok(patch)
    }
}

pub enum Advance {
    Next(Step),
    /// All steps passed; call [`Registration::submit`].
    Ready,
}

pub struct Registration {
    pub form: RegistrationForm,
    step: Step,
    policy: RegistrationPolicy,
}

impl Registration {
    pub fn new(policy: RegistrationPolicy) -> Self {
        Self {
            form: RegistrationForm::default(),
            step: Step::Basic,
            policy,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// Validates the current step and moves to the next one.
    pub fn advance(&mut self) -> std::result::Result<Advance, ValidationError> {
        self.form.validate(self.step, &self.policy)?;
        let next = match self.step {
            Step::Basic => Step::Lifestyle,
            Step::Lifestyle => Step::Contact,
            Step::Contact => return Ok(Advance::Ready),
        };
        self.step = next;
        Ok(Advance::Next(next))
    }

    pub fn back(&mut self) {
        self.step = match self.step {
            Step::Basic | Step::Lifestyle => Step::Basic,
            Step::Contact => Step::Lifestyle,
        };
    }

    /// Creates the account, then writes the profile document.
    pub async fn submit<B: Backend>(&self, backend: &B) -> Result<Session> {
        for step in [Step::Basic, Step::Lifestyle, Step::Contact] {
            self.form.validate(step, &self.policy)?;
        }
        let fields = self.form.to_patch()?;
        let session = backend
            .create_account(&self.form.email, &self.form.password)
            .await?;
        if let Err(err) = backend.set(USERS, session.user_id.as_str(), &fields).await {
            warn!(user_id = %session.user_id, email = %session.email, "account created without a profile: {err}");
            return Err(err.into());
        }
        info!(user_id = %session.user_id, "registered");
        Ok(session)
    }
}
