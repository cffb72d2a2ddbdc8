use crib_common::collections::USERS;
use crib_common::{Profile, Query};
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::error::{ClientError, Result};
use crate::scoring::shares_any_tag;

/// Loads the people a user may swipe on: same internship city, looking for
/// a roommate, not yet swiped, sharing at least one tag.
#[derive(Clone)]
pub struct CandidateFetcher<B> {
    backend: B,
}

impl<B: Backend> CandidateFetcher<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Candidates in the order the store returned them.
    pub async fn fetch(&self, me: &Profile) -> Result<Vec<Profile>> {
        let city = me.internship_city.trim();
        if city.is_empty() {
            return Err(ClientError::MissingCity);
        }
        let query = Query::collection(USERS)
            .where_eq("internshipCity", city)
            .where_eq("lookingForRoommate", true);
        let snapshots = self.backend.query(&query).await?;
        let total = snapshots.len();

        let mut candidates = Vec::new();
        for snapshot in snapshots {
            let profile: Profile = match snapshot.decode() {
                Ok(profile) => profile,
                Err(err) => {
                    warn!(id = %snapshot.id, "skipping unreadable profile: {err}");
                    continue;
                }
            };
            if is_candidate(&profile, me) {
                candidates.push(profile);
            }
        }
        debug!(city, total, kept = candidates.len(), "fetched candidates");
        Ok(candidates)
    }
}

pub fn is_candidate(profile: &Profile, me: &Profile) -> bool {
    if profile.id == me.id || me.has_swiped(&profile.id) {
        return false;
    }
    // Same account under another id.
    if !me.email.is_empty() && profile.email == me.email {
        return false;
    }
    shares_any_tag(profile, me)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crib_common::ProfileId;

    fn profile(id: &str, email: &str, lifestyle: &[&str]) -> Profile {
        Profile {
            id: ProfileId(id.to_string()),
            email: email.to_string(),
            lifestyle_tags: lifestyle.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn excludes_self_and_swiped() {
        let mut me = profile("me", "me@stanford.edu", &["Gamer"]);
        me.likes.push(ProfileId("liked".into()));
        me.dislikes.push(ProfileId("disliked".into()));

        assert!(!is_candidate(&profile("me", "x@stanford.edu", &["Gamer"]), &me));
        assert!(!is_candidate(&profile("liked", "l@stanford.edu", &["Gamer"]), &me));
        assert!(!is_candidate(&profile("disliked", "d@stanford.edu", &["Gamer"]), &me));
        assert!(is_candidate(&profile("fresh", "f@stanford.edu", &["Gamer"]), &me));
    }

    #[test]
    fn excludes_same_email() {
        let me = profile("me", "me@stanford.edu", &["Gamer"]);
        assert!(!is_candidate(&profile("other", "me@stanford.edu", &["Gamer"]), &me));
    }

    #[test]
    fn requires_a_shared_tag() {
        let me = profile("me", "me@stanford.edu", &["Gamer"]);
        assert!(!is_candidate(&profile("c", "c@stanford.edu", &["Foodie"]), &me));
    }
}
