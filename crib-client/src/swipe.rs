use chrono::Utc;
use crib_common::collections::MATCHES;
use crib_common::{encode, Match, MatchId, Patch, Profile, ProfileId};
use tracing::{debug, info};

use crate::backend::{decode, Backend};
use crate::error::Result;
use crate::profile::ProfileStore;
use crate::session::Session;

#[derive(Clone, Debug, PartialEq)]
pub enum SwipeOutcome {
    /// Cursor was already past the last candidate; nothing happened.
    Exhausted,
    Liked,
    /// The candidate had already liked us back.
    Matched(Match),
    Disliked,
}

/// Walks a ranked candidate list one swipe at a time.
///
/// The cursor only moves after the swipe has been persisted, so a failed
/// write leaves the same candidate on screen.
pub struct SwipeController<B> {
    profiles: ProfileStore<B>,
    backend: B,
    candidates: Vec<Profile>,
    cursor: usize,
}

impl<B: Backend> SwipeController<B> {
    pub fn new(backend: B, session: Session, candidates: Vec<Profile>) -> Self {
        Self {
            profiles: ProfileStore::new(backend.clone(), session),
            backend,
            candidates,
            cursor: 0,
        }
    }

    pub fn current(&self) -> Option<&Profile> {
        self.candidates.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn candidates(&self) -> &[Profile] {
        &self.candidates
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.candidates.len()
    }

    pub async fn like(&mut self) -> Result<SwipeOutcome> {
        let Some(target) = self.current().map(|p| p.id.clone()) else {
            debug!("like with no candidate left");
            return Ok(SwipeOutcome::Exhausted);
        };
        self.profiles.append_like(&target).await?;

        let liked_back = self
            .profiles
            .get(&target)
            .await?
            .map_or(false, |fresh| fresh.likes(&self.profiles.session().user_id));
        let outcome = if liked_back {
            SwipeOutcome::Matched(self.create_match(&target).await?)
        } else {
            SwipeOutcome::Liked
        };

        self.cursor += 1;
        Ok(outcome)
    }

    pub async fn dislike(&mut self) -> Result<SwipeOutcome> {
        let Some(target) = self.current().map(|p| p.id.clone()) else {
            debug!("dislike with no candidate left");
            return Ok(SwipeOutcome::Exhausted);
        };
        self.profiles.append_dislike(&target).await?;
        self.cursor += 1;
        Ok(SwipeOutcome::Disliked)
    }

    /// Writes the match record unless one already exists for the pair.
    async fn create_match(&self, other: &ProfileId) -> Result<Match> {
        let me = &self.profiles.session().user_id;
        let id = MatchId::for_pair(me, other);
        if let Some(existing) = self.backend.get(MATCHES, id.as_str()).await? {
            debug!(match_id = %id.as_str(), "match already recorded");
            return Ok(decode(&existing)?);
        }
        let record = Match::new(me, other, Utc::now());
        self.backend
            .set(MATCHES, id.as_str(), &Patch::from(encode(&record)?))
            .await?;
        info!(match_id = %id.as_str(), "new match");
        Ok(record)
    }
}
