use crib_common::collections::{MATCHES, MESSAGES};
use crib_common::{Match, MatchId, Message, Patch, Profile, ProfileId, Query};
use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, warn};

use crate::backend::{decode, Backend, Subscription};
use crate::error::{BackendError, ClientError, Result};
use crate::profile::ProfileStore;
use crate::session::Session;

/// A match plus whatever we could resolve about the other participant.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchSummary {
    pub record: Match,
    pub other_id: ProfileId,
    pub other: Option<Profile>,
}

impl MatchSummary {
    pub fn display_name(&self) -> &str {
        match &self.other {
            Some(profile) if !profile.name.is_empty() => &profile.name,
            _ => "Unknown User",
        }
    }

    pub fn preview(&self) -> &str {
        self.record
            .last_message
            .as_ref()
            .map_or("Start a conversation!", |m| m.text.as_str())
    }
}

pub struct MatchList<B> {
    backend: B,
    profiles: ProfileStore<B>,
}

impl<B: Backend> MatchList<B> {
    pub fn new(backend: B, session: Session) -> Self {
        Self {
            profiles: ProfileStore::new(backend.clone(), session),
            backend,
        }
    }

    /// Every match the signed-in user takes part in.
    pub async fn load(&self) -> Result<Vec<MatchSummary>> {
        let me = &self.profiles.session().user_id;
        let query = Query::collection(MATCHES).where_contains("users", me.as_str());
        let mut summaries = Vec::new();
        for snapshot in self.backend.query(&query).await? {
            let record: Match = match decode(&snapshot) {
                Ok(record) => record,
                Err(err) => {
                    warn!(id = %snapshot.id, "skipping unreadable match: {err}");
                    continue;
                }
            };
            let Some(other_id) = record.other(me).cloned() else {
                continue;
            };
            let other = self.profiles.get(&other_id).await?;
            summaries.push(MatchSummary {
                record,
                other_id,
                other,
            });
        }
        Ok(summaries)
    }
}

/// Message thread of one match.
#[derive(Clone)]
pub struct Conversation<B> {
    backend: B,
    session: Session,
    match_id: MatchId,
}

impl<B: Backend> Conversation<B> {
    pub fn new(backend: B, session: Session, match_id: MatchId) -> Self {
        Self {
            backend,
            session,
            match_id,
        }
    }

    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }

    fn query(&self) -> Query {
        Query::collection(MESSAGES)
            .where_eq("matchId", self.match_id.as_str())
            .ordered_by("createdAt")
    }

    /// Live, oldest-first message list. Each item is the whole thread.
    pub fn subscribe(&self) -> MessageFeed {
        MessageFeed::new(self.backend.subscribe(self.query()))
    }

    /// Posts `draft` after trimming it. Blank drafts are ignored.
    pub async fn send(&self, draft: &str) -> Result<Option<Message>> {
        let text = draft.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let fields = Patch::new()
            .set("matchId", self.match_id.as_str())
            .set("senderId", self.session.user_id.as_str())
            .set("text", text)
            .server_timestamp("createdAt")
            .set("read", false);
        let id = self.backend.add(MESSAGES, &fields).await?;

        let stored = self
            .backend
            .get(MESSAGES, &id)
            .await?
            .ok_or_else(|| BackendError::NotFound {
                collection: MESSAGES.to_string(),
                id: id.clone(),
            })?;
        let message: Message = decode(&stored)?;
        debug!(match_id = %self.match_id.as_str(), message_id = %id, "sent message");

        // The message is already stored; only the preview goes stale.
        if let Err(err) = self.cache_last_message(&message).await {
            warn!(match_id = %self.match_id.as_str(), "last message not cached: {err}");
        }
        Ok(Some(message))
    }

    async fn cache_last_message(&self, message: &Message) -> Result<()> {
        let patch = Patch::new().set_serialized("lastMessage", message)?;
        self.backend.update(MATCHES, self.match_id.as_str(), &patch).await?;
        Ok(())
    }
}

/// Typed view over a message subscription. Dropping it unsubscribes.
pub struct MessageFeed {
    inner: BoxStream<'static, Result<Vec<Message>>>,
}

impl MessageFeed {
    fn new(subscription: Subscription) -> Self {
        let inner = subscription
            .map(|batch| -> Result<Vec<Message>> {
                batch?
                    .iter()
                    .map(|snapshot| decode(snapshot).map_err(ClientError::from))
                    .collect()
            })
            .boxed();
        Self { inner }
    }

    /// Next full snapshot; `None` once the feed has ended.
    pub async fn next(&mut self) -> Option<Result<Vec<Message>>> {
        self.inner.next().await
    }

    pub fn cancel(self) {}
}
