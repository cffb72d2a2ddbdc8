use crib_common::Message;
use tracing::debug;

use super::{report, Alerts, ChatRoute};
use crate::backend::Backend;
use crate::chat::{Conversation, MessageFeed};
use crate::session::Session;

pub struct ChatScreen<B> {
    conversation: Conversation<B>,
    feed: MessageFeed,
    messages: Vec<Message>,
    session: Session,
    title: String,
    pub draft: String,
    pub alerts: Alerts,
}

impl<B: Backend> ChatScreen<B> {
    pub fn open(backend: B, session: Session, route: ChatRoute) -> Self {
        let conversation = Conversation::new(backend, session.clone(), route.match_id);
        let feed = conversation.subscribe();
        Self {
            conversation,
            feed,
            messages: Vec::new(),
            session,
            title: route.name,
            draft: String::new(),
            alerts: Alerts::default(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_mine(&self, message: &Message) -> bool {
        message.sender_id == self.session.user_id
    }

    /// Waits for the next thread snapshot and re-renders from it.
    /// Returns `false` once the feed has ended.
    pub async fn refresh(&mut self) -> bool {
        match self.feed.next().await {
            Some(Ok(messages)) => {
                self.messages = messages;
                true
            }
            Some(Err(err)) => {
                report(&mut self.alerts, &err, "message feed", "Failed to load messages");
                true
            }
            None => false,
        }
    }

    /// Sends the draft. The draft is cleared only when the send went through.
    pub async fn send(&mut self) {
        match self.conversation.send(&self.draft).await {
            Ok(Some(_)) => self.draft.clear(),
            Ok(None) => debug!("blank draft not sent"),
            Err(err) => report(&mut self.alerts, &err, "sending message", "Failed to send message"),
        }
    }

    /// Leaves the screen and stops the live feed.
    pub fn close(self) {
        self.feed.cancel();
    }
}
