use crib_common::MatchId;

use super::{report, Alerts};
use crate::backend::Backend;
use crate::chat::{MatchList, MatchSummary};
use crate::session::Session;

pub const NO_MATCHES_TEXT: &str = "Keep swiping to find your match!";

/// In-process navigation parameters for opening a chat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatRoute {
    pub match_id: MatchId,
    pub name: String,
}

pub struct MatchesScreen {
    entries: Vec<MatchSummary>,
    pub alerts: Alerts,
}

impl MatchesScreen {
    pub async fn mount<B: Backend>(backend: B, session: Session) -> Self {
        let mut alerts = Alerts::default();
        let entries = match MatchList::new(backend, session).load().await {
            Ok(entries) => entries,
            Err(err) => {
                report(&mut alerts, &err, "fetching matches", "Failed to fetch matches");
                Vec::new()
            }
        };
        Self { entries, alerts }
    }

    pub fn entries(&self) -> &[MatchSummary] {
        &self.entries
    }

    /// Placeholder text when there is nothing to list.
    pub fn empty_text(&self) -> Option<&'static str> {
        self.entries.is_empty().then_some(NO_MATCHES_TEXT)
    }

    pub fn open(&self, index: usize) -> Option<ChatRoute> {
        self.entries.get(index).map(|entry| ChatRoute {
            match_id: entry.record.id.clone(),
            name: entry.display_name().to_string(),
        })
    }
}
