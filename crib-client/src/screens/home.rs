use crib_common::Profile;

use super::{report, Alert, Alerts};
use crate::backend::Backend;
use crate::candidates::CandidateFetcher;
use crate::error::Result;
use crate::profile::ProfileStore;
use crate::scoring::rank;
use crate::session::Session;
use crate::swipe::{SwipeController, SwipeOutcome};

pub const NO_CANDIDATES_TEXT: &str = "No people found :(";

#[derive(Debug, PartialEq)]
pub enum HomeView<'a> {
    Card(&'a Profile),
    /// Terminal: the list is only fetched once per mount.
    NoCandidates,
}

/// Swipe deck. Candidates are fetched once when the screen mounts.
pub struct HomeScreen<B> {
    swipes: SwipeController<B>,
    pub alerts: Alerts,
}

impl<B: Backend> HomeScreen<B> {
    pub async fn mount(backend: B, session: Session) -> Self {
        let mut alerts = Alerts::default();
        let candidates = match load_candidates(&backend, &session).await {
            Ok(candidates) => candidates,
            Err(err) => {
                report(&mut alerts, &err, "fetching candidates", "Failed to fetch potential matches");
                Vec::new()
            }
        };
        Self {
            swipes: SwipeController::new(backend, session, candidates),
            alerts,
        }
    }

    pub fn view(&self) -> HomeView<'_> {
        match self.swipes.current() {
            Some(profile) => HomeView::Card(profile),
            None => HomeView::NoCandidates,
        }
    }

    /// Placeholder text once the deck is used up.
    pub fn empty_text(&self) -> Option<&'static str> {
        self.swipes.is_exhausted().then_some(NO_CANDIDATES_TEXT)
    }

    pub fn swipes(&self) -> &SwipeController<B> {
        &self.swipes
    }

    pub async fn like(&mut self) {
        let name = self.swipes.current().map(|p| p.name.clone()).unwrap_or_default();
        match self.swipes.like().await {
            Ok(SwipeOutcome::Matched(_)) => self.alerts.push(Alert::new(
                "It's a Match!",
                format!("You and {name} are cribbed up!"),
            )),
            Ok(_) => {}
            Err(err) => report(&mut self.alerts, &err, "handling like", "Failed to process like"),
        }
    }

    pub async fn dislike(&mut self) {
        if let Err(err) = self.swipes.dislike().await {
            report(&mut self.alerts, &err, "handling dislike", "Failed to process dislike");
        }
    }
}

async fn load_candidates<B: Backend>(backend: &B, session: &Session) -> Result<Vec<Profile>> {
    let me = ProfileStore::new(backend.clone(), session.clone()).current().await?;
    let found = CandidateFetcher::new(backend.clone()).fetch(&me).await?;
    Ok(rank(found, &me))
}
