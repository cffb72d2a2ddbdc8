//! Per-screen state, independent of any UI toolkit.
//!
//! A screen owns everything it loaded and drops it on unmount. Failures end
//! up in the screen's [`Alerts`] queue for the view layer to show; failed
//! preconditions are only logged.

mod chat;
mod home;
mod matches;
mod profile;
mod register;

pub use chat::ChatScreen;
pub use home::{HomeScreen, HomeView, NO_CANDIDATES_TEXT};
pub use matches::{ChatRoute, MatchesScreen, NO_MATCHES_TEXT};
pub use profile::ProfileScreen;
pub use register::RegisterScreen;

use tracing::{debug, error};

use crate::error::ClientError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Alerts(Vec<Alert>);

impl Alerts {
    pub fn push(&mut self, alert: Alert) {
        self.0.push(alert);
    }

    pub fn last(&self) -> Option<&Alert> {
        self.0.last()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Hands pending alerts to the view and clears the queue.
    pub fn take(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.0)
    }
}

/// Routes a failure: preconditions are dropped quietly, anything else is
/// logged and raised as an alert carrying `message`.
pub(crate) fn report(alerts: &mut Alerts, err: &ClientError, context: &str, message: &str) {
    if err.is_precondition() {
        debug!("{context}: skipped, {err}");
        return;
    }
    error!("{context}: {err}");
    alerts.push(Alert::new("Error", message));
}
