use tracing::warn;

use super::{Alert, Alerts};
use crate::backend::Backend;
use crate::registration::{Advance, Registration, RegistrationPolicy, Step};
use crate::session::Session;

pub struct RegisterScreen {
    pub registration: Registration,
    pub alerts: Alerts,
}

impl RegisterScreen {
    pub fn new(policy: RegistrationPolicy) -> Self {
        Self {
            registration: Registration::new(policy),
            alerts: Alerts::default(),
        }
    }

    pub fn step(&self) -> Step {
        self.registration.step()
    }

    /// "Next" button. On the last step this submits and returns the session
    /// of the new account.
    pub async fn next<B: Backend>(&mut self, backend: &B) -> Option<Session> {
        match self.registration.advance() {
            Ok(Advance::Next(_)) => None,
            Ok(Advance::Ready) => match self.registration.submit(backend).await {
                Ok(session) => Some(session),
                Err(err) => {
                    warn!("registration failed: {err}");
                    self.alerts.push(Alert::new("Error", err.to_string()));
                    None
                }
            },
            Err(invalid) => {
                self.alerts.push(Alert::new("Error", invalid.to_string()));
                None
            }
        }
    }
}
