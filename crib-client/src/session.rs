use crib_common::ProfileId;
use serde::{Deserialize, Serialize};

/// The signed-in identity. Handed to each component when it is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: ProfileId,
    pub email: String,
}

impl Session {
    pub fn new(user_id: ProfileId, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
        }
    }
}
