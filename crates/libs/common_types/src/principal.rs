use serde::{Deserialize, Serialize};

/// The authenticated user on whose behalf a submission runs.
///
/// Passed explicitly into every operation that needs it; nothing in this
/// workspace reads an ambient session singleton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub name: String,
}

impl Principal {
    #[must_use]
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
        }
    }
}
