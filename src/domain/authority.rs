use serde::{Deserialize, Serialize};

use crate::domain::types::AuthorityName;

/// Named permission bundle assignable to users.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Authority {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Resource/action permissions granted by the authority, e.g. `Tickets:Read`.
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Payload used to create or replace an authority.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewAuthority {
    pub name: AuthorityName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewAuthority {
    #[must_use]
    pub fn new(name: AuthorityName, description: Option<String>) -> Self {
        Self {
            name,
            description: description
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}
