//! Payloads exchanged with the backend's authentication endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::types::UserEmail;

/// Email/password pair posted to the credentials login endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct Credentials {
    pub email: UserEmail,
    pub password: String,
}

/// Token issued by an OAuth provider, exchanged for an application token.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderToken {
    pub provider: String,
    pub access_token: String,
}

/// Application-issued bearer token.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    #[serde(alias = "token")]
    pub access_token: String,
}
