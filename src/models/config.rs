//! Configuration model loaded from external sources.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub templates_dir: String,
    /// Signs session cookies and verifies the application token.
    pub secret: String,
    /// Root of the ticketing backend, e.g. `http://localhost:8080`.
    pub api_base_url: String,
    /// Token used for [`crate::client::SecurityMode::ServerSession`] calls.
    #[serde(default)]
    pub service_token: Option<String>,
    /// Identity providers offered on the sign-in page.
    #[serde(default)]
    pub oauth_providers: Vec<String>,
}
