//! Endpoint configuration.
//!
//! Holds the bot token and the API origin. Built once and never mutated; the
//! token is not validated here, a bad token surfaces as a remote 401.

use std::fmt;
use std::time::Duration;

/// Public Bot API origin.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Timeout applied to every call unless the client overrides it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    token: String,
    api_url: String,
}

impl EndpointConfig {
    /// Configuration for the public API origin.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Point the client at another origin, such as a local Bot API server or
    /// a mock. A trailing slash is dropped.
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Full URL for a Bot API method: `<api_url>/bot<token>/<operation>`.
    ///
    /// `operation` is a fixed method name and is not escaped.
    pub fn method_url(&self, operation: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, operation)
    }
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("token", &mask_token(&self.token))
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Masks a bot token for logs: keeps the numeric bot id before `:` and the
/// last 4 characters. Tokens without that shape become `***`.
pub fn mask_token(token: &str) -> String {
    match token.split_once(':') {
        Some((bot_id, secret)) if secret.len() > 8 => match secret.get(secret.len() - 4..) {
            Some(tail) => format!("{bot_id}:***{tail}"),
            None => "***".to_string(),
        },
        _ => "***".to_string(),
    }
}
