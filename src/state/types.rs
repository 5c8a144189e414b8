//! Credential state types

use serde::{Deserialize, Serialize};

/// Application credentials and cached thermostat ids
///
/// Owned by the caller and handed to the API client by reference; the
/// runtime parser never sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppContext {
    /// Developer application key
    pub app_key: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Registered thermostat identifiers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thermostats: Vec<String>,
}

impl AppContext {
    /// Create a context with only an app key
    pub fn new(app_key: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            ..Self::default()
        }
    }

    /// Replace both tokens
    pub fn set_tokens(&mut self, access_token: impl Into<String>, refresh_token: impl Into<String>) {
        self.access_token = access_token.into();
        self.refresh_token = refresh_token.into();
    }

    /// Whether an access token has been obtained
    pub fn has_tokens(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }
}
