//! Wire types for the ecobee PIN grant
//!
//! Both the authorize and token endpoints answer with either the success
//! shape or an OAuth-style error triple, so every field defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Response from `GET /authorize?response_type=ecobeePin`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinResponse {
    /// PIN the user enters in the ecobee portal
    #[serde(rename = "ecobeePin")]
    pub pin: String,
    /// Authorization code exchanged for tokens once the PIN is accepted
    pub code: String,
    /// Granted scope
    pub scope: String,
    /// Minutes until the PIN expires
    pub expires_in: i64,
    /// Minimum polling interval in seconds
    pub interval: i64,
    #[serde(flatten)]
    pub error: AuthError,
}

impl PinResponse {
    /// Fail if the vendor returned an error or no PIN
    pub fn validated(self) -> Result<Self> {
        self.error.check(|m| Error::auth(m))?;
        if self.pin.is_empty() || self.code.is_empty() {
            return Err(Error::auth("ecobee returned an empty PIN or code"));
        }
        Ok(self)
    }
}

/// Response from `POST /token`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
    pub refresh_token: String,
    pub scope: String,
    #[serde(flatten)]
    pub error: AuthError,
}

impl TokenResponse {
    /// Fail on a vendor error or when either token is missing.
    ///
    /// `wrap` picks the error variant so the same check serves the code
    /// exchange ([`Error::auth`]) and refresh ([`Error::TokenRefresh`]).
    pub fn validated(self, wrap: fn(String) -> Error) -> Result<Self> {
        self.error.check(wrap)?;
        if self.access_token.is_empty() || self.refresh_token.is_empty() {
            return Err(wrap("empty tokens in response".to_string()));
        }
        Ok(self)
    }
}

/// OAuth-style error triple
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthError {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error_description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error_uri: String,
}

impl AuthError {
    /// Whether the vendor reported an error
    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }

    fn check(&self, wrap: fn(String) -> Error) -> Result<()> {
        if self.is_error() {
            return Err(wrap(format!("{}: {}", self.error, self.error_description)));
        }
        Ok(())
    }
}

/// Build an [`Error::TokenRefresh`]
pub(crate) fn refresh_error(message: String) -> Error {
    Error::TokenRefresh { message }
}
