//! PIN authenticator
//!
//! Drives the three ecobee token endpoints: PIN creation, exchange of the
//! authorization code for tokens, and refresh.

use super::types::{refresh_error, PinResponse, TokenResponse};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::state::AppContext;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

const PIN_GRANT: &str = "ecobeePin";
const SCOPE: &str = "smartWrite";

/// Obtains and refreshes ecobee tokens for one application key
pub struct PinAuthenticator {
    app_key: String,
    http_client: HttpClient,
}

impl PinAuthenticator {
    /// Create an authenticator talking to `base_url`
    pub fn new(base_url: &str, app_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let config = HttpClientConfig::builder()
            .base_url(base_url)
            .timeout(timeout)
            .build();
        Ok(Self::with_client(app_key, HttpClient::with_config(config)?))
    }

    /// Create an authenticator with a preconfigured HTTP client
    pub fn with_client(app_key: impl Into<String>, http_client: HttpClient) -> Self {
        Self {
            app_key: app_key.into(),
            http_client,
        }
    }

    /// The application key tokens are requested for
    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    /// Request a new PIN for the user to enter in the ecobee portal
    pub async fn request_pin(&self) -> Result<PinResponse> {
        let config = RequestConfig::new()
            .query("response_type", PIN_GRANT)
            .query("client_id", &self.app_key)
            .query("scope", SCOPE);

        let pin: PinResponse = self.call(Method::GET, "/authorize", config).await?;
        let pin = pin.validated()?;
        info!(expires_in = pin.expires_in, "Obtained ecobee PIN");
        Ok(pin)
    }

    /// Exchange the authorization code behind an accepted PIN for tokens
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let config = RequestConfig::new()
            .query("grant_type", PIN_GRANT)
            .query("client_id", &self.app_key)
            .query("code", code)
            .retries(0);

        let token: TokenResponse = self.call(Method::POST, "/token", config).await?;
        token.validated(|m| {
            Error::auth(format!("unable to fetch tokens from ecobee: {m}"))
        })
    }

    /// Trade a refresh token for a new token pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        let config = RequestConfig::new()
            .query("grant_type", "refresh_token")
            .query("refresh_token", refresh_token)
            .query("client_id", &self.app_key)
            .retries(0);

        // Refresh tokens rotate on use; a repeated POST would present a spent one
        let token: TokenResponse = self.call(Method::POST, "/token", config).await?;
        let token = token.validated(refresh_error)?;
        debug!(expires_in = token.expires_in, "Refreshed access token");
        Ok(token)
    }

    /// Refresh `ctx` in place using its stored refresh token
    pub async fn refresh_context(&self, ctx: &mut AppContext) -> Result<()> {
        if ctx.refresh_token.is_empty() {
            return Err(refresh_error(
                "no refresh token stored, run the pin flow first".to_string(),
            ));
        }
        let token = self.refresh(&ctx.refresh_token).await?;
        ctx.set_tokens(token.access_token, token.refresh_token);
        Ok(())
    }

    /// Error bodies carry the OAuth error triple, so every status is read
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<T> {
        let body = self
            .http_client
            .request_bytes(method, path, config.passthrough_status())
            .await?;
        serde_json::from_slice(&body).map_err(|e| {
            Error::auth(format!(
                "unexpected response from {path}: {e}: {}",
                String::from_utf8_lossy(&body)
            ))
        })
    }
}

impl std::fmt::Debug for PinAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinAuthenticator")
            .field("http_client", &self.http_client)
            .finish_non_exhaustive()
    }
}
