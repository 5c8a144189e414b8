//! ecobee API client
//!
//! Every response embeds a `status` object, sometimes alongside an HTTP
//! error status, so requests pass through the HTTP layer untouched and are
//! judged by that object instead.

use super::status::{ApiStatus, RequestStatus, ResponseCode};
use super::types::{
    RuntimeReportRequest, Selection, Thermostat, ThermostatRequest, ThermostatResponse,
};
use crate::auth::PinAuthenticator;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::runtime::{parse_runtime, RuntimeData};
use crate::state::{AppContext, CredentialStore};
use bytes::Bytes;
use chrono::NaiveDate;
use reqwest::Method;
use std::time::Duration;
use tracing::{debug, info, warn};

const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Authenticated access to the ecobee API
///
/// Tokens live in the caller's [`AppContext`]. When the vendor reports an
/// expired token the client refreshes it once, writes the new pair through
/// the [`CredentialStore`], and repeats the request.
pub struct EcobeeClient {
    http_client: HttpClient,
    authenticator: PinAuthenticator,
    store: CredentialStore,
}

impl EcobeeClient {
    /// Create a client for `base_url`.
    ///
    /// `api_timeout` applies to data requests, `auth_timeout` to token
    /// refreshes.
    pub fn new(
        base_url: &str,
        app_key: &str,
        api_timeout: Duration,
        auth_timeout: Duration,
        store: CredentialStore,
    ) -> Result<Self> {
        let config = HttpClientConfig::builder()
            .base_url(base_url)
            .timeout(api_timeout)
            .header("Content-Type", JSON_CONTENT_TYPE)
            .build();
        let http_client = HttpClient::with_config(config)?;
        let authenticator = PinAuthenticator::new(base_url, app_key, auth_timeout)?;
        Ok(Self::with_parts(http_client, authenticator, store))
    }

    /// Create a client from preconfigured parts
    pub fn with_parts(
        http_client: HttpClient,
        authenticator: PinAuthenticator,
        store: CredentialStore,
    ) -> Self {
        Self {
            http_client,
            authenticator,
            store,
        }
    }

    /// The store refreshed tokens are written to
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Refresh the tokens in `ctx` and persist them
    pub async fn refresh(&self, ctx: &mut AppContext) -> Result<()> {
        self.authenticator.refresh_context(ctx).await?;
        self.store.save(ctx).await?;
        info!("Access token refreshed");
        Ok(())
    }

    /// Issue an authenticated GET and check the embedded status.
    ///
    /// Status 14 triggers a single refresh and retry; any other non-zero
    /// status becomes [`Error::Api`].
    pub async fn fetch(
        &self,
        ctx: &mut AppContext,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Bytes> {
        let mut refreshed = false;

        loop {
            let mut config = RequestConfig::new()
                .bearer(&ctx.access_token)
                .passthrough_status();
            for (key, value) in query {
                config = config.query(*key, value);
            }

            let response = self.http_client.request(Method::GET, path, config).await?;
            let http_status = response.status();
            let body = response.bytes().await?;

            let envelope: RequestStatus = serde_json::from_slice(&body).map_err(|e| {
                Error::decode(format!(
                    "{path} returned HTTP {}: {e}",
                    http_status.as_u16()
                ))
            })?;

            // Without a status object only the HTTP status can vouch for the body
            let status = match envelope.status {
                Some(status) => status,
                None if http_status.is_success() => ApiStatus::default(),
                None => {
                    return Err(Error::http_status(
                        http_status.as_u16(),
                        String::from_utf8_lossy(&body),
                    ))
                }
            };

            match status.code {
                code if code.is_success() => {
                    debug!(path, bytes = body.len(), "ecobee request succeeded");
                    return Ok(body);
                }
                ResponseCode::TokenExpired if !refreshed => {
                    info!("Access token expired, refreshing");
                    self.refresh(ctx).await.map_err(|e| Error::TokenRefresh {
                        message: format!("access token expired. Got error when refreshing: {e}"),
                    })?;
                    refreshed = true;
                }
                code => return Err(Error::api(code, status.message)),
            }
        }
    }

    /// List the thermostats registered to the account
    pub async fn get_thermostats(&self, ctx: &mut AppContext) -> Result<Vec<Thermostat>> {
        let request = ThermostatRequest {
            selection: Selection::registered(),
        };
        let json = serde_json::to_string(&request)?;

        let body = self.fetch(ctx, "/1/thermostat", &[("json", json)]).await?;
        let response: ThermostatResponse = serde_json::from_slice(&body)
            .map_err(|e| Error::decode(format!("Invalid thermostat response: {e}")))?;

        Ok(response.thermostat_list)
    }

    /// Fill the thermostat id cache if it is empty
    pub async fn ensure_thermostats(&self, ctx: &mut AppContext) -> Result<()> {
        if !ctx.thermostats.is_empty() {
            return Ok(());
        }

        let thermostats = self.get_thermostats(ctx).await.map_err(|e| {
            Error::state(format!(
                "no saved thermostat IDs. Got error when fetching registered thermostats: {e}"
            ))
        })?;
        if thermostats.is_empty() {
            return Err(Error::state("no thermostats are registered to this account"));
        }

        ctx.thermostats = thermostats.into_iter().map(|t| t.identifier).collect();
        info!(count = ctx.thermostats.len(), "Cached registered thermostats");

        if let Err(e) = self.store.save(ctx).await {
            warn!("Failed to persist thermostat ids: {e}");
        }
        Ok(())
    }

    /// Fetch the raw runtime report for an inclusive date range
    pub async fn get_runtime_report(
        &self,
        ctx: &mut AppContext,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Bytes> {
        self.ensure_thermostats(ctx).await?;

        let request = RuntimeReportRequest::new(start, end, ctx.thermostats.as_slice());
        let body = serde_json::to_string(&request)?;
        debug!(%start, %end, thermostats = ctx.thermostats.len(), "Requesting runtime report");

        self.fetch(
            ctx,
            "/1/runtimeReport",
            &[("format", "json".to_string()), ("body", body)],
        )
        .await
    }

    /// Fetch and transform the runtime report for an inclusive date range
    pub async fn get_runtime_data(
        &self,
        ctx: &mut AppContext,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RuntimeData> {
        let body = self.get_runtime_report(ctx, start, end).await?;
        parse_runtime(&body)
    }
}

impl std::fmt::Debug for EcobeeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcobeeClient")
            .field("http_client", &self.http_client)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
