//! `DizqueTvClient` - HTTP-backed dizqueTV session implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;
use url::Url;

use crate::api::{DizqueTvApi, SessionHandle};
use crate::channel::{Channel, ChannelSettings};
use crate::custom_show::{CustomShow, CustomShowDetails};
use crate::filler::FillerList;
use crate::plex::{PlexServer, PlexServerSettings};

/// Default User-Agent sent with every request.
const DEFAULT_USER_AGENT: &str = concat!("dizquetv-rs/", env!("CARGO_PKG_VERSION"));

/// Response from `api/version`.
#[derive(Debug, Deserialize)]
struct VersionResponse {
    /// Server version string.
    version: String,
}

/// dizqueTV API client.
///
/// Cheap to clone; entities fetched through it hold a [`SessionHandle`]
/// back to the same shared state, so they can issue follow-up calls.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct DizqueTvClient {
    inner: Arc<ClientInner>,
}

/// Shared state behind the client and every [`SessionHandle`] it hands out.
#[derive(Debug)]
struct ClientInner {
    /// HTTP client.
    http_client: Client,
    /// Base URL of the dizqueTV server, always slash-terminated.
    base_url: Url,
}

/// Builder for `DizqueTvClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct DizqueTvClientBuilder {
    server_url: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl DizqueTvClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            server_url: None,
            user_agent: None,
            timeout: None,
        }
    }

    /// Sets the dizqueTV server URL (required), e.g.
    /// `http://dizquetv.local:8000`.
    #[must_use]
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Overrides the User-Agent (default: `dizquetv-rs/<version>`).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets a request timeout (default: none).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `server_url` is not set or does not parse.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<DizqueTvClient> {
        let server_url = self.server_url.context("server_url is required")?;

        // `Url::join` drops the last path segment unless the base ends
        // with a slash.
        let normalized = if server_url.ends_with('/') {
            server_url
        } else {
            format!("{server_url}/")
        };
        let base_url = Url::parse(&normalized)
            .with_context(|| format!("invalid server URL: {normalized}"))?;

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| String::from(DEFAULT_USER_AGENT));

        let mut builder = Client::builder().user_agent(&user_agent).gzip(true);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().context("failed to build HTTP client")?;

        Ok(DizqueTvClient {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
            }),
        })
    }
}

impl ClientInner {
    /// Sends a GET request and decodes the JSON response.
    #[instrument(skip_all)]
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("failed to join URL path: {path}"))?;

        tracing::debug!(url = %url, "dizqueTV API request");

        let result = self.http_client.get(url).send().await;
        let response = result.with_context(|| format!("request failed: {path}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to read body>"));
            bail!("dizqueTV API error (HTTP {status}): {body}");
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read response body: {path}"))?;
        let raw_result: std::result::Result<T, _> = serde_json::from_str(&body);
        raw_result.with_context(|| format!("failed to decode JSON response: {path}"))
    }

    /// Like [`Self::get_json`], but maps HTTP 404 to `None`.
    #[instrument(skip_all)]
    async fn get_json_opt(&self, path: &str) -> Result<Option<Value>> {
        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("failed to join URL path: {path}"))?;

        tracing::debug!(url = %url, "dizqueTV API request");

        let result = self.http_client.get(url).send().await;
        let response = result.with_context(|| format!("request failed: {path}"))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to read body>"));
            bail!("dizqueTV API error (HTTP {status}): {body}");
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read response body: {path}"))?;
        let raw_result: std::result::Result<Value, _> = serde_json::from_str(&body);
        let parsed =
            raw_result.with_context(|| format!("failed to decode JSON response: {path}"))?;
        Ok(Some(parsed))
    }

    /// Sends a write request (PUT/POST/DELETE) with an optional JSON body.
    ///
    /// Maps the response to the server's boolean success contract:
    /// 2xx is `Ok(true)`, any other status is `Ok(false)` (warn-logged);
    /// only transport failures are errors.
    #[instrument(skip_all, fields(method = %method, path = path))]
    async fn send_write(&self, method: Method, path: &str, body: Option<Value>) -> Result<bool> {
        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("failed to join URL path: {path}"))?;

        tracing::debug!(url = %url, "dizqueTV API write");

        let mut request = self.http_client.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let result = request.send().await;
        let response = result.with_context(|| format!("request failed: {path}"))?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<failed to read body>"));
        tracing::warn!(status = %status, body = %body, "dizqueTV API write rejected");
        Ok(false)
    }
}

impl DizqueTvClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> DizqueTvClientBuilder {
        DizqueTvClientBuilder::new()
    }

    /// The session handle injected into fetched entities.
    #[must_use]
    pub fn as_session(&self) -> SessionHandle {
        self.inner.clone()
    }

    /// Fetches the dizqueTV server version.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    #[instrument(skip_all)]
    pub async fn get_version(&self) -> Result<String> {
        let response: VersionResponse = self.inner.get_json("api/version").await?;
        Ok(response.version)
    }

    /// Fetches all channels, each bound to this session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    #[instrument(skip_all)]
    pub async fn get_channels(&self) -> Result<Vec<Channel>> {
        let values: Vec<Value> = self.inner.get_json("api/channels").await?;
        Ok(values
            .into_iter()
            .map(|value| Channel::new(value, Some(self.as_session())))
            .collect())
    }

    /// Fetches one channel by number, bound to this session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    #[instrument(skip_all)]
    pub async fn get_channel(&self, number: i64) -> Result<Channel> {
        let path = format!("api/channel/{number}");
        let value: Value = self.inner.get_json(&path).await?;
        Ok(Channel::new(value, Some(self.as_session())))
    }

    /// Fetches the numbers of all configured channels.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    #[instrument(skip_all)]
    pub async fn get_channel_numbers(&self) -> Result<Vec<i64>> {
        self.inner.get_json("api/channelNumbers").await
    }

    /// Creates a channel from the given settings.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the HTTP request fails.
    #[instrument(skip_all)]
    pub async fn add_channel(&self, settings: &ChannelSettings) -> Result<bool> {
        let body = serde_json::to_value(settings).context("failed to serialize channel")?;
        self.inner
            .send_write(Method::PUT, "api/channel", Some(body))
            .await
    }

    /// Replaces a channel's stored payload on the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    #[instrument(skip_all)]
    pub async fn update_channel(&self, channel: Value) -> Result<bool> {
        self.inner.update_channel(channel).await
    }

    /// Removes the channel with the given number.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    #[instrument(skip_all)]
    pub async fn delete_channel(&self, number: i64) -> Result<bool> {
        self.inner.delete_channel(number).await
    }

    /// Fetches all filler lists, each bound to this session.
    ///
    /// The listing omits each list's content; fetch a list individually
    /// with [`Self::get_filler_list`] for its items.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    #[instrument(skip_all)]
    pub async fn get_filler_lists(&self) -> Result<Vec<FillerList>> {
        let values: Vec<Value> = self.inner.get_json("api/fillers").await?;
        Ok(values
            .into_iter()
            .map(|value| FillerList::new(value, Some(self.as_session())))
            .collect())
    }

    /// Fetches one filler list by ID, bound to this session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    #[instrument(skip_all)]
    pub async fn get_filler_list(&self, filler_list_id: &str) -> Result<FillerList> {
        let path = format!("api/filler/{filler_list_id}");
        let value: Value = self.inner.get_json(&path).await?;
        Ok(FillerList::new(value, Some(self.as_session())))
    }

    /// Replaces a filler list's stored payload on the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    #[instrument(skip_all)]
    pub async fn update_filler_list(&self, filler_list_id: &str, filler_list: Value) -> Result<bool> {
        self.inner
            .update_filler_list(filler_list_id, filler_list)
            .await
    }

    /// Removes the filler list with the given ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    #[instrument(skip_all)]
    pub async fn delete_filler_list(&self, filler_list_id: &str) -> Result<bool> {
        self.inner.delete_filler_list(filler_list_id).await
    }

    /// Fetches all custom shows, each bound to this session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    #[instrument(skip_all)]
    pub async fn get_custom_shows(&self) -> Result<Vec<CustomShow>> {
        let values: Vec<Value> = self.inner.get_json("api/shows").await?;
        Ok(values
            .into_iter()
            .map(|value| CustomShow::new(value, Some(self.as_session())))
            .collect())
    }

    /// Fetches a custom show's details, or `None` when the server has no
    /// show with this ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    #[instrument(skip_all)]
    pub async fn get_custom_show_details(
        &self,
        custom_show_id: &str,
    ) -> Result<Option<CustomShowDetails>> {
        self.inner.get_custom_show_details(custom_show_id).await
    }

    /// Fetches all registered plex servers, each bound to this session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    #[instrument(skip_all)]
    pub async fn get_plex_servers(&self) -> Result<Vec<PlexServer>> {
        let values: Vec<Value> = self.inner.get_json("api/plex-servers").await?;
        Ok(values
            .into_iter()
            .map(|value| PlexServer::new(value, Some(self.as_session())))
            .collect())
    }

    /// Registers a plex server from the given settings.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the HTTP request fails.
    #[instrument(skip_all)]
    pub async fn add_plex_server(&self, settings: &PlexServerSettings) -> Result<bool> {
        let body = serde_json::to_value(settings).context("failed to serialize plex server")?;
        self.inner
            .send_write(Method::PUT, "api/plex-servers", Some(body))
            .await
    }

    /// Removes the plex server with the given name.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    #[instrument(skip_all)]
    pub async fn delete_plex_server(&self, name: &str) -> Result<bool> {
        self.inner.delete_plex_server(name).await
    }
}

#[async_trait]
impl DizqueTvApi for ClientInner {
    #[instrument(skip_all)]
    async fn get_custom_show_details(
        &self,
        custom_show_id: &str,
    ) -> Result<Option<CustomShowDetails>> {
        let path = format!("api/show/{custom_show_id}");
        let value = self.get_json_opt(&path).await?;
        Ok(value.map(CustomShowDetails::new))
    }

    #[instrument(skip_all)]
    async fn update_channel(&self, channel: Value) -> Result<bool> {
        self.send_write(Method::POST, "api/channel", Some(channel))
            .await
    }

    #[instrument(skip_all)]
    async fn delete_channel(&self, number: i64) -> Result<bool> {
        self.send_write(Method::DELETE, "api/channel", Some(json!({ "number": number })))
            .await
    }

    #[instrument(skip_all)]
    async fn update_filler_list(&self, filler_list_id: &str, filler_list: Value) -> Result<bool> {
        let path = format!("api/filler/{filler_list_id}");
        self.send_write(Method::POST, &path, Some(filler_list))
            .await
    }

    #[instrument(skip_all)]
    async fn delete_filler_list(&self, filler_list_id: &str) -> Result<bool> {
        let path = format!("api/filler/{filler_list_id}");
        self.send_write(Method::DELETE, &path, None).await
    }

    #[instrument(skip_all)]
    async fn delete_plex_server(&self, name: &str) -> Result<bool> {
        self.send_write(Method::DELETE, "api/plex-servers", Some(json!({ "name": name })))
            .await
    }
}
