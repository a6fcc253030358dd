//! Plex server settings registered with dizqueTV.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::api::SessionHandle;
use crate::error::require_linked;
use crate::raw;

/// Typed view over the plex server settings wire shape.
///
/// Built with an independent get-with-default read per field, so one
/// malformed value nulls only its own field. Also serves as the outgoing
/// payload when registering a server: fields serialize under their wire
/// names and unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlexServerSettings {
    /// Server display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Server base URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Plex access token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Ordering index among registered servers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    /// Whether channel changes are pushed back to plex.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ar_channels: Option<bool>,
    /// Whether guide changes are pushed back to plex.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ar_guide: Option<bool>,
    /// Server-assigned document ID.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl PlexServerSettings {
    pub(crate) fn from_value(data: &Value) -> Self {
        Self {
            name: raw::get_str(data, "name"),
            uri: raw::get_str(data, "uri"),
            access_token: raw::get_str(data, "accessToken"),
            index: raw::get_i64(data, "index"),
            ar_channels: raw::get_bool(data, "arChannels"),
            ar_guide: raw::get_bool(data, "arGuide"),
            id: raw::get_str(data, "_id"),
        }
    }
}

/// A plex server registered with the dizqueTV instance.
#[derive(Debug, Clone)]
pub struct PlexServer {
    data: Value,
    session: Option<SessionHandle>,
    settings: PlexServerSettings,
}

impl PlexServer {
    /// Builds a typed view over a raw plex server payload.
    #[must_use]
    pub fn new(data: Value, session: Option<SessionHandle>) -> Self {
        let settings = PlexServerSettings::from_value(&data);
        Self {
            data,
            session,
            settings,
        }
    }

    /// The raw payload this view was built from.
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }

    /// Typed settings view.
    #[must_use]
    pub const fn settings(&self) -> &PlexServerSettings {
        &self.settings
    }

    /// Server display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.settings.name.as_deref()
    }

    /// Removes this plex server from the dizqueTV instance.
    ///
    /// # Errors
    ///
    /// [`crate::DizqueTvError::NotRemoteObject`] when the server view was
    /// built without a session; an error when the payload carries no
    /// name; otherwise whatever the deletion returns.
    pub async fn delete(&self) -> Result<bool> {
        let session = require_linked(self.session.as_ref(), "PlexServer")?;
        let name = self
            .settings
            .name
            .as_deref()
            .context("plex server payload has no name")?;
        session.delete_plex_server(name).await
    }
}
