//! Channels: typed settings view plus the owning-collection capability
//! programs delegate their deletion to.
//!
//! A fetched [`Channel`] eagerly materializes its lineup as session-bound
//! [`Program`]s, each wired with a handle back to the channel. Channels
//! are immutable snapshots: remote mutations do not update an
//! already-built view, refetch for fresh state.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::api::{ChannelHandle, ProgramOwner, SessionHandle};
use crate::error::require_linked;
use crate::media::Program;
use crate::raw;

/// Typed view over the channel settings wire shape.
///
/// Built with an independent get-with-default read per field, so one
/// malformed value nulls only its own field. Also serves as the outgoing
/// payload when creating a channel: fields serialize under their wire
/// names and unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSettings {
    /// Channel number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<i64>,
    /// Channel name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Lineup anchor time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Total lineup runtime in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    /// Channel icon URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Overlay icon width in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_width: Option<i64>,
    /// Overlay icon display duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_duration: Option<i64>,
    /// Overlay icon position (`"2"` is bottom-right).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_position: Option<String>,
    /// Whether the icon is overlaid on the stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_icon: Option<bool>,
    /// Whether the icon overlay is suppressed during fillers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_filler_overlay: Option<bool>,
    /// Minimum seconds between repeats of a filler.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filler_repeat_cooldown: Option<i64>,
    /// Picture shown while the channel is offline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline_picture: Option<String>,
    /// Soundtrack played while the channel is offline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline_soundtrack: Option<String>,
    /// Offline behavior (`"pic"` or `"clip"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline_mode: Option<String>,
    /// Server-assigned document ID.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ChannelSettings {
    pub(crate) fn from_value(data: &Value) -> Self {
        Self {
            number: raw::get_i64(data, "number"),
            name: raw::get_str(data, "name"),
            start_time: raw::get_datetime(data, "startTime"),
            duration: raw::get_i64(data, "duration"),
            icon: raw::get_str(data, "icon"),
            icon_width: raw::get_i64(data, "iconWidth"),
            icon_duration: raw::get_i64(data, "iconDuration"),
            icon_position: raw::get_str(data, "iconPosition"),
            overlay_icon: raw::get_bool(data, "overlayIcon"),
            disable_filler_overlay: raw::get_bool(data, "disableFillerOverlay"),
            filler_repeat_cooldown: raw::get_i64(data, "fillerRepeatCooldown"),
            offline_picture: raw::get_str(data, "offlinePicture"),
            offline_soundtrack: raw::get_str(data, "offlineSoundtrack"),
            offline_mode: raw::get_str(data, "offlineMode"),
            id: raw::get_str(data, "_id"),
        }
    }
}

/// A dizqueTV channel: settings view plus its materialized lineup.
#[derive(Debug, Clone)]
pub struct Channel {
    inner: Arc<ChannelInner>,
    settings: ChannelSettings,
    programs: Vec<Program>,
}

/// Shared state behind the [`ChannelHandle`] given to each program.
#[derive(Debug)]
struct ChannelInner {
    data: Value,
    session: Option<SessionHandle>,
}

impl Channel {
    /// Builds a typed view over a raw channel payload.
    ///
    /// Each entry of the raw `programs` array becomes a [`Program`] wired
    /// with the session and a handle back to this channel, so it can
    /// delete itself remotely.
    #[must_use]
    pub fn new(data: Value, session: Option<SessionHandle>) -> Self {
        let settings = ChannelSettings::from_value(&data);
        let inner = Arc::new(ChannelInner { data, session });
        let owner: ChannelHandle = inner.clone();
        let programs = raw::get_array(&inner.data, "programs")
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| {
                        Program::new(entry.clone(), inner.session.clone(), Some(owner.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            inner,
            settings,
            programs,
        }
    }

    /// The raw payload this view was built from.
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.inner.data
    }

    /// Typed settings view.
    #[must_use]
    pub const fn settings(&self) -> &ChannelSettings {
        &self.settings
    }

    /// Channel number.
    #[must_use]
    pub const fn number(&self) -> Option<i64> {
        self.settings.number
    }

    /// Channel name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.settings.name.as_deref()
    }

    /// The channel's lineup in broadcast order.
    #[must_use]
    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    /// Removes the given program from this channel's lineup on the
    /// server. Equivalent to [`Program::delete`] on a program from this
    /// channel.
    ///
    /// # Errors
    ///
    /// [`crate::DizqueTvError::NotRemoteObject`] when the channel was
    /// built without a session; otherwise whatever the channel update
    /// returns.
    pub async fn delete_program(&self, program: &Program) -> Result<bool> {
        self.inner.delete_program(program).await
    }

    /// Removes this channel from the server.
    ///
    /// # Errors
    ///
    /// [`crate::DizqueTvError::NotRemoteObject`] when the channel was
    /// built without a session; an error when the payload carries no
    /// channel number; otherwise whatever the deletion returns.
    pub async fn delete(&self) -> Result<bool> {
        let session = require_linked(self.inner.session.as_ref(), "Channel")?;
        let number = self
            .settings
            .number
            .context("channel payload has no number")?;
        session.delete_channel(number).await
    }
}

#[async_trait]
impl ProgramOwner for ChannelInner {
    /// Removes the first lineup entry matching the program's payload,
    /// recomputes the total duration, and submits the updated channel
    /// through the session.
    async fn delete_program(&self, program: &Program) -> Result<bool> {
        let session = require_linked(self.session.as_ref(), "Channel")?;

        // Lineups repeat programs; drop only the first matching entry.
        let mut remaining: Vec<Value> = raw::get_array(&self.data, "programs")
            .cloned()
            .unwrap_or_default();
        if let Some(position) = remaining.iter().position(|entry| entry == program.data()) {
            remaining.remove(position);
        }
        // Settings invariant: a channel's duration is its lineup total.
        let duration = remaining
            .iter()
            .filter_map(|entry| raw::get_i64(entry, "duration"))
            .fold(0_i64, i64::saturating_add);

        let mut updated = self.data.clone();
        if let Some(object) = updated.as_object_mut() {
            object.insert(String::from("programs"), Value::Array(remaining));
            object.insert(String::from("duration"), Value::from(duration));
        }
        session.update_channel(updated).await
    }
}
