//! Typed views over channel lineup entries and filler items.
//!
//! Every entity retains the raw payload it was built from and extracts a
//! fixed set of fields at construction with get-with-default reads, so
//! construction never fails. The former class hierarchy (base media item,
//! media item, redirect, program) is flattened into field-group structs
//! composed into two concrete entities, [`Program`] and [`FillerItem`].

use anyhow::Result;
use serde_json::Value;

use crate::api::{ChannelHandle, FillerListHandle, SessionHandle};
use crate::error::require_linked;
use crate::raw;

/// Fields shared by every lineup entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseMediaFields {
    /// Entry type tag (`movie`, `episode`, `redirect`, ...).
    pub media_type: Option<String>,
    /// Whether the entry is offline filler.
    pub is_offline: Option<bool>,
    /// Runtime in milliseconds.
    pub duration: Option<i64>,
}

impl BaseMediaFields {
    pub(crate) fn from_value(data: &Value) -> Self {
        Self {
            media_type: raw::get_str(data, "type"),
            is_offline: raw::get_bool(data, "isOffline"),
            duration: raw::get_i64(data, "duration"),
        }
    }
}

/// Fields describing a plex-backed media item.
///
/// Mirrors the movie/episode program and filler item wire shapes; the icon
/// variants are only populated for episodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaFields {
    /// Display title.
    pub title: Option<String>,
    /// Plex metadata key.
    pub key: Option<String>,
    /// Plex rating key.
    pub rating_key: Option<String>,
    /// Identifier of the plex server the item lives on.
    pub server_key: Option<String>,
    /// Poster URL.
    pub icon: Option<String>,
    /// Summary text.
    pub summary: Option<String>,
    /// Release date (`YYYY-MM-DD`).
    pub date: Option<String>,
    /// Release year.
    pub year: Option<i64>,
    /// Plex-internal file locator.
    pub plex_file: Option<String>,
    /// Filesystem path of the media file.
    pub file: Option<String>,
    /// Title of the owning show.
    pub show_title: Option<String>,
    /// Episode number within the season.
    pub episode: Option<i64>,
    /// Season number.
    pub season: Option<i64>,
    /// Poster URL of the owning show.
    pub show_icon: Option<String>,
    /// Poster URL of the episode.
    pub episode_icon: Option<String>,
    /// Poster URL of the season.
    pub season_icon: Option<String>,
}

impl MediaFields {
    pub(crate) fn from_value(data: &Value) -> Self {
        Self {
            title: raw::get_str(data, "title"),
            key: raw::get_str(data, "key"),
            rating_key: raw::get_str(data, "ratingKey"),
            server_key: raw::get_str(data, "serverKey"),
            icon: raw::get_str(data, "icon"),
            summary: raw::get_str(data, "summary"),
            date: raw::get_str(data, "date"),
            year: raw::get_i64(data, "year"),
            plex_file: raw::get_str(data, "plexFile"),
            file: raw::get_str(data, "file"),
            show_title: raw::get_str(data, "showTitle"),
            episode: raw::get_i64(data, "episode"),
            season: raw::get_i64(data, "season"),
            show_icon: raw::get_str(data, "showIcon"),
            episode_icon: raw::get_str(data, "episodeIcon"),
            season_icon: raw::get_str(data, "seasonIcon"),
        }
    }
}

/// Fields carried by redirect lineup entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectFields {
    /// Number of the channel this entry redirects to.
    pub channel: Option<i64>,
}

impl RedirectFields {
    pub(crate) fn from_value(data: &Value) -> Self {
        Self {
            channel: raw::get_i64(data, "channel"),
        }
    }
}

/// A single entry in a channel's lineup.
///
/// Covers movie, episode, and redirect entries with one concrete type:
/// redirect entries (`type == "redirect"`) carry a target channel number
/// and empty media fields, everything else carries media fields and no
/// target channel.
#[derive(Debug, Clone)]
pub struct Program {
    data: Value,
    session: Option<SessionHandle>,
    channel: Option<ChannelHandle>,
    base: BaseMediaFields,
    media: MediaFields,
    redirect: RedirectFields,
    rating: Option<String>,
}

impl Program {
    /// Builds a typed view over a raw lineup entry.
    ///
    /// The handles are injected by the owning [`crate::Channel`] when the
    /// program comes from a fetched channel; a program built without them
    /// is a local, read-only view.
    #[must_use]
    pub fn new(
        data: Value,
        session: Option<SessionHandle>,
        channel: Option<ChannelHandle>,
    ) -> Self {
        let base = BaseMediaFields::from_value(&data);
        let media = MediaFields::from_value(&data);
        let redirect = RedirectFields::from_value(&data);
        let rating = raw::get_str(&data, "rating");
        Self {
            data,
            session,
            channel,
            base,
            media,
            redirect,
            rating,
        }
    }

    /// The raw payload this view was built from.
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }

    /// Shared base fields (`type`, `isOffline`, `duration`).
    #[must_use]
    pub const fn base(&self) -> &BaseMediaFields {
        &self.base
    }

    /// Media fields (empty for redirect entries).
    #[must_use]
    pub const fn media(&self) -> &MediaFields {
        &self.media
    }

    /// Redirect fields (empty for media entries).
    #[must_use]
    pub const fn redirect(&self) -> &RedirectFields {
        &self.redirect
    }

    /// Content rating (`PG-13`, `TV-MA`, ...).
    #[must_use]
    pub fn rating(&self) -> Option<&str> {
        self.rating.as_deref()
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.media.title.as_deref()
    }

    /// Whether this entry redirects to another channel.
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        self.base.media_type.as_deref() == Some("redirect")
    }

    /// Removes this program from its owning channel's lineup on the
    /// server. Forwards exactly one call to the owning channel and
    /// returns its result unchanged.
    ///
    /// # Errors
    ///
    /// [`crate::DizqueTvError::NotRemoteObject`] when the program was
    /// built without a session or owning-channel handle (the owner is
    /// never invoked); otherwise whatever the channel update returns.
    pub async fn delete(&self) -> Result<bool> {
        require_linked(self.session.as_ref(), "Program")?;
        let channel = require_linked(self.channel.as_ref(), "Program")?;
        channel.delete_program(self).await
    }
}

/// A single item in a filler list.
#[derive(Debug, Clone)]
pub struct FillerItem {
    data: Value,
    session: Option<SessionHandle>,
    filler_list: Option<FillerListHandle>,
    base: BaseMediaFields,
    media: MediaFields,
}

impl FillerItem {
    /// Builds a typed view over a raw filler entry.
    #[must_use]
    pub fn new(
        data: Value,
        session: Option<SessionHandle>,
        filler_list: Option<FillerListHandle>,
    ) -> Self {
        let base = BaseMediaFields::from_value(&data);
        let media = MediaFields::from_value(&data);
        Self {
            data,
            session,
            filler_list,
            base,
            media,
        }
    }

    /// The raw payload this view was built from.
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }

    /// Shared base fields (`type`, `isOffline`, `duration`).
    #[must_use]
    pub const fn base(&self) -> &BaseMediaFields {
        &self.base
    }

    /// Media fields.
    #[must_use]
    pub const fn media(&self) -> &MediaFields {
        &self.media
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.media.title.as_deref()
    }

    /// Removes this filler from its owning list's content on the server.
    /// Forwards exactly one call to the owning list and returns its
    /// result unchanged.
    ///
    /// # Errors
    ///
    /// [`crate::DizqueTvError::NotRemoteObject`] when the filler was
    /// built without a session or owning-list handle (the owner is never
    /// invoked); otherwise whatever the filler list update returns.
    pub async fn delete(&self) -> Result<bool> {
        require_linked(self.session.as_ref(), "FillerItem")?;
        let filler_list = require_linked(self.filler_list.as_ref(), "FillerItem")?;
        filler_list.delete_filler(self).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::DizqueTvError;
    use crate::api::{DizqueTvApi, FillerOwner, ProgramOwner};
    use crate::custom_show::CustomShowDetails;

    /// Session stand-in that records nothing; entities only check its
    /// presence before delegating to their owner.
    #[derive(Debug)]
    struct NullSession;

    #[async_trait]
    impl DizqueTvApi for NullSession {
        async fn get_custom_show_details(&self, _id: &str) -> Result<Option<CustomShowDetails>> {
            Ok(None)
        }
        async fn update_channel(&self, _channel: Value) -> Result<bool> {
            Ok(false)
        }
        async fn delete_channel(&self, _number: i64) -> Result<bool> {
            Ok(false)
        }
        async fn update_filler_list(&self, _id: &str, _filler_list: Value) -> Result<bool> {
            Ok(false)
        }
        async fn delete_filler_list(&self, _id: &str) -> Result<bool> {
            Ok(false)
        }
        async fn delete_plex_server(&self, _name: &str) -> Result<bool> {
            Ok(false)
        }
    }

    /// Counting owner that records the payload of the program it was
    /// asked to delete.
    #[derive(Debug)]
    struct CountingChannel {
        calls: AtomicUsize,
        last_payload: Mutex<Option<Value>>,
        result: bool,
    }

    impl CountingChannel {
        fn new(result: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_payload: Mutex::new(None),
                result,
            }
        }
    }

    #[async_trait]
    impl ProgramOwner for CountingChannel {
        async fn delete_program(&self, program: &Program) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_payload.lock().unwrap() = Some(program.data().clone());
            Ok(self.result)
        }
    }

    #[derive(Debug)]
    struct CountingFillerList {
        calls: AtomicUsize,
        result: bool,
    }

    #[async_trait]
    impl FillerOwner for CountingFillerList {
        async fn delete_filler(&self, _filler: &FillerItem) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.result)
        }
    }

    fn movie_payload() -> Value {
        json!({
            "title": "The Iron Giant",
            "key": "/library/metadata/1234",
            "ratingKey": "1234",
            "icon": "https://plex.example/icon.jpg",
            "type": "movie",
            "duration": 5_166_000,
            "summary": "A boy befriends a giant robot.",
            "rating": "PG",
            "date": "1999-08-06",
            "year": 1999,
            "plexFile": "/library/parts/1234/file.mkv",
            "file": "/media/movies/iron_giant.mkv",
            "showTitle": "The Iron Giant",
            "episode": 1,
            "season": 1,
            "serverKey": "abc123",
            "isOffline": false
        })
    }

    #[test]
    fn test_movie_payload_extracts_all_field_groups() {
        // Arrange & Act
        let program = Program::new(movie_payload(), None, None);

        // Assert
        assert_eq!(program.base().media_type.as_deref(), Some("movie"));
        assert_eq!(program.base().is_offline, Some(false));
        assert_eq!(program.base().duration, Some(5_166_000));
        assert_eq!(program.title(), Some("The Iron Giant"));
        assert_eq!(program.media().year, Some(1999));
        assert_eq!(program.media().rating_key.as_deref(), Some("1234"));
        assert_eq!(program.media().server_key.as_deref(), Some("abc123"));
        assert_eq!(program.rating(), Some("PG"));
        assert_eq!(program.redirect().channel, None);
        assert!(!program.is_redirect());
    }

    #[test]
    fn test_empty_payload_yields_all_none_never_fails() {
        // Arrange & Act
        let program = Program::new(json!({}), None, None);
        let filler = FillerItem::new(json!({}), None, None);

        // Assert
        assert_eq!(program.base(), &BaseMediaFields::default());
        assert_eq!(program.media(), &MediaFields::default());
        assert_eq!(program.redirect(), &RedirectFields::default());
        assert_eq!(program.rating(), None);
        assert_eq!(filler.title(), None);
        assert_eq!(filler.base().duration, None);
    }

    #[test]
    fn test_non_object_payload_yields_all_none() {
        // Arrange & Act
        let program = Program::new(json!("bogus"), None, None);

        // Assert
        assert_eq!(program.base(), &BaseMediaFields::default());
        assert_eq!(program.title(), None);
    }

    #[test]
    fn test_redirect_payload_parses_with_empty_media_fields() {
        // Arrange
        let data = json!({
            "isOffline": true,
            "type": "redirect",
            "duration": 60_000,
            "channel": 42
        });

        // Act
        let program = Program::new(data, None, None);

        // Assert
        assert!(program.is_redirect());
        assert_eq!(program.redirect().channel, Some(42));
        assert_eq!(program.media(), &MediaFields::default());
    }

    #[tokio::test]
    async fn test_delete_without_session_never_invokes_owner() {
        // Arrange
        let owner = Arc::new(CountingChannel::new(true));
        let program = Program::new(movie_payload(), None, Some(owner.clone()));

        // Act
        let err = program.delete().await.unwrap_err();

        // Assert
        let kind = err.downcast_ref::<DizqueTvError>().unwrap();
        assert!(matches!(
            kind,
            DizqueTvError::NotRemoteObject {
                object_type: "Program"
            }
        ));
        assert_eq!(owner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delete_without_owning_channel_fails_with_same_kind() {
        // Arrange
        let session: SessionHandle = Arc::new(NullSession);
        let program = Program::new(movie_payload(), Some(session), None);

        // Act
        let err = program.delete().await.unwrap_err();

        // Assert
        assert!(matches!(
            err.downcast_ref::<DizqueTvError>(),
            Some(DizqueTvError::NotRemoteObject {
                object_type: "Program"
            })
        ));
    }

    #[tokio::test]
    async fn test_delete_forwards_itself_once_and_returns_result_unchanged() {
        // Arrange
        let session: SessionHandle = Arc::new(NullSession);
        let owner = Arc::new(CountingChannel::new(true));
        let program = Program::new(movie_payload(), Some(session), Some(owner.clone()));

        // Act
        let deleted = program.delete().await.unwrap();

        // Assert
        assert!(deleted);
        assert_eq!(owner.calls.load(Ordering::SeqCst), 1);
        let seen = owner.last_payload.lock().unwrap().clone();
        assert_eq!(seen.as_ref(), Some(program.data()));
    }

    #[tokio::test]
    async fn test_delete_passes_false_result_through() {
        // Arrange
        let session: SessionHandle = Arc::new(NullSession);
        let owner = Arc::new(CountingChannel::new(false));
        let program = Program::new(movie_payload(), Some(session), Some(owner.clone()));

        // Act
        let deleted = program.delete().await.unwrap();

        // Assert
        assert!(!deleted);
        assert_eq!(owner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_filler_delete_requires_session_and_owner() {
        // Arrange
        let owner = Arc::new(CountingFillerList {
            calls: AtomicUsize::new(0),
            result: true,
        });
        let unlinked = FillerItem::new(json!({"title": "Bumper"}), None, Some(owner.clone()));

        // Act
        let err = unlinked.delete().await.unwrap_err();

        // Assert
        assert!(matches!(
            err.downcast_ref::<DizqueTvError>(),
            Some(DizqueTvError::NotRemoteObject {
                object_type: "FillerItem"
            })
        ));
        assert_eq!(owner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_filler_delete_delegates_to_owning_list() {
        // Arrange
        let session: SessionHandle = Arc::new(NullSession);
        let owner = Arc::new(CountingFillerList {
            calls: AtomicUsize::new(0),
            result: true,
        });
        let filler = FillerItem::new(
            json!({"title": "Bumper"}),
            Some(session),
            Some(owner.clone()),
        );

        // Act
        let deleted = filler.delete().await.unwrap();

        // Assert
        assert!(deleted);
        assert_eq!(owner.calls.load(Ordering::SeqCst), 1);
    }
}
