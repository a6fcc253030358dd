//! Custom shows and their lazily materialized content.
//!
//! A [`CustomShow`] is the summary the server lists under `api/shows`;
//! its [`CustomShowDetails`] (the actual program list) is fetched through
//! the session on first access and memoized. The details themselves
//! derive their [`CustomShowItem`] sequence lazily from the raw `content`
//! array, also memoized. Both caches are explicit compute-once cells, so
//! derived state is computed at most once per instance and immutable
//! thereafter.

use std::sync::OnceLock;

use anyhow::Result;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::api::SessionHandle;
use crate::error::require_linked;
use crate::media::{BaseMediaFields, MediaFields, RedirectFields};
use crate::raw;

/// A single program inside a custom show, with its position in the show.
#[derive(Debug, Clone)]
pub struct CustomShowItem {
    data: Value,
    order: usize,
    base: BaseMediaFields,
    media: MediaFields,
    redirect: RedirectFields,
    rating: Option<String>,
    duration_str: Option<String>,
}

impl CustomShowItem {
    /// Builds a typed view over a raw content entry at the given position.
    #[must_use]
    pub fn new(data: Value, order: usize) -> Self {
        let base = BaseMediaFields::from_value(&data);
        let media = MediaFields::from_value(&data);
        let redirect = RedirectFields::from_value(&data);
        let rating = raw::get_str(&data, "rating");
        let duration_str = raw::get_str(&data, "durationStr");
        Self {
            data,
            order,
            base,
            media,
            redirect,
            rating,
            duration_str,
        }
    }

    /// Position of this item within its show (0-based).
    #[must_use]
    pub const fn order(&self) -> usize {
        self.order
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

    /// Redirect fields (empty for media entries).
    #[must_use]
    pub const fn redirect(&self) -> &RedirectFields {
        &self.redirect
    }

    /// Content rating.
    #[must_use]
    pub fn rating(&self) -> Option<&str> {
        self.rating.as_deref()
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.media.title.as_deref()
    }

    /// Human-readable runtime (`"1:26:06"`), transient and never sent
    /// back to the server.
    #[must_use]
    pub fn duration_str(&self) -> Option<&str> {
        self.duration_str.as_deref()
    }

    /// Payload to send back to the server: a copy of the stored payload
    /// with the transient `durationStr` and `commercials` fields removed.
    /// The stored payload itself is never mutated, so repeated reads are
    /// stable and [`Self::duration_str`] keeps working.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut data = self.data.clone();
        if let Some(object) = data.as_object_mut() {
            object.remove("durationStr");
            object.remove("commercials");
        }
        data
    }
}

/// The full definition of a custom show: identity plus its program list.
#[derive(Debug, Clone)]
pub struct CustomShowDetails {
    data: Value,
    id: Option<String>,
    name: Option<String>,
    content: OnceLock<Vec<CustomShowItem>>,
}

impl CustomShowDetails {
    /// Builds a typed view over a raw show-details payload.
    #[must_use]
    pub fn new(data: Value) -> Self {
        let id = raw::get_str(&data, "id");
        let name = raw::get_str(&data, "name");
        Self {
            data,
            id,
            name,
            content: OnceLock::new(),
        }
    }

    /// Show identifier.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Show name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The show's programs in order.
    ///
    /// The first call scans the raw `content` array once, assigning order
    /// indices 0, 1, 2, ... in entry order; later calls return the cached
    /// sequence without rescanning. An absent `content` entry yields an
    /// empty sequence.
    #[must_use]
    pub fn content(&self) -> &[CustomShowItem] {
        self.content.get_or_init(|| {
            raw::get_array(&self.data, "content")
                .map(|entries| {
                    entries
                        .iter()
                        .enumerate()
                        .map(|(order, entry)| CustomShowItem::new(entry.clone(), order))
                        .collect()
                })
                .unwrap_or_default()
        })
    }
}

/// A custom show as listed by the server, with lazily fetched details.
#[derive(Debug, Clone)]
pub struct CustomShow {
    data: Value,
    session: Option<SessionHandle>,
    id: Option<String>,
    name: Option<String>,
    count: Option<i64>,
    details: OnceCell<Option<CustomShowDetails>>,
}

impl CustomShow {
    /// Type tag custom shows carry in channel lineups.
    pub const TYPE_TAG: &'static str = "customShow";

    /// Builds a typed view over a raw show-summary payload.
    #[must_use]
    pub fn new(data: Value, session: Option<SessionHandle>) -> Self {
        let id = raw::get_str(&data, "id");
        let name = raw::get_str(&data, "name");
        let count = raw::get_i64(&data, "count");
        Self {
            data,
            session,
            id,
            name,
            count,
            details: OnceCell::new(),
        }
    }

    /// Show identifier.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Show name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of programs the server reports for this show.
    #[must_use]
    pub const fn count(&self) -> Option<i64> {
        self.count
    }

    /// The show's details, fetched through the session at most once.
    ///
    /// A successful fetch is memoized, including a `None` result for a
    /// show the server no longer knows; a failed fetch leaves the cache
    /// empty so a later call retries.
    ///
    /// # Errors
    ///
    /// [`crate::DizqueTvError::NotRemoteObject`] when the show was built
    /// without a session; otherwise whatever the fetch returns.
    pub async fn details(&self) -> Result<Option<&CustomShowDetails>> {
        let session = require_linked(self.session.as_ref(), "CustomShow")?;
        let details = self
            .details
            .get_or_try_init(|| async {
                match self.id.as_deref() {
                    Some(id) => session.get_custom_show_details(id).await,
                    None => Ok(None),
                }
            })
            .await?;
        Ok(details.as_ref())
    }

    /// The show's programs in order, forwarded from [`Self::details`].
    /// Yields an empty slice when the server resolves no details.
    ///
    /// # Errors
    ///
    /// Same as [`Self::details`].
    pub async fn content(&self) -> Result<&[CustomShowItem]> {
        match self.details().await? {
            Some(details) => Ok(details.content()),
            None => Ok(&[]),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::bail;
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::DizqueTvError;
    use crate::api::DizqueTvApi;

    /// Counting session whose show-details response is configurable.
    #[derive(Debug)]
    struct CountingSession {
        calls: AtomicUsize,
        details: Option<Value>,
        /// When set, the first N calls fail before any succeed.
        failures: AtomicUsize,
    }

    impl CountingSession {
        fn returning(details: Option<Value>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                details,
                failures: AtomicUsize::new(0),
            }
        }

        fn failing_once(details: Option<Value>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                details,
                failures: AtomicUsize::new(1),
            }
        }
    }

    #[async_trait]
    impl DizqueTvApi for CountingSession {
        async fn get_custom_show_details(&self, _id: &str) -> Result<Option<CustomShowDetails>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                bail!("transient transport failure");
            }
            Ok(self.details.clone().map(CustomShowDetails::new))
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

    fn details_payload() -> Value {
        json!({
            "id": "show-1",
            "name": "Saturday Cartoons",
            "content": [
                {"title": "A", "type": "episode", "duration": 1_320_000, "durationStr": "0:22:00"},
                {"title": "B", "type": "episode", "duration": 1_320_000},
                {"title": "C", "type": "movie", "duration": 5_400_000}
            ]
        })
    }

    #[test]
    fn test_content_assigns_sequential_orders_from_zero() {
        // Arrange
        let details = CustomShowDetails::new(details_payload());

        // Act
        let content = details.content();

        // Assert
        assert_eq!(content.len(), 3);
        assert_eq!(content[0].order(), 0);
        assert_eq!(content[1].order(), 1);
        assert_eq!(content[2].order(), 2);
        assert_eq!(content[0].title(), Some("A"));
        assert_eq!(content[2].title(), Some("C"));
    }

    #[test]
    fn test_content_is_memoized_as_the_identical_sequence() {
        // Arrange
        let details = CustomShowDetails::new(details_payload());

        // Act
        let first = details.content();
        let second = details.content();

        // Assert: same cached slice, not a recomputation
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_content_is_empty_when_raw_entry_is_absent() {
        // Arrange
        let details = CustomShowDetails::new(json!({"id": "show-1", "name": "Empty"}));

        // Act & Assert
        assert!(details.content().is_empty());
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        // Arrange & Act
        let details = CustomShowDetails::new(json!({}));
        let show = CustomShow::new(json!({}), None);

        // Assert
        assert_eq!(details.id(), None);
        assert_eq!(details.name(), None);
        assert_eq!(show.id(), None);
        assert_eq!(show.count(), None);
    }

    #[test]
    fn test_to_value_strips_transient_fields_without_mutating_storage() {
        // Arrange
        let item = CustomShowItem::new(
            json!({
                "title": "A",
                "duration": 1_320_000,
                "durationStr": "0:22:00",
                "commercials": [{"title": "Ad"}]
            }),
            0,
        );

        // Act
        let outgoing = item.to_value();
        let again = item.to_value();

        // Assert
        assert!(outgoing.get("durationStr").is_none());
        assert!(outgoing.get("commercials").is_none());
        assert_eq!(outgoing.get("title"), Some(&json!("A")));
        assert_eq!(outgoing, again);
        // Stored payload untouched: the typed accessor still works.
        assert_eq!(item.duration_str(), Some("0:22:00"));
        assert!(item.data.get("commercials").is_some());
    }

    #[test]
    fn test_to_value_is_clean_when_payload_never_had_transients() {
        // Arrange
        let item = CustomShowItem::new(json!({"title": "A"}), 0);

        // Act
        let outgoing = item.to_value();

        // Assert
        assert!(outgoing.get("durationStr").is_none());
        assert!(outgoing.get("commercials").is_none());
    }

    #[tokio::test]
    async fn test_details_fetch_happens_once_across_content_calls() {
        // Arrange
        let session = Arc::new(CountingSession::returning(Some(details_payload())));
        let show = CustomShow::new(
            json!({"id": "show-1", "name": "Saturday Cartoons", "count": 3}),
            Some(session.clone()),
        );

        // Act
        let first = show.content().await.unwrap();
        let second = show.content().await.unwrap();

        // Assert: one fetch, identical cached sequence
        assert_eq!(session.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.len(), 3);
        assert!(std::ptr::eq(first, second));
    }

    #[tokio::test]
    async fn test_content_is_empty_when_details_resolve_null() {
        // Arrange
        let session = Arc::new(CountingSession::returning(None));
        let show = CustomShow::new(json!({"id": "gone", "count": 0}), Some(session.clone()));

        // Act
        let content = show.content().await.unwrap();
        let again = show.content().await.unwrap();

        // Assert: empty, not an error, and the null result is memoized
        assert!(content.is_empty());
        assert!(again.is_empty());
        assert_eq!(session.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_errors_are_not_memoized() {
        // Arrange
        let session = Arc::new(CountingSession::failing_once(Some(details_payload())));
        let show = CustomShow::new(json!({"id": "show-1"}), Some(session.clone()));

        // Act
        let first = show.content().await;
        let second = show.content().await.unwrap();

        // Assert: the error surfaced, then the retry succeeded and cached
        assert!(first.is_err());
        assert_eq!(second.len(), 3);
        assert_eq!(session.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_details_without_session_fails_not_remote() {
        // Arrange
        let show = CustomShow::new(json!({"id": "show-1"}), None);

        // Act
        let err = show.details().await.unwrap_err();

        // Assert
        assert!(matches!(
            err.downcast_ref::<DizqueTvError>(),
            Some(DizqueTvError::NotRemoteObject {
                object_type: "CustomShow"
            })
        ));
    }

    #[tokio::test]
    async fn test_show_without_id_resolves_no_details_without_fetching() {
        // Arrange
        let session = Arc::new(CountingSession::returning(Some(details_payload())));
        let show = CustomShow::new(json!({"name": "No ID"}), Some(session.clone()));

        // Act
        let content = show.content().await.unwrap();

        // Assert
        assert!(content.is_empty());
        assert_eq!(session.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_type_tag_is_fixed() {
        assert_eq!(CustomShow::TYPE_TAG, "customShow");
    }
}
