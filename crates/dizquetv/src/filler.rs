//! Filler lists: the owning collection filler items delegate their
//! deletion to.
//!
//! Like channels, filler lists are immutable snapshots over their raw
//! payload; the server's `api/fillers` listing omits `content`, so lists
//! from it carry an empty item sequence until refetched individually.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::api::{FillerListHandle, FillerOwner, SessionHandle};
use crate::error::require_linked;
use crate::media::FillerItem;
use crate::raw;

/// A dizqueTV filler list and its materialized items.
#[derive(Debug, Clone)]
pub struct FillerList {
    inner: Arc<FillerListInner>,
    id: Option<String>,
    name: Option<String>,
    count: Option<i64>,
    content: Vec<FillerItem>,
}

/// Shared state behind the [`FillerListHandle`] given to each item.
#[derive(Debug)]
struct FillerListInner {
    data: Value,
    session: Option<SessionHandle>,
}

impl FillerList {
    /// Builds a typed view over a raw filler list payload.
    ///
    /// Each entry of the raw `content` array becomes a [`FillerItem`]
    /// wired with the session and a handle back to this list.
    #[must_use]
    pub fn new(data: Value, session: Option<SessionHandle>) -> Self {
        let id = raw::get_str(&data, "id");
        let name = raw::get_str(&data, "name");
        let count = raw::get_i64(&data, "count");
        let inner = Arc::new(FillerListInner { data, session });
        let owner: FillerListHandle = inner.clone();
        let content = raw::get_array(&inner.data, "content")
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| {
                        FillerItem::new(entry.clone(), inner.session.clone(), Some(owner.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            inner,
            id,
            name,
            count,
            content,
        }
    }

    /// The raw payload this view was built from.
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.inner.data
    }

    /// List identifier.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// List name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of items the server reports for this list.
    #[must_use]
    pub const fn count(&self) -> Option<i64> {
        self.count
    }

    /// The list's items in order.
    #[must_use]
    pub fn content(&self) -> &[FillerItem] {
        &self.content
    }

    /// Removes the given filler from this list's content on the server.
    /// Equivalent to [`FillerItem::delete`] on an item from this list.
    ///
    /// # Errors
    ///
    /// [`crate::DizqueTvError::NotRemoteObject`] when the list was built
    /// without a session; otherwise whatever the list update returns.
    pub async fn delete_filler(&self, filler: &FillerItem) -> Result<bool> {
        self.inner.delete_filler(filler).await
    }

    /// Removes this filler list from the server.
    ///
    /// # Errors
    ///
    /// [`crate::DizqueTvError::NotRemoteObject`] when the list was built
    /// without a session; an error when the payload carries no ID;
    /// otherwise whatever the deletion returns.
    pub async fn delete(&self) -> Result<bool> {
        let session = require_linked(self.inner.session.as_ref(), "FillerList")?;
        let id = self.id.as_deref().context("filler list payload has no id")?;
        session.delete_filler_list(id).await
    }
}

#[async_trait]
impl FillerOwner for FillerListInner {
    /// Removes the first content entry matching the filler's payload and
    /// submits the updated list through the session.
    async fn delete_filler(&self, filler: &FillerItem) -> Result<bool> {
        let session = require_linked(self.session.as_ref(), "FillerList")?;
        let id = raw::get_str(&self.data, "id").context("filler list payload has no id")?;

        // Lists may carry the same filler more than once; drop only the
        // first matching entry.
        let mut remaining: Vec<Value> = raw::get_array(&self.data, "content")
            .cloned()
            .unwrap_or_default();
        if let Some(position) = remaining.iter().position(|entry| entry == filler.data()) {
            remaining.remove(position);
        }

        let mut updated = self.data.clone();
        if let Some(object) = updated.as_object_mut() {
            object.insert(String::from("content"), Value::Array(remaining));
        }
        session.update_filler_list(&id, updated).await
    }
}
