//! Capability traits for the dizqueTV session and owning collections.
//!
//! Entities hold `Arc<dyn …>` handles to these traits instead of concrete
//! collaborators, so tests can substitute counting mocks and ownership
//! direction stays explicit (an entity references its collection, it does
//! not own it).

use std::fmt::Debug;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::custom_show::CustomShowDetails;
use crate::media::{FillerItem, Program};

/// Remote dizqueTV API surface that entities call back into.
///
/// Implemented by [`crate::DizqueTvClient`]; object-safe via `async_trait`
/// so entities can store [`SessionHandle`]s.
#[async_trait]
pub trait DizqueTvApi: Debug + Send + Sync {
    /// Fetches the details (content list) of a custom show.
    ///
    /// Resolves to `None` when the server has no show with this ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON decoding fails.
    async fn get_custom_show_details(
        &self,
        custom_show_id: &str,
    ) -> Result<Option<CustomShowDetails>>;

    /// Replaces a channel's stored payload on the server.
    ///
    /// Returns `true` when the server accepted the update.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    async fn update_channel(&self, channel: Value) -> Result<bool>;

    /// Removes the channel with the given number from the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    async fn delete_channel(&self, number: i64) -> Result<bool>;

    /// Replaces a filler list's stored payload on the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    async fn update_filler_list(&self, filler_list_id: &str, filler_list: Value) -> Result<bool>;

    /// Removes the filler list with the given ID from the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    async fn delete_filler_list(&self, filler_list_id: &str) -> Result<bool>;

    /// Removes the plex server with the given name from the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    async fn delete_plex_server(&self, name: &str) -> Result<bool>;
}

/// Owning-channel capability a [`Program`] delegates its deletion to.
#[async_trait]
pub trait ProgramOwner: Debug + Send + Sync {
    /// Removes the given program from this channel's lineup on the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel update fails.
    async fn delete_program(&self, program: &Program) -> Result<bool>;
}

/// Owning-filler-list capability a [`FillerItem`] delegates its deletion to.
#[async_trait]
pub trait FillerOwner: Debug + Send + Sync {
    /// Removes the given filler from this list's content on the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the filler list update fails.
    async fn delete_filler(&self, filler: &FillerItem) -> Result<bool>;
}

/// Shared handle to the session capability.
pub type SessionHandle = Arc<dyn DizqueTvApi>;

/// Shared handle to an owning channel.
pub type ChannelHandle = Arc<dyn ProgramOwner>;

/// Shared handle to an owning filler list.
pub type FillerListHandle = Arc<dyn FillerOwner>;
