//! Client library for the dizqueTV media-scheduling server.
//!
//! Models the entities the server's REST API exposes (channels and their
//! programs, filler lists, custom shows, plex settings) as typed views
//! over the raw JSON payloads, and provides [`DizqueTvClient`] as the
//! HTTP-backed session they call back into.
//!
//! Every view retains its raw payload and defaults missing fields to
//! `None` instead of failing; derived collections (a custom show's
//! content) are computed lazily and memoized. Entities fetched through a
//! client can mutate their remote counterpart (delete a program, a
//! filler, a channel); an entity built locally without a session fails
//! such operations with [`DizqueTvError::NotRemoteObject`].

pub mod api;
mod channel;
mod client;
mod custom_show;
mod error;
mod filler;
mod media;
mod plex;
mod raw;

pub use api::{
    ChannelHandle, DizqueTvApi, FillerListHandle, FillerOwner, ProgramOwner, SessionHandle,
};
pub use channel::{Channel, ChannelSettings};
pub use client::{DizqueTvClient, DizqueTvClientBuilder};
pub use custom_show::{CustomShow, CustomShowDetails, CustomShowItem};
pub use error::DizqueTvError;
pub use filler::FillerList;
pub use media::{BaseMediaFields, FillerItem, MediaFields, Program, RedirectFields};
pub use plex::{PlexServer, PlexServerSettings};
