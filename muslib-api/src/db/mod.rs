//! Persistence gateway for muslib-api
//!
//! [`SongStore`] is the seam between the song service and durable storage;
//! [`SqliteSongStore`] is the production implementation.

pub mod songs;

pub use songs::{SongFilter, SongStore, SqliteSongStore};
