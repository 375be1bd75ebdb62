//! Song catalog service
//!
//! Orchestrates the five catalog operations on top of a [`SongStore`].
//! Creation is the only multi-step flow:
//! 1. Validate group and title (non-blank)
//! 2. Look up song details through the [`SongDetailSource`]
//! 3. Insert the enriched song
//!
//! A failed lookup aborts creation; nothing is stored. Lookup and insert are
//! not atomic: if the process dies between them the song is simply not created.

use std::sync::Arc;

use muslib_common::db::{NewSong, Song};
use serde::Deserialize;
use thiserror::Error;

use crate::db::{SongFilter, SongStore};
use crate::pagination::PageWindow;
use crate::services::enrichment_client::{EnrichmentError, SongDetailSource};

/// Song service errors
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or malformed input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No live song with this id
    #[error("Song {0} not found")]
    NotFound(i64),

    /// The enrichment service refused the lookup (non-200 status)
    #[error("Enrichment rejected with HTTP status {0}")]
    EnrichmentRejected(u16),

    /// The enrichment service could not be reached
    #[error("Enrichment unavailable: {0}")]
    EnrichmentUnavailable(String),

    /// The enrichment service answered with an unusable body
    #[error("Enrichment failed: {0}")]
    EnrichmentFailed(String),

    /// Persistence layer failure
    #[error(transparent)]
    Storage(#[from] muslib_common::Error),
}

impl From<EnrichmentError> for ServiceError {
    fn from(err: EnrichmentError) -> Self {
        match err {
            EnrichmentError::LookupFailed(status) => ServiceError::EnrichmentRejected(status),
            EnrichmentError::LookupUnavailable(msg) => ServiceError::EnrichmentUnavailable(msg),
            EnrichmentError::LookupMalformed(msg) => ServiceError::EnrichmentFailed(msg),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Fields accepted by [`SongService::update`]
///
/// Absent fields keep the stored value. Unknown fields (including `id` and
/// the timestamps) are ignored, so a full song document is accepted as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongUpdate {
    pub group: Option<String>,
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub text: Option<String>,
    pub link: Option<String>,
}

impl SongUpdate {
    fn validate(&self) -> ServiceResult<()> {
        if matches!(&self.group, Some(g) if is_blank(g)) {
            return Err(ServiceError::InvalidRequest("group cannot be empty".to_string()));
        }
        if matches!(&self.title, Some(t) if is_blank(t)) {
            return Err(ServiceError::InvalidRequest("title cannot be empty".to_string()));
        }
        Ok(())
    }

    fn apply_to(self, song: &mut Song) {
        if let Some(group) = self.group {
            song.group = group;
        }
        if let Some(title) = self.title {
            song.title = title;
        }
        if let Some(release_date) = self.release_date {
            song.release_date = release_date;
        }
        if let Some(text) = self.text {
            song.text = text;
        }
        if let Some(link) = self.link {
            song.link = link;
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Catalog operations shared by all request handlers
#[derive(Clone)]
pub struct SongService {
    store: Arc<dyn SongStore>,
    enrichment: Arc<dyn SongDetailSource>,
}

impl SongService {
    pub fn new(store: Arc<dyn SongStore>, enrichment: Arc<dyn SongDetailSource>) -> Self {
        Self { store, enrichment }
    }

    /// List songs matching `filter`, optionally windowed
    pub async fn list(&self, filter: &SongFilter, page: Option<PageWindow>) -> ServiceResult<Vec<Song>> {
        Ok(self.store.find(filter, page).await?)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Song> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Create a song enriched with externally looked-up details
    pub async fn create(&self, group: &str, title: &str) -> ServiceResult<Song> {
        if is_blank(group) || is_blank(title) {
            return Err(ServiceError::InvalidRequest(
                "group and song are required".to_string(),
            ));
        }

        let detail = self.enrichment.lookup(group, title).await?;

        let song = self
            .store
            .insert(NewSong {
                group: group.to_string(),
                title: title.to_string(),
                release_date: detail.release_date,
                text: detail.text,
                link: detail.link,
            })
            .await?;

        tracing::info!(id = song.id, group = %song.group, title = %song.title, "Song created");
        Ok(song)
    }

    /// Merge `update` onto the stored song and save it
    pub async fn update(&self, id: i64, update: SongUpdate) -> ServiceResult<Song> {
        let mut song = self.get(id).await?;
        update.validate()?;
        update.apply_to(&mut song);

        let saved = self.store.save(&song).await.map_err(|e| not_found_or_storage(id, e))?;
        tracing::info!(id, "Song updated");
        Ok(saved)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.get(id).await?;
        self.store.delete(id).await.map_err(|e| not_found_or_storage(id, e))?;
        tracing::info!(id, "Song deleted");
        Ok(())
    }
}

/// A row can vanish between the existence check and the write
fn not_found_or_storage(id: i64, err: muslib_common::Error) -> ServiceError {
    match err {
        muslib_common::Error::NotFound(_) => ServiceError::NotFound(id),
        other => ServiceError::Storage(other),
    }
}
