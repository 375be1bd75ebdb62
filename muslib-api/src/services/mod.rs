//! Service layer for muslib-api

pub mod enrichment_client;
pub mod song_service;

pub use enrichment_client::{EnrichmentClient, EnrichmentError, SongDetail, SongDetailSource};
pub use song_service::{ServiceError, ServiceResult, SongService, SongUpdate};
