//! muslib-api library - song catalog HTTP service
//!
//! Exposes the router and application state for the binary and for
//! integration testing.

pub mod api;
pub mod db;
pub mod error;
pub mod pagination;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::db::SqliteSongStore;
use crate::services::{SongDetailSource, SongService};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Catalog operations
    pub songs: SongService,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create state backed by a SQLite pool and an enrichment source
    pub fn new(db: SqlitePool, enrichment: Arc<dyn SongDetailSource>) -> Self {
        let store = Arc::new(SqliteSongStore::new(db));
        Self::with_service(SongService::new(store, enrichment))
    }

    pub fn with_service(songs: SongService) -> Self {
        Self {
            songs,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::song_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
