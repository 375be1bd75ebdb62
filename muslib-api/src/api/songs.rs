//! Song catalog endpoints
//!
//! - GET    /songs          list (filter by `group` / `song`, optional `page` + `limit`)
//! - GET    /songs/:id      fetch one
//! - POST   /songs          create from `{group, song}`, enriched externally
//! - PUT    /songs/:id      merge fields onto an existing song
//! - DELETE /songs/:id      soft delete

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use muslib_common::db::Song;
use serde::{Deserialize, Serialize};

use crate::db::SongFilter;
use crate::pagination::calculate_window;
use crate::services::SongUpdate;
use crate::{ApiError, ApiResult, AppState};

/// Query parameters for GET /songs
#[derive(Debug, Deserialize)]
pub struct ListSongsQuery {
    /// Exact group name
    pub group: Option<String>,
    /// Exact song title
    pub song: Option<String>,
    /// Page number (1-indexed), only used together with `limit`
    pub page: Option<i64>,
    /// Page size; omit to return every match
    pub limit: Option<i64>,
}

/// Request body for POST /songs
#[derive(Debug, Deserialize)]
pub struct AddSongRequest {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub song: String,
}

/// Response body for DELETE /songs/:id
#[derive(Debug, Serialize)]
pub struct DeleteSongResponse {
    pub message: String,
}

/// Empty query values (`?group=`) mean "no filter"
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Ids that are not integers cannot name a song
fn parse_song_id(raw: &str) -> ApiResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::NotFound("Song not found".to_string()))
}

/// GET /songs
pub async fn list_songs(
    State(state): State<AppState>,
    query: Result<Query<ListSongsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Song>>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    if matches!(query.limit, Some(limit) if limit < 1) {
        return Err(ApiError::BadRequest("limit must be at least 1".to_string()));
    }

    let filter = SongFilter {
        group: non_empty(query.group),
        title: non_empty(query.song),
    };
    let window = calculate_window(query.page, query.limit);

    let songs = state.songs.list(&filter, window).await?;
    Ok(Json(songs))
}

/// GET /songs/:id
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Song>> {
    let id = parse_song_id(&id)?;
    Ok(Json(state.songs.get(id).await?))
}

/// POST /songs
///
/// **Request:** `{"group": "Muse", "song": "Supermassive Black Hole"}`
///
/// **Errors:**
/// - 400: missing/blank fields, malformed JSON, or enrichment rejected the lookup
/// - 500: enrichment unreachable or malformed, or storage failure
pub async fn create_song(
    State(state): State<AppState>,
    payload: Result<Json<AddSongRequest>, JsonRejection>,
) -> ApiResult<Json<Song>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let song = state.songs.create(&request.group, &request.song).await?;
    Ok(Json(song))
}

/// PUT /songs/:id
///
/// An unknown id is reported before a bad body.
pub async fn update_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SongUpdate>, JsonRejection>,
) -> ApiResult<Json<Song>> {
    let id = parse_song_id(&id)?;

    let Json(update) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            state.songs.get(id).await?;
            return Err(ApiError::BadRequest(rejection.body_text()));
        }
    };

    Ok(Json(state.songs.update(id, update).await?))
}

/// DELETE /songs/:id
pub async fn delete_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteSongResponse>> {
    let id = parse_song_id(&id)?;
    state.songs.delete(id).await?;

    Ok(Json(DeleteSongResponse {
        message: "Song deleted successfully".to_string(),
    }))
}

/// Build song routes
pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/songs", get(list_songs).post(create_song))
        .route(
            "/songs/:id",
            get(get_song).put(update_song).delete(delete_song),
        )
}
