//! Song database operations
//!
//! Deletes are soft: a deleted row keeps its data but gets a `deleted_at`
//! timestamp, and every read filters such rows out.

use async_trait::async_trait;
use chrono::Utc;
use muslib_common::db::{NewSong, Song};
use muslib_common::{Error, Result};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::pagination::PageWindow;

/// Exact-match filter for [`SongStore::find`]
///
/// `None` fields impose no constraint; set fields are ANDed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
    pub group: Option<String>,
    pub title: Option<String>,
}

/// Storage operations needed by the song service
#[async_trait]
pub trait SongStore: Send + Sync {
    /// Songs matching `filter`, ordered by id, optionally windowed
    async fn find(&self, filter: &SongFilter, page: Option<PageWindow>) -> Result<Vec<Song>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Song>>;

    /// Store a new song, assigning its id and timestamps
    async fn insert(&self, song: NewSong) -> Result<Song>;

    /// Overwrite every mutable field of the song with `song.id`
    ///
    /// Fails with [`Error::NotFound`] if the row is missing or deleted.
    async fn save(&self, song: &Song) -> Result<Song>;

    /// Soft-delete the song with `id`
    ///
    /// Fails with [`Error::NotFound`] if the row is missing or already deleted.
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLite-backed [`SongStore`]
#[derive(Clone)]
pub struct SqliteSongStore {
    pool: SqlitePool,
}

impl SqliteSongStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SongStore for SqliteSongStore {
    async fn find(&self, filter: &SongFilter, page: Option<PageWindow>) -> Result<Vec<Song>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"SELECT id, created_at, updated_at, deleted_at, "group", title, release_date, text, link
               FROM songs
               WHERE deleted_at IS NULL"#,
        );

        if let Some(group) = &filter.group {
            query.push(r#" AND "group" = "#).push_bind(group.clone());
        }
        if let Some(title) = &filter.title {
            query.push(" AND title = ").push_bind(title.clone());
        }

        query.push(" ORDER BY id");

        if let Some(window) = page {
            query
                .push(" LIMIT ")
                .push_bind(window.limit)
                .push(" OFFSET ")
                .push_bind(window.offset);
        }

        let songs = query.build_query_as::<Song>().fetch_all(&self.pool).await?;
        Ok(songs)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Song>> {
        let song = sqlx::query_as::<_, Song>(
            r#"
            SELECT id, created_at, updated_at, deleted_at, "group", title, release_date, text, link
            FROM songs
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(song)
    }

    async fn insert(&self, song: NewSong) -> Result<Song> {
        let now = Utc::now();

        let stored = sqlx::query_as::<_, Song>(
            r#"
            INSERT INTO songs (created_at, updated_at, "group", title, release_date, text, link)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, created_at, updated_at, deleted_at, "group", title, release_date, text, link
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(&song.group)
        .bind(&song.title)
        .bind(&song.release_date)
        .bind(&song.text)
        .bind(&song.link)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id = stored.id, group = %stored.group, title = %stored.title, "Inserted song");
        Ok(stored)
    }

    async fn save(&self, song: &Song) -> Result<Song> {
        let stored = sqlx::query_as::<_, Song>(
            r#"
            UPDATE songs
            SET "group" = ?, title = ?, release_date = ?, text = ?, link = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            RETURNING id, created_at, updated_at, deleted_at, "group", title, release_date, text, link
            "#,
        )
        .bind(&song.group)
        .bind(&song.title)
        .bind(&song.release_date)
        .bind(&song.text)
        .bind(&song.link)
        .bind(Utc::now())
        .bind(song.id)
        .fetch_optional(&self.pool)
        .await?;

        stored.ok_or_else(|| Error::NotFound(format!("song {}", song.id)))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("UPDATE songs SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("song {}", id)));
        }

        tracing::debug!(id, "Soft-deleted song");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muslib_common::db::init_database;

    async fn test_store() -> SqliteSongStore {
        let pool = init_database("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        SqliteSongStore::new(pool)
    }

    fn new_song(group: &str, title: &str) -> NewSong {
        NewSong {
            group: group.to_string(),
            title: title.to_string(),
            release_date: "16.07.2006".to_string(),
            text: "lyrics".to_string(),
            link: "https://example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamps() {
        let store = test_store().await;

        let first = store.insert(new_song("Muse", "Uprising")).await.unwrap();
        let second = store.insert(new_song("Muse", "Hysteria")).await.unwrap();

        assert!(second.id > first.id);
        assert_eq!(first.created_at, first.updated_at);
        assert!(first.deleted_at.is_none());
        assert_eq!(first.release_date, "16.07.2006");
    }

    #[tokio::test]
    async fn test_find_by_id_round_trip() {
        let store = test_store().await;
        let stored = store.insert(new_song("Muse", "Uprising")).await.unwrap();

        let loaded = store.find_by_id(stored.id).await.unwrap();
        assert_eq!(loaded, Some(stored));

        assert_eq!(store.find_by_id(9999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_filters_are_exact_and_anded() {
        let store = test_store().await;
        store.insert(new_song("Muse", "Uprising")).await.unwrap();
        store.insert(new_song("Muse", "Hysteria")).await.unwrap();
        store.insert(new_song("muse", "Uprising")).await.unwrap();
        store.insert(new_song("Radiohead", "Creep")).await.unwrap();

        let all = store.find(&SongFilter::default(), None).await.unwrap();
        assert_eq!(all.len(), 4);

        let muse = SongFilter {
            group: Some("Muse".to_string()),
            title: None,
        };
        let songs = store.find(&muse, None).await.unwrap();
        assert_eq!(songs.len(), 2);
        assert!(songs.iter().all(|s| s.group == "Muse"));

        let both = SongFilter {
            group: Some("Muse".to_string()),
            title: Some("Uprising".to_string()),
        };
        let songs = store.find(&both, None).await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title, "Uprising");

        let partial = SongFilter {
            group: Some("Mus".to_string()),
            title: None,
        };
        assert!(store.find(&partial, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_with_page_window() {
        let store = test_store().await;
        for i in 0..5 {
            store.insert(new_song("Muse", &format!("Song {}", i))).await.unwrap();
        }

        let window = PageWindow { offset: 2, limit: 2 };
        let songs = store.find(&SongFilter::default(), Some(window)).await.unwrap();
        let titles: Vec<_> = songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Song 2", "Song 3"]);

        let past_end = PageWindow { offset: 10, limit: 2 };
        assert!(store.find(&SongFilter::default(), Some(past_end)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_overwrites_fields() {
        let store = test_store().await;
        let mut song = store.insert(new_song("Muse", "Uprising")).await.unwrap();

        song.text = "They will not force us".to_string();
        song.link = String::new();
        let saved = store.save(&song).await.unwrap();

        assert_eq!(saved.id, song.id);
        assert_eq!(saved.created_at, song.created_at);
        assert_eq!(saved.text, "They will not force us");
        assert_eq!(saved.link, "");
        assert!(saved.updated_at >= song.updated_at);

        assert_eq!(store.find_by_id(song.id).await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn test_save_missing_song_is_not_found() {
        let store = test_store().await;
        let mut song = store.insert(new_song("Muse", "Uprising")).await.unwrap();
        song.id += 100;

        let err = store.save(&song).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_hides_song_from_reads() {
        let store = test_store().await;
        let song = store.insert(new_song("Muse", "Uprising")).await.unwrap();
        store.insert(new_song("Muse", "Hysteria")).await.unwrap();

        store.delete(song.id).await.unwrap();

        assert_eq!(store.find_by_id(song.id).await.unwrap(), None);
        let remaining = store.find(&SongFilter::default(), None).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "Hysteria");

        // Deleted rows cannot be deleted or saved again
        assert!(matches!(store.delete(song.id).await, Err(Error::NotFound(_))));
        assert!(matches!(store.save(&song).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_soft_delete_keeps_row() {
        let store = test_store().await;
        let song = store.insert(new_song("Muse", "Uprising")).await.unwrap();
        store.delete(song.id).await.unwrap();

        let deleted_at: Option<String> =
            sqlx::query_scalar("SELECT deleted_at FROM songs WHERE id = ?")
                .bind(song.id)
                .fetch_one(&store.pool)
                .await
                .unwrap();
        assert!(deleted_at.is_some());
    }
}
