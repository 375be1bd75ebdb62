//! Database models

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A catalog song as stored in the `songs` table
///
/// `release_date` is opaque text (e.g. "16.07.2006"); no date format is enforced.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Song {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub group: String,
    pub title: String,
    pub release_date: String,
    pub text: String,
    pub link: String,
}

/// Field values for a song that has not been stored yet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewSong {
    pub group: String,
    pub title: String,
    pub release_date: String,
    pub text: String,
    pub link: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Song {
        let ts = Utc.with_ymd_and_hms(2024, 10, 2, 15, 4, 5).unwrap();
        Song {
            id: 1,
            created_at: ts,
            updated_at: ts,
            deleted_at: None,
            group: "Muse".to_string(),
            title: "Supermassive Black Hole".to_string(),
            release_date: "16.07.2006".to_string(),
            text: "Ooh baby, don't you know I suffer?".to_string(),
            link: "https://www.youtube.com/watch?v=Xsp3_a-PMTw".to_string(),
        }
    }

    #[test]
    fn test_song_json_shape() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(value["id"], 1);
        assert_eq!(value["group"], "Muse");
        assert_eq!(value["title"], "Supermassive Black Hole");
        assert_eq!(value["release_date"], "16.07.2006");
        assert!(value["created_at"].is_string());
        assert!(value["updated_at"].is_string());
        // Live songs carry no deleted_at key at all
        assert!(value.get("deleted_at").is_none());
    }

    #[test]
    fn test_deleted_song_serializes_deleted_at() {
        let mut song = sample();
        song.deleted_at = Some(song.updated_at);

        let value = serde_json::to_value(song).unwrap();
        assert!(value["deleted_at"].is_string());
    }
}
