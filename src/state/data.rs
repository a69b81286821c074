/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the artwork store and the gallery / shell layers.

use chrono::{DateTime, Utc};
use image::RgbaImage;

/// Store-assigned artwork identifier (SQLite rowid)
pub type ArtworkId = i64;

/// Represents a single persisted artwork
#[derive(Debug, Clone, PartialEq)]
pub struct ArtworkRecord {
    /// Unique database ID, assigned on insert and never changed
    pub id: ArtworkId,
    pub title: String,
    pub artist: String,
    /// Free text, empty when the row stores NULL
    pub description: String,
    /// Decoded payload. `None` when the stored bytes could not be decoded.
    pub image: Option<RgbaImage>,
    /// Row insertion time (UTC, second precision). `None` when the stored
    /// value is missing or not a recognised timestamp.
    pub created_at: Option<DateTime<Utc>>,
}

impl ArtworkRecord {
    /// Label shown in list views, e.g. "#3 - Ocean Dreams"
    pub fn list_label(&self) -> String {
        format!("#{} - {}", self.id, self.title)
    }
}

/// An artwork that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewArtwork {
    pub title: String,
    pub artist: String,
    pub description: String,
    pub image: RgbaImage,
}
