use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use image::RgbaImage;
use log::{error, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};

use super::data::{ArtworkId, ArtworkRecord, NewArtwork};
use super::error::{StoreError, StoreResult};
use crate::artwork::codec;
use crate::config::StoreConfig;

/// Artist pattern shared by all generated sample artworks
pub const SAMPLE_ARTIST_PATTERN: &str = "Digital Artist %";

/// Columns every artworks table must have
const REQUIRED_COLUMNS: [&str; 6] = ["id", "title", "artist", "description", "image_data", "created_at"];

const SELECT_ARTWORK: &str =
    "SELECT id, title, artist, description, image_data, created_at FROM artworks";

/// Format of SQLite's CURRENT_TIMESTAMP
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The ArtworkStore owns the single connection to the artworks table.
///
/// Every operation returns a `StoreResult`; failures are logged here and
/// handed back as values, never as panics. Once `close()` has been called
/// all further operations fail with `StoreError::Closed`.
pub struct ArtworkStore {
    conn: Option<Connection>,
    db_path: PathBuf,
}

impl ArtworkStore {
    /// Connect to the database described by `config`.
    ///
    /// This only establishes the connection; call `initialize()` before use.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let db_path = config.database_path.clone();
        let connection_error = |reason: String| {
            error!("Failed to connect to database at {}: {}", db_path.display(), reason);
            StoreError::Connection {
                path: db_path.clone(),
                reason,
            }
        };

        if config.create_missing_dirs {
            if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| connection_error(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path).map_err(|e| connection_error(e.to_string()))?;
        conn.busy_timeout(config.busy_timeout())
            .map_err(|e| connection_error(e.to_string()))?;

        // SQLite opens lazily; touch the file so a bad endpoint fails here
        conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
            .map_err(|e| connection_error(e.to_string()))?;

        info!("📁 Connected to database at: {}", db_path.display());

        Ok(Self {
            conn: Some(conn),
            db_path,
        })
    }

    /// Private in-memory database for tests
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Some(conn),
            db_path: PathBuf::from(":memory:"),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn conn(&self) -> StoreResult<&Connection> {
        self.conn.as_ref().ok_or(StoreError::Closed)
    }

    /// Create the artworks table if it doesn't exist.
    ///
    /// Safe to call on every start. An existing table that is missing one of
    /// the expected columns is reported as a schema error.
    pub fn initialize(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS artworks (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                artist          TEXT NOT NULL,
                description     TEXT,
                image_data      BLOB,
                created_at      TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )
        .map_err(|e| schema_error(e.to_string()))?;

        let columns = table_columns(conn).map_err(|e| schema_error(e.to_string()))?;
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| !columns.iter().any(|c| c == name))
            .collect();
        if !missing.is_empty() {
            return Err(schema_error(format!(
                "existing artworks table is missing columns: {}",
                missing.join(", ")
            )));
        }

        info!("✅ Table 'artworks' ready");
        Ok(())
    }

    // ========== Create ==========

    /// Insert a new artwork and return its store-assigned ID
    pub fn insert(
        &self,
        title: &str,
        artist: &str,
        description: &str,
        image: &RgbaImage,
    ) -> StoreResult<ArtworkId> {
        self.try_insert(title, artist, description, image)
            .map_err(|e| log_failure("inserting artwork", e))
    }

    pub fn insert_artwork(&self, artwork: &NewArtwork) -> StoreResult<ArtworkId> {
        self.insert(&artwork.title, &artwork.artist, &artwork.description, &artwork.image)
    }

    /// Insert an artwork whose image is read from a file on disk
    pub fn insert_from_file(
        &self,
        title: &str,
        artist: &str,
        description: &str,
        image_path: &Path,
    ) -> StoreResult<ArtworkId> {
        let image = codec::load_file(image_path)
            .map_err(|e| log_failure("reading image file", e.into()))?;
        self.insert(title, artist, description, &image)
    }

    fn try_insert(
        &self,
        title: &str,
        artist: &str,
        description: &str,
        image: &RgbaImage,
    ) -> StoreResult<ArtworkId> {
        validate(title, artist)?;
        let conn = self.conn()?;
        let image_data = codec::encode(image)?;

        conn.execute(
            "INSERT INTO artworks (title, artist, description, image_data) VALUES (?1, ?2, ?3, ?4)",
            params![title, artist, description, image_data],
        )?;

        let id = conn.last_insert_rowid();
        info!("Artwork inserted successfully with ID: {}", id);
        Ok(id)
    }

    // ========== Read ==========

    /// Get all artworks ordered by ascending ID.
    ///
    /// A row whose image bytes cannot be decoded is still returned, with
    /// `image: None`, so one bad payload never hides the rest of the gallery.
    pub fn get_all(&self) -> StoreResult<Vec<ArtworkRecord>> {
        let result: StoreResult<Vec<StoredRow>> = (|| {
            let conn = self.conn()?;
            let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_ARTWORK))?;
            let rows = stmt
                .query_map([], StoredRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })();

        let rows = result.map_err(|e| log_failure("retrieving artworks", e))?;
        let artworks: Vec<ArtworkRecord> = rows.into_iter().map(StoredRow::into_record).collect();

        info!("Retrieved {} artworks from database", artworks.len());
        Ok(artworks)
    }

    /// Get a single artwork, `None` if no row has this ID
    pub fn get_by_id(&self, id: ArtworkId) -> StoreResult<Option<ArtworkRecord>> {
        let result: StoreResult<Option<StoredRow>> = (|| {
            let conn = self.conn()?;
            let row = conn
                .query_row(
                    &format!("{} WHERE id = ?1", SELECT_ARTWORK),
                    [id],
                    StoredRow::from_row,
                )
                .optional()?;
            Ok(row)
        })();

        let row = result.map_err(|e| log_failure("retrieving artwork by ID", e))?;
        Ok(row.map(StoredRow::into_record))
    }

    // ========== Update ==========

    /// Replace title, artist, description and image of an existing row.
    ///
    /// `id` and `created_at` are left untouched. Returns `Ok(false)` when no
    /// row has this ID.
    pub fn update(
        &self,
        id: ArtworkId,
        title: &str,
        artist: &str,
        description: &str,
        image: &RgbaImage,
    ) -> StoreResult<bool> {
        self.try_update(id, title, artist, description, image)
            .map_err(|e| log_failure("updating artwork", e))
    }

    /// Update an artwork with an image read from a file on disk
    pub fn update_from_file(
        &self,
        id: ArtworkId,
        title: &str,
        artist: &str,
        description: &str,
        image_path: &Path,
    ) -> StoreResult<bool> {
        let image = codec::load_file(image_path)
            .map_err(|e| log_failure("reading image file for update", e.into()))?;
        self.update(id, title, artist, description, &image)
    }

    fn try_update(
        &self,
        id: ArtworkId,
        title: &str,
        artist: &str,
        description: &str,
        image: &RgbaImage,
    ) -> StoreResult<bool> {
        validate(title, artist)?;
        let conn = self.conn()?;
        let image_data = codec::encode(image)?;

        let rows = conn.execute(
            "UPDATE artworks SET title = ?1, artist = ?2, description = ?3, image_data = ?4 WHERE id = ?5",
            params![title, artist, description, image_data, id],
        )?;

        if rows == 0 {
            warn!("No artwork with ID {} to update", id);
            return Ok(false);
        }

        info!("Artwork updated successfully (ID: {})", id);
        Ok(true)
    }

    // ========== Delete ==========

    /// Delete one artwork. Returns `Ok(false)` when no row has this ID.
    pub fn delete(&self, id: ArtworkId) -> StoreResult<bool> {
        let result: StoreResult<usize> = (|| {
            let conn = self.conn()?;
            Ok(conn.execute("DELETE FROM artworks WHERE id = ?1", [id])?)
        })();

        let rows = result.map_err(|e| log_failure("deleting artwork", e))?;
        if rows == 0 {
            warn!("No artwork with ID {} to delete", id);
            return Ok(false);
        }

        info!("Artwork deleted successfully (ID: {})", id);
        Ok(true)
    }

    /// Remove every artwork and restart ID assignment, like a table truncate.
    ///
    /// Both steps commit together. Returns the number of rows removed.
    pub fn delete_all(&self) -> StoreResult<usize> {
        let result: StoreResult<usize> = (|| {
            let conn = self.conn()?;
            let tx = conn.unchecked_transaction()?;
            let rows = tx.execute("DELETE FROM artworks", [])?;
            // Only AUTOINCREMENT tables have a sequence entry
            if has_sequence_table(&tx)? {
                tx.execute("DELETE FROM sqlite_sequence WHERE name = 'artworks'", [])?;
            }
            tx.commit()?;
            Ok(rows)
        })();

        let rows = result.map_err(|e| log_failure("deleting all artworks", e))?;
        info!("🗑️  All artworks deleted ({} rows)", rows);
        Ok(rows)
    }

    /// Delete artworks whose artist matches a SQL LIKE pattern (`%` and `_` wildcards).
    ///
    /// Returns the number of rows removed.
    pub fn delete_by_artist_pattern(&self, pattern: &str) -> StoreResult<usize> {
        let result: StoreResult<usize> = (|| {
            let conn = self.conn()?;
            Ok(conn.execute("DELETE FROM artworks WHERE artist LIKE ?1", [pattern])?)
        })();

        let rows = result.map_err(|e| log_failure("deleting artworks by artist pattern", e))?;
        info!("Deleted {} artworks matching artist '{}'", rows, pattern);
        Ok(rows)
    }

    /// Remove the generated sample artworks
    pub fn delete_samples(&self) -> StoreResult<usize> {
        self.delete_by_artist_pattern(SAMPLE_ARTIST_PATTERN)
    }

    /// Get total count of artworks
    pub fn count(&self) -> StoreResult<i64> {
        let result: StoreResult<i64> = (|| {
            let conn = self.conn()?;
            Ok(conn.query_row("SELECT COUNT(*) FROM artworks", [], |row| row.get(0))?)
        })();

        result.map_err(|e| log_failure("counting artworks", e))
    }

    /// Release the connection. Calling it again is a no-op.
    pub fn close(&mut self) -> StoreResult<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        match conn.close() {
            Ok(()) => {
                info!("Database connection closed");
                Ok(())
            }
            // The connection handle is dropped either way
            Err((_conn, e)) => Err(log_failure("closing database connection", e.into())),
        }
    }
}

impl Drop for ArtworkStore {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for ArtworkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtworkStore")
            .field("db_path", &self.db_path)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Raw column values of one artworks row, before the image is decoded
struct StoredRow {
    id: ArtworkId,
    title: String,
    artist: String,
    description: Option<String>,
    image_data: Option<Vec<u8>>,
    created_at: Option<String>,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            artist: row.get(2)?,
            description: row.get(3)?,
            image_data: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_record(self) -> ArtworkRecord {
        let image = match codec::decode(self.image_data.as_deref().unwrap_or_default()) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("⚠️  Artwork {} has an unreadable image: {}", self.id, e);
                None
            }
        };

        let created_at = self.created_at.as_deref().and_then(parse_timestamp);
        if created_at.is_none() {
            warn!(
                "⚠️  Artwork {} has an unreadable timestamp: {:?}",
                self.id, self.created_at
            );
        }

        ArtworkRecord {
            id: self.id,
            title: self.title,
            artist: self.artist,
            description: self.description.unwrap_or_default(),
            image,
            created_at,
        }
    }
}

/// CURRENT_TIMESTAMP text, or RFC 3339 written by other clients
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .or_else(|_| DateTime::parse_from_rfc3339(text).map(|dt| dt.with_timezone(&Utc)))
        .ok()
}

/// Title and artist are required; whitespace alone does not count
fn validate(title: &str, artist: &str) -> StoreResult<()> {
    if title.trim().is_empty() {
        return Err(StoreError::Validation("title is required".to_string()));
    }
    if artist.trim().is_empty() {
        return Err(StoreError::Validation("artist is required".to_string()));
    }
    Ok(())
}

fn table_columns(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("PRAGMA table_info(artworks)")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn has_sequence_table(conn: &Connection) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence')",
        [],
        |row| row.get(0),
    )
}

fn schema_error(reason: String) -> StoreError {
    error!("Error initializing database: {}", reason);
    StoreError::Schema(reason)
}

fn log_failure(action: &str, e: StoreError) -> StoreError {
    error!("Error {}: {}", action, e);
    e
}
