use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use super::data::{CategoryToken, WebsiteEntry};
use crate::error::{FolioError, Result};

const ACTIVE_CATEGORY_KEY: &str = "active_category";

/// The Library manages the local SQLite database.
/// It keeps the last successful catalog listing, so the gallery still has
/// something to show offline, and small user preferences.
pub struct Library {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl Library {
    /// Open the library in the user's data directory:
    /// - Linux: ~/.local/share/folio-gallery/folio.db
    /// - macOS: ~/Library/Application Support/folio-gallery/folio.db
    /// - Windows: %APPDATA%\folio-gallery\folio.db
    pub fn open_default() -> Result<Self> {
        let db_path = Self::get_db_path()?;
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(&db_path)
    }

    /// Open or create the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        log::info!("Library opened at {}", path.display());

        let mut library = Library {
            conn,
            db_path: Some(path.to_path_buf()),
        };
        library.init_schema()?;
        Ok(library)
    }

    /// Throwaway library, used when the data directory is unusable
    pub fn open_in_memory() -> Result<Self> {
        let mut library = Library {
            conn: Connection::open_in_memory()?,
            db_path: None,
        };
        library.init_schema()?;
        Ok(library)
    }

    fn get_db_path() -> Result<PathBuf> {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or(FolioError::NoDataDir)?;
        path.push("folio-gallery");
        path.push("folio.db");
        Ok(path)
    }

    /// Create all tables if they don't exist
    fn init_schema(&mut self) -> Result<()> {
        // Last listing, one JSON payload per entry in display order
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                position        INTEGER PRIMARY KEY,
                payload         TEXT NOT NULL,
                cached_at       INTEGER NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS categories (
                position        INTEGER PRIMARY KEY,
                token           TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS preferences (
                key             TEXT PRIMARY KEY,
                value           TEXT NOT NULL
            )",
            [],
        )?;

        log::debug!("Library schema ready");
        Ok(())
    }

    /// Replace the cached listing with `entries`
    pub fn replace_entries(&mut self, entries: &[WebsiteEntry]) -> Result<usize> {
        let now = Utc::now().timestamp();
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM entries", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO entries (position, payload, cached_at) VALUES (?1, ?2, ?3)")?;
            for (position, entry) in entries.iter().enumerate() {
                let payload = serde_json::to_string(entry)?;
                stmt.execute(params![position as i64, payload, now])?;
            }
        }
        tx.commit()?;

        log::debug!("Cached {} catalog entries", entries.len());
        Ok(entries.len())
    }

    /// Cached listing in its original order. Rows that no longer parse are skipped.
    pub fn cached_entries(&self) -> Result<Vec<WebsiteEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload FROM entries ORDER BY position")?;
        let payloads = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut entries = Vec::new();
        for payload in payloads {
            match serde_json::from_str(&payload?) {
                Ok(entry) => entries.push(entry),
                Err(e) => log::warn!("Skipping unreadable cached entry: {}", e),
            }
        }
        Ok(entries)
    }

    /// When the cached listing was stored
    pub fn cached_at(&self) -> Result<Option<DateTime<Utc>>> {
        let secs: Option<i64> = self
            .conn
            .query_row("SELECT MAX(cached_at) FROM entries", [], |row| row.get(0))?;
        Ok(secs.and_then(|s| DateTime::from_timestamp(s, 0)))
    }

    pub fn replace_categories(&mut self, tokens: &[CategoryToken]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM categories", [])?;
        {
            let mut stmt = tx.prepare("INSERT INTO categories (position, token) VALUES (?1, ?2)")?;
            for (position, token) in tokens.iter().enumerate() {
                stmt.execute(params![position as i64, token.to_string()])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn cached_categories(&self) -> Result<Vec<CategoryToken>> {
        let mut stmt = self
            .conn
            .prepare("SELECT token FROM categories ORDER BY position")?;
        let tokens = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .map(|token| token.map(|t| CategoryToken::parse(&t)))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tokens)
    }

    /// Last category filter the user picked
    pub fn active_category(&self) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![ACTIVE_CATEGORY_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_active_category(&self, label: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![ACTIVE_CATEGORY_KEY, label],
        )?;
        Ok(())
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, title: &str) -> WebsiteEntry {
        WebsiteEntry {
            id: Some(id),
            title: title.into(),
            url: format!("https://{id}.test"),
            photos: vec![format!("https://{id}.test/1.jpg")],
            ..Default::default()
        }
    }

    #[test]
    fn test_entries_round_trip_in_order() {
        let mut library = Library::open_in_memory().unwrap();
        assert!(library.cached_entries().unwrap().is_empty());
        assert!(library.cached_at().unwrap().is_none());

        let entries = vec![entry(2, "Second"), entry(1, "First")];
        library.replace_entries(&entries).unwrap();
        assert_eq!(library.cached_entries().unwrap(), entries);
        assert!(library.cached_at().unwrap().is_some());

        library.replace_entries(&entries[..1]).unwrap();
        assert_eq!(library.cached_entries().unwrap().len(), 1);
    }

    #[test]
    fn test_active_category_preference() {
        let library = Library::open_in_memory().unwrap();
        assert_eq!(library.active_category().unwrap(), None);

        library.set_active_category("Design").unwrap();
        library.set_active_category("Business").unwrap();
        assert_eq!(library.active_category().unwrap().as_deref(), Some("Business"));
    }

    #[test]
    fn test_categories_keep_ids() {
        let mut library = Library::open_in_memory().unwrap();
        let tokens = vec![CategoryToken::parse("3|Design"), CategoryToken::parse("Loose")];
        library.replace_categories(&tokens).unwrap();
        assert_eq!(library.cached_categories().unwrap(), tokens);
    }

    #[test]
    fn test_file_library_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.db");
        {
            let mut library = Library::open(&path).unwrap();
            library.replace_entries(&[entry(5, "Kept")]).unwrap();
            library.set_active_category("Kept").unwrap();
        }

        let library = Library::open(&path).unwrap();
        assert_eq!(library.db_path.as_deref(), Some(path.as_path()));
        assert_eq!(library.cached_entries().unwrap()[0].title, "Kept");
        assert_eq!(library.active_category().unwrap().as_deref(), Some("Kept"));
    }
}
