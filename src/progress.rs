use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

use crate::app_dirs::AppDirs;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("progress database error: {0}")]
    Db(#[from] rusqlite::Error),
}

/// External sink for learned-flag changes.
///
/// `on_known` is fire-and-forget: the session keeps its optimistic local
/// state whether or not the write lands. `on_bulk_reset` is the one call
/// that must succeed (or visibly fail) before a restarted session may
/// proceed.
pub trait ProgressReporter {
    fn on_known(&mut self, id: &str) -> Result<(), ProgressError>;
    fn on_bulk_reset(&mut self, ids: &[String]) -> Result<(), ProgressError>;
}

/// SQLite-backed progress store, keyed by deck name so several decks can
/// share one database file.
#[derive(Debug)]
pub struct SqliteProgressStore {
    conn: Connection,
    deck: String,
}

impl SqliteProgressStore {
    /// Open (or create) the progress database in the app state directory.
    pub fn new(deck: &str) -> Result<Self, ProgressError> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("flick_progress.db"));

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(&db_path)?;
        Self::with_conn(conn, deck)
    }

    /// Build a store over an existing connection. Used with
    /// `Connection::open_in_memory()` in tests.
    pub fn with_conn(conn: Connection, deck: &str) -> Result<Self, ProgressError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS learned_words (
                deck TEXT NOT NULL,
                word_id TEXT NOT NULL,
                learned_at TEXT NOT NULL,
                PRIMARY KEY (deck, word_id)
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_learned_words_deck ON learned_words(deck)",
            [],
        )?;

        Ok(SqliteProgressStore {
            conn,
            deck: deck.to_string(),
        })
    }

    /// Ids recorded as learned for this deck, for hydrating a pool at
    /// session start.
    pub fn learned_ids(&self) -> Result<HashSet<String>, ProgressError> {
        let mut stmt = self
            .conn
            .prepare("SELECT word_id FROM learned_words WHERE deck = ?1")?;

        let id_iter = stmt.query_map([&self.deck], |row| row.get::<_, String>(0))?;

        let mut ids = HashSet::new();
        for id in id_iter {
            ids.insert(id?);
        }
        Ok(ids)
    }

    /// Timestamp of the most recent learned-word write for this deck.
    pub fn last_studied(&self) -> Result<Option<DateTime<Local>>, ProgressError> {
        let mut stmt = self
            .conn
            .prepare("SELECT MAX(learned_at) FROM learned_words WHERE deck = ?1")?;

        let latest: Option<String> = stmt.query_row([&self.deck], |row| row.get(0))?;

        Ok(latest.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .ok()
                .map(|dt| dt.with_timezone(&Local))
        }))
    }
}

impl ProgressReporter for SqliteProgressStore {
    fn on_known(&mut self, id: &str) -> Result<(), ProgressError> {
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO learned_words (deck, word_id, learned_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![self.deck, id, Local::now().to_rfc3339()],
        )?;

        Ok(())
    }

    fn on_bulk_reset(&mut self, ids: &[String]) -> Result<(), ProgressError> {
        let tx = self.conn.transaction()?;

        for id in ids {
            tx.execute(
                "DELETE FROM learned_words WHERE deck = ?1 AND word_id = ?2",
                params![self.deck, id],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}

/// In-memory reporter for `--no-progress` runs and tests. Nothing survives
/// the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryProgress {
    learned: HashSet<String>,
}

impl MemoryProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn learned_ids(&self) -> &HashSet<String> {
        &self.learned
    }
}

impl ProgressReporter for MemoryProgress {
    fn on_known(&mut self, id: &str) -> Result<(), ProgressError> {
        self.learned.insert(id.to_string());
        Ok(())
    }

    fn on_bulk_reset(&mut self, ids: &[String]) -> Result<(), ProgressError> {
        for id in ids {
            self.learned.remove(id);
        }
        Ok(())
    }
}
