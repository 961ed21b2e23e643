// Declare modules
pub mod db;
pub mod error;
pub mod models;
pub mod pager;
pub mod selector;
pub mod session;
pub mod tracker;
pub mod translate;

// Re-export key types for easier use
pub use error::{Result, VaultError};
pub use models::{Definition, Grouped, Outcome, PageInfo, Translation, WordEntry};
pub use pager::{DEFAULT_PAGE_SIZE, Pager};
pub use session::{Session, SessionConfig};
pub use tracker::OutcomeTracker;
pub use translate::{HttpTranslator, Translator, TranslatorConfig};

use db::{ENTRY_COLUMNS, row_to_entry, translation_to_blob};
use directories_next::ProjectDirs;
use log::{debug, error, info};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

const DB_FILENAME: &str = "wordvault.db";

/// Options for opening the vocabulary store.
#[derive(Debug, Default, Clone)]
pub struct VaultOptions {
    /// Optional path to a specific database file to use or create.
    /// If None, the default location based on ProjectDirs will be used.
    pub db_path: Option<PathBuf>,
    /// Remove every saved word after opening.
    pub force_reset: bool,
}

/// The persisted vocabulary: saved words and their quiz counters.
#[derive(Clone)] // Clone is cheap due to Arc<Mutex<...>>
pub struct Vault {
    // The mutex serializes writers, which keeps counter updates free of lost updates.
    conn: Arc<Mutex<Connection>>,
}

// Helper function to open/create the database connection
fn open_db_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
    )?;

    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    debug!("journal_mode set to {}", mode);
    conn.pragma_update(None, "synchronous", "NORMAL")?;

    Ok(conn)
}

impl Vault {
    /// Opens the store at the default per-user location.
    pub fn open_default() -> Result<Self> {
        Self::open(VaultOptions::default())
    }

    /// Opens (creating if needed) the store described by `options`.
    pub fn open(options: VaultOptions) -> Result<Self> {
        let db_path = match options.db_path {
            Some(path) => path,
            None => Self::default_db_path()?,
        };
        info!("Using database path: {:?}", db_path);

        let mut conn = open_db_connection(&db_path)?;
        Self::from_connection(&mut conn, options.force_reset)?;
        Ok(Vault {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens a throwaway store that lives only as long as the returned handle.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        Self::from_connection(&mut conn, false)?;
        Ok(Vault {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn from_connection(conn: &mut Connection, force_reset: bool) -> Result<()> {
        db::initialize_database(conn)?;
        if force_reset {
            info!("Reset requested. Clearing saved words...");
            let tx = conn.transaction()?;
            db::clear_database_data(&tx)?;
            tx.commit()?;
        }
        Ok(())
    }

    /// Gets the default path for the SQLite database file.
    pub fn default_db_path() -> Result<PathBuf> {
        let project_dirs =
            ProjectDirs::from("org", "WordVault", "wordvault").ok_or(VaultError::DataDirNotFound)?;
        let data_dir = project_dirs.data_dir();
        fs::create_dir_all(data_dir)?;
        Ok(data_dir.join(DB_FILENAME))
    }

    /// Deletes the database file along with its WAL and SHM files.
    ///
    /// If `db_path_override` is `None`, the default database path is used.
    /// A missing file is not an error.
    pub fn clear_database(db_path_override: Option<PathBuf>) -> Result<()> {
        let path_to_clear = match db_path_override {
            Some(path) => path,
            None => Self::default_db_path()?,
        };
        info!("Attempting to clear database file: {:?}", path_to_clear);

        if !path_to_clear.exists() {
            info!(
                "Database file not found, nothing to clear: {:?}",
                path_to_clear
            );
            return Ok(());
        }

        if let Err(e) = fs::remove_file(&path_to_clear) {
            error!("Failed to delete database file {:?}: {}", path_to_clear, e);
            return Err(VaultError::Io(e));
        }
        for sibling in journal_siblings(&path_to_clear) {
            if sibling.exists() {
                let _ = fs::remove_file(sibling); // Ignore error if deletion fails
            }
        }
        info!("Successfully deleted database file: {:?}", path_to_clear);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| VaultError::Internal("Mutex poisoned".to_string()))
    }

    // --- Query Methods ---

    /// Saves `word` unless it is already present; returns the number of saved words.
    ///
    /// A duplicate is silently ignored, the first translation stays.
    pub fn insert(&self, word: &str, translation: &Translation) -> Result<u64> {
        if word.is_empty() {
            return Err(VaultError::InvalidArgument(
                "cannot save an empty word".to_string(),
            ));
        }
        let blob = translation_to_blob(translation)?;

        let mut conn_guard = self.lock()?;
        let tx = conn_guard.transaction()?;
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM words WHERE word = ?1)",
            params![word],
            |row| row.get(0),
        )?;
        if exists {
            debug!("insert: '{}' already saved, keeping first translation", word);
        } else {
            tx.execute(
                "INSERT INTO words (word, translation) VALUES (?1, ?2)",
                params![word, blob],
            )?;
            debug!("insert: saved '{}'", word);
        }
        let total = count_words(&tx)?;
        tx.commit()?;
        Ok(total)
    }

    /// Looks a saved word up by its exact text.
    pub fn lookup_by_word(&self, word: &str) -> Result<Option<WordEntry>> {
        debug!("lookup_by_word: '{}'", word);
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM words WHERE word = ?1", ENTRY_COLUMNS);
        conn.query_row(&sql, params![word], row_to_entry)
            .optional()
            .map_err(VaultError::from)
    }

    /// Looks a saved word up by its 1-based insertion position.
    pub fn lookup_by_ordinal(&self, ordinal: i64) -> Result<Option<WordEntry>> {
        debug!("lookup_by_ordinal: {}", ordinal);
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM words WHERE ordinal = ?1", ENTRY_COLUMNS);
        conn.query_row(&sql, params![ordinal], row_to_entry)
            .optional()
            .map_err(VaultError::from)
    }

    /// Returns at most `limit` words in insertion order, skipping the first `offset`.
    pub fn get_range(&self, limit: u64, offset: u64) -> Result<Vec<WordEntry>> {
        debug!("get_range: limit={}, offset={}", limit, offset);
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM words ORDER BY ordinal LIMIT ?1 OFFSET ?2",
            ENTRY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![to_sql_int(limit)?, to_sql_int(offset)?], row_to_entry)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(VaultError::from)
    }

    /// Number of saved words.
    pub fn count(&self) -> Result<u64> {
        let conn = self.lock()?;
        count_words(&conn)
    }

    /// Records one quiz outcome for the word at `ordinal` and returns its new counters.
    pub fn update_outcome(&self, ordinal: i64, succeeded: bool) -> Result<Outcome> {
        let sql = if succeeded {
            "UPDATE words SET guesses = guesses + 1 WHERE ordinal = ?1"
        } else {
            "UPDATE words SET misses = misses + 1 WHERE ordinal = ?1"
        };

        let mut conn_guard = self.lock()?;
        let tx = conn_guard.transaction()?;
        if tx.execute(sql, params![ordinal])? == 0 {
            // Dropping the transaction rolls it back.
            return Err(VaultError::OrdinalNotFound(ordinal));
        }
        let outcome = tx.query_row(
            "SELECT guesses, misses FROM words WHERE ordinal = ?1",
            params![ordinal],
            |row| {
                Ok(Outcome {
                    guesses: row.get(0)?,
                    misses: row.get(1)?,
                })
            },
        )?;
        tx.commit()?;
        debug!(
            "update_outcome: ordinal={}, succeeded={}, now {:?}",
            ordinal, succeeded, outcome
        );
        Ok(outcome)
    }

    /// Sum of misses over every saved word.
    pub fn total_misses(&self) -> Result<u64> {
        let conn = self.lock()?;
        let total: i64 =
            conn.query_row("SELECT COALESCE(SUM(misses), 0) FROM words", [], |row| {
                row.get(0)
            })?;
        Ok(total as u64)
    }

    /// `(ordinal, misses)` of every saved word in insertion order.
    pub fn miss_counts(&self) -> Result<Vec<(i64, u32)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT ordinal, misses FROM words ORDER BY ordinal")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(VaultError::from)
    }
}

/// The `-wal` and `-shm` files SQLite keeps next to `db_path`.
fn journal_siblings(db_path: &Path) -> [PathBuf; 2] {
    ["-wal", "-shm"].map(|suffix| {
        let mut name = db_path.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    })
}

fn count_words(conn: &Connection) -> Result<u64> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;
    Ok(total as u64)
}

fn to_sql_int(value: u64) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| VaultError::InvalidArgument(format!("{} is out of range", value)))
}
