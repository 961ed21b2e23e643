use crate::error::{Result, VaultError};
use crate::models::{Translation, WordEntry};
use log::{debug, info, warn};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};

// --- Schema Definition ---

const SCHEMA_VERSION: u32 = 1;

const CREATE_METADATA_TABLE: &str = "
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);";

// AUTOINCREMENT keeps ordinals from ever being handed out twice.
const CREATE_WORDS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS words (
    ordinal INTEGER PRIMARY KEY AUTOINCREMENT,
    word TEXT NOT NULL UNIQUE,
    translation TEXT NOT NULL, -- JSON blob
    guesses INTEGER NOT NULL DEFAULT 0,
    misses INTEGER NOT NULL DEFAULT 0
);";

/// Column list matching `row_to_entry`.
pub(crate) const ENTRY_COLUMNS: &str = "ordinal, word, translation, guesses, misses";

// --- Initialization Function ---

/// Creates the tables if they don't exist and checks the schema version.
pub fn initialize_database(conn: &mut Connection) -> Result<()> {
    info!(
        "Initializing database schema (version {})...",
        SCHEMA_VERSION
    );
    let tx = conn.transaction()?;

    tx.execute(CREATE_METADATA_TABLE, [])?;
    tx.execute(CREATE_WORDS_TABLE, [])?;

    let existing_version_str: Option<String> = tx
        .query_row(
            "SELECT value FROM metadata WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;

    match existing_version_str {
        Some(v_str) => {
            let existing_version: u32 = v_str.parse().map_err(|e| {
                VaultError::Internal(format!(
                    "Failed to parse existing schema version '{}': {}",
                    v_str, e
                ))
            })?;
            match existing_version.cmp(&SCHEMA_VERSION) {
                std::cmp::Ordering::Less => {
                    warn!(
                        "Database schema version ({}) is older than expected ({}). Updating version.",
                        existing_version, SCHEMA_VERSION
                    );
                    tx.execute(
                        "UPDATE metadata SET value = ?1 WHERE key = 'schema_version'",
                        params![SCHEMA_VERSION.to_string()],
                    )?;
                }
                std::cmp::Ordering::Greater => {
                    warn!(
                        "Database schema version ({}) is newer than expected ({}). Using potentially incompatible schema.",
                        existing_version, SCHEMA_VERSION
                    );
                }
                std::cmp::Ordering::Equal => {
                    debug!(
                        "Database schema version ({}) matches expected version.",
                        existing_version
                    );
                }
            }
        }
        None => {
            tx.execute(
                "INSERT INTO metadata (key, value) VALUES ('schema_version', ?1)",
                params![SCHEMA_VERSION.to_string()],
            )?;
            info!("Set initial schema version in metadata table.");
        }
    }

    tx.commit()?;
    info!("Database schema initialization complete.");
    Ok(())
}

/// Removes every saved word and restarts ordinals at 1.
pub fn clear_database_data(tx: &Transaction) -> Result<()> {
    info!("Clearing saved words...");
    tx.execute("DELETE FROM words", [])?;
    tx.execute("DELETE FROM sqlite_sequence WHERE name = 'words'", [])?;
    info!("Finished clearing data.");
    Ok(())
}

// --- Row Mapping ---

pub(crate) fn translation_to_blob(translation: &Translation) -> Result<String> {
    serde_json::to_string(translation).map_err(VaultError::from)
}

/// Maps a row selected with `ENTRY_COLUMNS` to a `WordEntry`.
pub(crate) fn row_to_entry(row: &Row) -> std::result::Result<WordEntry, rusqlite::Error> {
    let blob: String = row.get("translation")?;
    let translation: Translation = serde_json::from_str(&blob).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(WordEntry {
        ordinal: row.get("ordinal")?,
        word: row.get("word")?,
        translation,
        guesses: row.get("guesses")?,
        misses: row.get("misses")?,
    })
}
