use thiserror::Error;

/// Custom Result type for this crate.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Enum representing all possible errors in the wordvault library.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Translation (de)serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Data directory not found or could not be determined")]
    DataDirNotFound,

    #[error("The vault is empty, no word available")]
    EmptyStore,

    #[error("No quiz word has been drawn yet")]
    NoActiveQuiz,

    #[error("Nothing has been translated yet")]
    NothingPending,

    #[error("No word stored at ordinal {0}")]
    OrdinalNotFound(i64),

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Internal error: {0}")]
    Internal(String), // For unexpected situations
}
