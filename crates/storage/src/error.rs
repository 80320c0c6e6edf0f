use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error("Snapshot encoding error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Failures raised by the scoring engine. All of them abort the whole
/// series computation: totals and ranks for every competitor depend on
/// every other competitor's values being computed under the same rules,
/// so partial results are never returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScoringError {
    #[error("Invalid scoring configuration: {0}")]
    Configuration(String),

    #[error("Score code '{0}' is not defined in the effective rule set")]
    UnresolvedCodeReference(String),

    #[error("Manual code '{code}' for competitor {competitor_id} has no points recorded")]
    MissingManualScore { code: String, competitor_id: Uuid },

    #[error("Race {race_id} is marked as raced but has no scores")]
    IncompleteRaceData { race_id: Uuid },
}

pub type ScoringResult<T> = std::result::Result<T, ScoringError>;
