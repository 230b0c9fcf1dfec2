use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::models::{NewNote, NewUser, Note, NotePatch, User};

/// Errors surfaced by a [`NoteStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (e.g. a second user for one subject)
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Foreign key or check constraint rejected the write
    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl StoreError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::UniqueViolation(db.constraint().unwrap_or("unknown").to_string())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() || db.is_check_violation() => {
                StoreError::Constraint(db.message().to_string())
            }
            sqlx::Error::PoolTimedOut => StoreError::Unavailable("connection pool timed out".to_string()),
            sqlx::Error::PoolClosed => StoreError::Unavailable("connection pool closed".to_string()),
            other => StoreError::Sqlx(other),
        }
    }
}

/// Persistence capability for users and their notes.
///
/// Implementations must enforce uniqueness of `User::subject_id` and report a
/// duplicate insert as [`StoreError::UniqueViolation`].
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn find_user_by_subject_id(&self, subject_id: &str) -> Result<Option<User>, StoreError>;

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_note_by_id(&self, id: Uuid) -> Result<Option<Note>, StoreError>;

    /// Notes owned by `user_id`, most recently updated first
    async fn find_notes_by_user_id(&self, user_id: Uuid) -> Result<Vec<Note>, StoreError>;

    async fn create_note(&self, note: NewNote) -> Result<Note, StoreError>;

    /// Applies the supplied fields and refreshes `updated_at`. `None` if the note is gone.
    async fn update_note(&self, id: Uuid, patch: NotePatch) -> Result<Option<Note>, StoreError>;

    /// Returns whether a row was removed
    async fn delete_note(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Cheap connectivity probe used by the health route
    async fn ping(&self) -> Result<(), StoreError>;
}
