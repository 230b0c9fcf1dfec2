use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{NewNote, NewUser, Note, NotePatch, User};
use super::store::{NoteStore, StoreError};

const USER_COLUMNS: &str = "id, subject_id, email, name, avatar, created_at";
const NOTE_COLUMNS: &str = "id, title, content, user_id, created_at, updated_at";

/// PostgreSQL-backed store over the `users` and `notes` tables
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteStore for PgStore {
    async fn find_user_by_subject_id(&self, subject_id: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE subject_id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(subject_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (subject_id, email, name, avatar) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(&user.subject_id)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.avatar)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn find_note_by_id(&self, id: Uuid) -> Result<Option<Note>, StoreError> {
        let sql = format!("SELECT {} FROM notes WHERE id = $1", NOTE_COLUMNS);
        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(note)
    }

    async fn find_notes_by_user_id(&self, user_id: Uuid) -> Result<Vec<Note>, StoreError> {
        let sql = format!(
            "SELECT {} FROM notes WHERE user_id = $1 ORDER BY updated_at DESC, id",
            NOTE_COLUMNS
        );
        let notes = sqlx::query_as::<_, Note>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(notes)
    }

    async fn create_note(&self, note: NewNote) -> Result<Note, StoreError> {
        let sql = format!(
            "INSERT INTO notes (title, content, user_id) VALUES ($1, $2, $3) RETURNING {}",
            NOTE_COLUMNS
        );
        let created = sqlx::query_as::<_, Note>(&sql)
            .bind(&note.title)
            .bind(&note.content)
            .bind(note.user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_note(&self, id: Uuid, patch: NotePatch) -> Result<Option<Note>, StoreError> {
        // updated_at must strictly advance, including within one transaction
        let sql = format!(
            r#"
            UPDATE notes
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                updated_at = GREATEST(clock_timestamp(), updated_at + interval '1 microsecond')
            WHERE id = $1
            RETURNING {}
            "#,
            NOTE_COLUMNS
        );
        let updated = sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .bind(patch.title)
            .bind(patch.content)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_note(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
