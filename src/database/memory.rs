use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{NewNote, NewUser, Note, NotePatch, User};
use super::store::{NoteStore, StoreError};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    notes: HashMap<Uuid, Note>,
}

/// In-process store for tests and `serve --in-memory`.
///
/// Mirrors the PostgreSQL constraints that the access layer relies on:
/// unique `subject_id`, notes referencing an existing user, non-empty titles.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    calls: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trait calls served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn note_count(&self) -> usize {
        self.tables.read().await.notes.len()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Next `updated_at` value, strictly after the previous one
fn advance(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn find_user_by_subject_id(&self, subject_id: &str) -> Result<Option<User>, StoreError> {
        self.record_call();
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.subject_id == subject_id)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.record_call();
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.subject_id == user.subject_id) {
            return Err(StoreError::UniqueViolation("users_subject_id_key".to_string()));
        }

        let created = User {
            id: Uuid::new_v4(),
            subject_id: user.subject_id,
            email: user.email,
            name: user.name,
            avatar: user.avatar,
            created_at: Utc::now(),
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_note_by_id(&self, id: Uuid) -> Result<Option<Note>, StoreError> {
        self.record_call();
        Ok(self.tables.read().await.notes.get(&id).cloned())
    }

    async fn find_notes_by_user_id(&self, user_id: Uuid) -> Result<Vec<Note>, StoreError> {
        self.record_call();
        let tables = self.tables.read().await;
        let mut notes: Vec<Note> = tables
            .notes
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(notes)
    }

    async fn create_note(&self, note: NewNote) -> Result<Note, StoreError> {
        self.record_call();
        if note.title.is_empty() {
            return Err(StoreError::Constraint("notes_title_check".to_string()));
        }
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&note.user_id) {
            return Err(StoreError::Constraint(format!(
                "notes_user_id_fkey: user {} does not exist",
                note.user_id
            )));
        }

        let now = Utc::now();
        let created = Note {
            id: Uuid::new_v4(),
            title: note.title,
            content: note.content,
            user_id: note.user_id,
            created_at: now,
            updated_at: now,
        };
        tables.notes.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_note(&self, id: Uuid, patch: NotePatch) -> Result<Option<Note>, StoreError> {
        self.record_call();
        let mut tables = self.tables.write().await;
        let Some(note) = tables.notes.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            note.title = title;
        }
        if let Some(content) = patch.content {
            note.content = content;
        }
        note.updated_at = advance(note.updated_at);
        Ok(Some(note.clone()))
    }

    async fn delete_note(&self, id: Uuid) -> Result<bool, StoreError> {
        self.record_call();
        Ok(self.tables.write().await.notes.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
