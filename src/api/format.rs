use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::database::{Note, User};
use crate::services::{OwnedNote, UserWithNotes};

/// Wire shape of a user nested under a note
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub subject_id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Wire shape of the `me` result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub subject_id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub notes: Vec<NoteView>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub user_id: Uuid,
    pub user: UserSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            subject_id: user.subject_id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            avatar: user.avatar.clone(),
            created_at: user.created_at,
        }
    }
}

impl NoteView {
    fn new(note: Note, owner: UserSummary) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            user_id: note.user_id,
            user: owner,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

impl From<OwnedNote> for NoteView {
    fn from(owned: OwnedNote) -> Self {
        let owner = UserSummary::from(&owned.owner);
        Self::new(owned.note, owner)
    }
}

impl From<UserWithNotes> for UserView {
    fn from(value: UserWithNotes) -> Self {
        let UserWithNotes { user, notes } = value;
        let summary = UserSummary::from(&user);

        Self {
            id: user.id,
            subject_id: user.subject_id,
            email: user.email,
            name: user.name,
            avatar: user.avatar,
            notes: notes
                .into_iter()
                .map(|note| NoteView::new(note, summary.clone()))
                .collect(),
            created_at: user.created_at,
        }
    }
}
