use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::Identity;
use crate::database::{NewNote, Note, NotePatch, NoteStore, StoreError, User};

use super::identity_service::IdentityService;

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("Not authenticated")]
    Unauthenticated,

    /// Missing note or a note owned by someone else; the two are never distinguished
    #[error("Note not found")]
    NotFound,

    /// The acting identity has no user record and the operation does not provision one
    #[error("User not found")]
    UserNotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateNoteInput {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateNoteInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl From<UpdateNoteInput> for NotePatch {
    fn from(input: UpdateNoteInput) -> Self {
        Self {
            title: input.title,
            content: input.content,
        }
    }
}

/// A note together with its owner, who is always the acting user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedNote {
    pub note: Note,
    pub owner: User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWithNotes {
    pub user: User,
    pub notes: Vec<Note>,
}

/// Owner-scoped note operations.
///
/// Every call authenticates first (no store access without an identity),
/// then resolves the acting user, then checks ownership of any note it names.
#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn NoteStore>,
    identities: IdentityService,
}

impl NoteService {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self {
            identities: IdentityService::new(store.clone()),
            store,
        }
    }

    /// The acting user (provisioned on demand) with all of their notes
    pub async fn fetch_current_user(&self, identity: Option<&Identity>) -> Result<UserWithNotes, NoteError> {
        let identity = authenticate(identity)?;
        let user = self.identities.resolve_or_provision_user(identity).await?;
        let notes = self.store.find_notes_by_user_id(user.id).await?;

        Ok(UserWithNotes { user, notes })
    }

    /// Notes of the acting user, newest update first. Never provisions.
    pub async fn fetch_my_notes(&self, identity: Option<&Identity>) -> Result<Vec<OwnedNote>, NoteError> {
        let identity = authenticate(identity)?;
        let Some(user) = self.identities.find_user(identity).await? else {
            debug!("No user yet for subject '{}', returning empty note list", identity.subject_id);
            return Ok(Vec::new());
        };

        let notes = self.store.find_notes_by_user_id(user.id).await?;
        Ok(notes
            .into_iter()
            .map(|note| OwnedNote { note, owner: user.clone() })
            .collect())
    }

    pub async fn fetch_note(&self, identity: Option<&Identity>, note_id: Uuid) -> Result<OwnedNote, NoteError> {
        let identity = authenticate(identity)?;
        let user = self.acting_user(identity).await?;
        let note = self.owned_note(&user, note_id).await?;

        Ok(OwnedNote { note, owner: user })
    }

    pub async fn create_note(
        &self,
        identity: Option<&Identity>,
        input: CreateNoteInput,
    ) -> Result<OwnedNote, NoteError> {
        let identity = authenticate(identity)?;
        validate_title(&input.title)?;

        let user = self.identities.resolve_or_provision_user(identity).await?;
        let note = self
            .store
            .create_note(NewNote {
                title: input.title,
                content: input.content,
                user_id: user.id,
            })
            .await?;

        info!("User {} created note {}", user.id, note.id);
        Ok(OwnedNote { note, owner: user })
    }

    /// Apply the supplied fields; omitted fields keep their stored values
    pub async fn update_note(
        &self,
        identity: Option<&Identity>,
        note_id: Uuid,
        input: UpdateNoteInput,
    ) -> Result<OwnedNote, NoteError> {
        let identity = authenticate(identity)?;
        if let Some(title) = &input.title {
            validate_title(title)?;
        }

        let user = self.acting_user(identity).await?;
        self.owned_note(&user, note_id).await?;

        // A concurrent delete between the ownership check and here reads as NotFound
        let note = self
            .store
            .update_note(note_id, input.into())
            .await?
            .ok_or(NoteError::NotFound)?;

        debug!("User {} updated note {}", user.id, note.id);
        Ok(OwnedNote { note, owner: user })
    }

    pub async fn delete_note(&self, identity: Option<&Identity>, note_id: Uuid) -> Result<bool, NoteError> {
        let identity = authenticate(identity)?;
        let user = self.acting_user(identity).await?;
        self.owned_note(&user, note_id).await?;

        if !self.store.delete_note(note_id).await? {
            return Err(NoteError::NotFound);
        }

        info!("User {} deleted note {}", user.id, note_id);
        Ok(true)
    }

    async fn acting_user(&self, identity: &Identity) -> Result<User, NoteError> {
        self.identities
            .find_user(identity)
            .await?
            .ok_or(NoteError::UserNotFound)
    }

    async fn owned_note(&self, user: &User, note_id: Uuid) -> Result<Note, NoteError> {
        match self.store.find_note_by_id(note_id).await? {
            Some(note) if note.is_owned_by(user.id) => Ok(note),
            Some(_) => {
                debug!("User {} denied access to note {}", user.id, note_id);
                Err(NoteError::NotFound)
            }
            None => Err(NoteError::NotFound),
        }
    }
}

fn authenticate(identity: Option<&Identity>) -> Result<&Identity, NoteError> {
    identity.ok_or(NoteError::Unauthenticated)
}

fn validate_title(title: &str) -> Result<(), NoteError> {
    if title.trim().is_empty() {
        return Err(NoteError::Validation("title must not be empty".to_string()));
    }
    Ok(())
}
