pub mod identity_service;
pub mod note_service;

pub use identity_service::IdentityService;
pub use note_service::{CreateNoteInput, NoteError, NoteService, OwnedNote, UpdateNoteInput, UserWithNotes};
