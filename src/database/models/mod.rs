pub mod note;
pub mod user;

pub use note::{NewNote, Note, NotePatch};
pub use user::{NewUser, User};
