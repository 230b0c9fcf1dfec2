pub mod format;
pub mod operation;

pub use format::{NoteView, UserSummary, UserView};
pub use operation::{execute, Operation, OperationOutput};
