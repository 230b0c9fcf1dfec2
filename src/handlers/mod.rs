pub mod notes;
pub mod system;

pub use notes::notes_post;
pub use system::{health, root};
