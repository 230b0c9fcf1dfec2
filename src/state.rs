use std::sync::Arc;

use crate::auth::SessionProvider;
use crate::database::NoteStore;
use crate::services::NoteService;

/// Shared router state; every collaborator is injected here
#[derive(Clone)]
pub struct AppState {
    pub notes: NoteService,
    pub sessions: Arc<dyn SessionProvider>,
    pub store: Arc<dyn NoteStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn NoteStore>, sessions: Arc<dyn SessionProvider>) -> Self {
        Self {
            notes: NoteService::new(store.clone()),
            sessions,
            store,
        }
    }
}
