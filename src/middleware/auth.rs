use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::Identity;
use crate::state::AppState;

/// Identity attached to the request by [`session_middleware`]; `None` for anonymous requests
#[derive(Clone, Debug, Default)]
pub struct CurrentIdentity(pub Option<Identity>);

impl CurrentIdentity {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

/// Resolves the session for every request and injects it as [`CurrentIdentity`].
///
/// Never rejects: whether an operation needs an identity is decided by the
/// access control layer, which answers `UNAUTHENTICATED` itself.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = state.sessions.current_identity(request.headers()).await;

    match &identity {
        Some(identity) => tracing::debug!("Request authenticated as subject '{}'", identity.subject_id),
        None => tracing::debug!("Anonymous request"),
    }

    request.extensions_mut().insert(CurrentIdentity(identity));
    next.run(request).await
}
