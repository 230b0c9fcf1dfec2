// handlers/notes.rs - POST /api/notes, the single operation endpoint

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};

use crate::api::{self, Operation, OperationOutput};
use crate::middleware::{ApiResponse, ApiResult, CurrentIdentity};
use crate::state::AppState;

/// POST /api/notes - run one tagged note operation for the session's identity
///
/// ```json
/// { "operation": "createNote", "input": { "title": "Shopping", "content": "milk" } }
/// ```
///
/// Answers `{"success": true, "data": ...}`; `createNote` answers 201.
pub async fn notes_post(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentIdentity>,
    payload: Result<Json<Operation>, JsonRejection>,
) -> ApiResult<OperationOutput> {
    let Json(operation) = payload?;
    let name = operation.name();
    let created = matches!(operation, Operation::CreateNote { .. });

    let output = api::execute(&state.notes, session.identity(), operation)
        .await
        .map_err(|err| {
            tracing::debug!("Operation '{}' failed: {}", name, err);
            err
        })?;

    if created {
        Ok(ApiResponse::created(output))
    } else {
        Ok(ApiResponse::success(output))
    }
}
