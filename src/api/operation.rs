use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Identity;
use crate::services::{CreateNoteInput, NoteError, NoteService, UpdateNoteInput};

use super::format::{NoteView, UserView};

/// One request to the notes endpoint, tagged by `operation`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum Operation {
    /// Query: the acting user with their notes (provisions on demand)
    Me,
    /// Query: the acting user's notes (never provisions)
    MyNotes,
    /// Query: a single owned note
    Note { id: Uuid },
    CreateNote { input: CreateNoteInput },
    UpdateNote { id: Uuid, input: UpdateNoteInput },
    DeleteNote { id: Uuid },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Me => "me",
            Operation::MyNotes => "myNotes",
            Operation::Note { .. } => "note",
            Operation::CreateNote { .. } => "createNote",
            Operation::UpdateNote { .. } => "updateNote",
            Operation::DeleteNote { .. } => "deleteNote",
        }
    }
}

/// Result payload of an [`Operation`]
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OperationOutput {
    User(UserView),
    Notes(Vec<NoteView>),
    Note(NoteView),
    Deleted(bool),
}

/// Run `operation` on behalf of `identity` through the access control layer
pub async fn execute(
    service: &NoteService,
    identity: Option<&Identity>,
    operation: Operation,
) -> Result<OperationOutput, NoteError> {
    let output = match operation {
        Operation::Me => OperationOutput::User(service.fetch_current_user(identity).await?.into()),
        Operation::MyNotes => OperationOutput::Notes(
            service
                .fetch_my_notes(identity)
                .await?
                .into_iter()
                .map(NoteView::from)
                .collect(),
        ),
        Operation::Note { id } => OperationOutput::Note(service.fetch_note(identity, id).await?.into()),
        Operation::CreateNote { input } => {
            OperationOutput::Note(service.create_note(identity, input).await?.into())
        }
        Operation::UpdateNote { id, input } => {
            OperationOutput::Note(service.update_note(identity, id, input).await?.into())
        }
        Operation::DeleteNote { id } => OperationOutput::Deleted(service.delete_note(identity, id).await?),
    };

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn parses_tagged_requests() {
        let id = Uuid::new_v4();

        let me: Operation = serde_json::from_value(json!({ "operation": "me" })).unwrap();
        assert_eq!(me, Operation::Me);

        let update: Operation = serde_json::from_value(json!({
            "operation": "updateNote",
            "id": id,
            "input": { "title": "New" }
        }))
        .unwrap();
        assert_eq!(
            update,
            Operation::UpdateNote {
                id,
                input: UpdateNoteInput { title: Some("New".into()), content: None },
            }
        );
    }

    #[test]
    fn rejects_unknown_operation_and_missing_fields() {
        assert!(serde_json::from_value::<Operation>(json!({ "operation": "dropTables" })).is_err());
        assert!(serde_json::from_value::<Operation>(json!({ "operation": "note" })).is_err());
        assert!(serde_json::from_value::<Operation>(json!({
            "operation": "createNote",
            "input": { "content": "no title" }
        }))
        .is_err());
    }

    #[tokio::test]
    async fn create_then_list_round_trip() {
        let service = NoteService::new(Arc::new(MemoryStore::new()));
        let who = Identity::new("auth0|1", "a@x.com");

        let created = execute(
            &service,
            Some(&who),
            Operation::CreateNote {
                input: CreateNoteInput { title: "Shopping".into(), content: "milk".into() },
            },
        )
        .await
        .unwrap();
        let OperationOutput::Note(note) = created else {
            panic!("expected a note");
        };

        let listed = serde_json::to_value(execute(&service, Some(&who), Operation::MyNotes).await.unwrap()).unwrap();
        assert_eq!(listed.as_array().map(Vec::len), Some(1));
        assert_eq!(listed[0]["id"], note.id.to_string());

        let deleted = execute(&service, Some(&who), Operation::DeleteNote { id: note.id }).await.unwrap();
        assert_eq!(serde_json::to_value(deleted).unwrap(), json!(true));
    }
}
