mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{token_for, TestServer};

#[tokio::test]
async fn create_list_and_isolate_notes() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = token_for("auth0|1", "a@x.com");
    let bob = token_for("auth0|2", "b@x.com");

    // First mutation provisions the user
    let (status, body) = server
        .call(
            Some(&alice),
            json!({ "operation": "createNote", "input": { "title": "Shopping", "content": "milk" } }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
    let note = &body["data"];
    assert_eq!(note["title"], "Shopping");
    assert_eq!(note["content"], "milk");
    assert_eq!(note["user"]["subjectId"], "auth0|1");
    assert_eq!(note["userId"], note["user"]["id"]);
    assert_eq!(server.store.user_count().await, 1);

    // Same identity sees exactly that note
    let (status, body) = server.call(Some(&alice), json!({ "operation": "myNotes" })).await?;
    assert_eq!(status, StatusCode::OK);
    let notes = body["data"].as_array().expect("myNotes returns an array");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["id"], note["id"]);

    // Another identity cannot see it
    let (status, body) = server
        .call(Some(&bob), json!({ "operation": "note", "id": note["id"] }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn anonymous_requests_are_unauthenticated() -> Result<()> {
    let server = TestServer::start().await?;

    for op in [
        json!({ "operation": "me" }),
        json!({ "operation": "myNotes" }),
        json!({ "operation": "createNote", "input": { "title": "t", "content": "c" } }),
        json!({ "operation": "deleteNote", "id": "00000000-0000-0000-0000-000000000000" }),
    ] {
        let (status, body) = server.call(None, op.clone()).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "for {}", op);
        assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
    }

    assert_eq!(server.store.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn invalid_tokens_are_treated_as_anonymous() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, _) = server
        .call(Some("not.a.token"), json!({ "operation": "myNotes" }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn session_cookie_is_accepted() -> Result<()> {
    let server = TestServer::start().await?;
    let token = token_for("auth0|1", "a@x.com");

    let res = server
        .client()
        .post(format!("{}/api/notes", server.base_url))
        .header("Cookie", format!("{}={}", common::COOKIE_NAME, token))
        .json(&json!({ "operation": "me" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["subjectId"], "auth0|1");
    assert_eq!(body["data"]["email"], "a@x.com");
    assert_eq!(body["data"]["notes"], json!([]));
    Ok(())
}

#[tokio::test]
async fn my_notes_does_not_provision() -> Result<()> {
    let server = TestServer::start().await?;
    let token = token_for("auth0|new", "new@x.com");

    let (status, body) = server.call(Some(&token), json!({ "operation": "myNotes" })).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(server.store.user_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn update_and_delete_lifecycle() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = token_for("auth0|1", "a@x.com");
    let bob = token_for("auth0|2", "b@x.com");

    let (_, created) = server
        .call(
            Some(&alice),
            json!({ "operation": "createNote", "input": { "title": "Shopping", "content": "milk" } }),
        )
        .await?;
    let id = created["data"]["id"].clone();

    let (status, updated) = server
        .call(
            Some(&alice),
            json!({ "operation": "updateNote", "id": id, "input": { "title": "Groceries" } }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["title"], "Groceries");
    assert_eq!(updated["data"]["content"], "milk");

    // Foreign delete is NOT_FOUND and leaves the note alone
    server.call(Some(&bob), json!({ "operation": "me" })).await?;
    let (status, _) = server.call(Some(&bob), json!({ "operation": "deleteNote", "id": id })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(server.store.note_count().await, 1);

    let (status, deleted) = server.call(Some(&alice), json!({ "operation": "deleteNote", "id": id })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["data"], true);

    let (status, body) = server.call(Some(&alice), json!({ "operation": "deleteNote", "id": id })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn malformed_requests_are_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let token = token_for("auth0|1", "a@x.com");

    let (status, body) = server.call(Some(&token), json!({ "operation": "dropTables" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");

    let (status, body) = server
        .call(
            Some(&token),
            json!({ "operation": "createNote", "input": { "title": "", "content": "c" } }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(server.store.note_count().await, 0);
    Ok(())
}
