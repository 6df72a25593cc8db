//! Integration tests for batch upload and single-resource operations.

mod helpers;

use http::StatusCode;
use serde_json::json;

use helpers::{TestApp, png, str_of};

#[tokio::test]
async fn test_upload_reports_partial_failures() {
    let app = TestApp::new();
    let ui = app.create_folder("texture", None, "ui").await;
    let folder_id = str_of(&ui, "id");

    let first = app
        .upload(
            &[("target_folder_id", folder_id)],
            &[("icon.png", png(4, 2))],
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["success"], true);
    assert_eq!(first.data()[0]["width"], 4);
    assert_eq!(first.data()[0]["height"], 2);
    assert_eq!(first.data()[0]["format"], "png");

    let second = app
        .upload(
            &[("target_folder_id", folder_id), ("tags", "ui, hud")],
            &[
                ("icon.png", png(1, 1)),
                ("badge.png", png(1, 1)),
                ("broken.png", b"not an image".to_vec()),
            ],
        )
        .await;

    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["success"], true);
    let created = second.data().as_array().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(str_of(&created[0], "name"), "badge");
    assert_eq!(created[0]["tags"], json!(["ui", "hud"]));

    let errors = second.errors();
    assert_eq!(errors.len(), 2);
    assert!(errors.contains(&"Resource \"icon.png\" already exists".to_string()));
    assert!(errors.contains(&"Resource \"broken.png\" is not a readable image".to_string()));
}

#[tokio::test]
async fn test_upload_to_path_creates_missing_folders() {
    let app = TestApp::new();

    let response = app
        .upload(
            &[("category", "block"), ("path", "terrain.stone")],
            &[("granite.json", b"{\"hardness\":3}".to_vec())],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let resource = &response.data()[0];
    assert_eq!(str_of(resource, "file_path"), "terrain.stone.granite");
    assert_eq!(str_of(resource, "format"), "json");

    let roots = app.request("GET", "/api/folders?category=block", None).await;
    let names: Vec<&str> = roots
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|f| str_of(f, "name"))
        .collect();
    assert_eq!(names, vec!["blocks", "terrain"]);
}

#[tokio::test]
async fn test_upload_with_only_failures_is_unsuccessful() {
    let app = TestApp::new();

    let response = app
        .upload(
            &[("category", "material")],
            &[("a.json", b"{}".to_vec()), ("a.json", b"{}".to_vec())],
        )
        .await;
    assert_eq!(response.body["success"], true);
    assert_eq!(response.errors(), vec!["Resource \"a.json\" already exists"]);

    let again = app
        .upload(&[("category", "material")], &[("a.json", b"{}".to_vec())])
        .await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.body["success"], false);
    assert_eq!(again.data().as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_upload_requires_a_target() {
    let app = TestApp::new();

    let response = app.upload(&[], &[("a.png", png(1, 1))]).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_update_move_and_usage() {
    let app = TestApp::new();
    let a = app.create_folder("texture", None, "a").await;
    let b = app.create_folder("texture", None, "b").await;
    let uploaded = app
        .upload(
            &[("target_folder_id", str_of(&a, "id"))],
            &[("icon.png", png(1, 1))],
        )
        .await;
    let id = str_of(&uploaded.data()[0], "id").to_string();

    let updated = app
        .request(
            "PUT",
            &format!("/api/resources/{id}"),
            Some(json!({ "name": "badge", "description": "small", "is_public": true })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(str_of(updated.data(), "file_path"), "a.badge");
    assert_eq!(updated.data()["is_public"], true);

    let moved = app
        .request(
            "PUT",
            &format!("/api/resources/{id}/move"),
            Some(json!({ "target_folder_id": str_of(&b, "id") })),
        )
        .await;
    assert_eq!(moved.status, StatusCode::OK);
    assert_eq!(str_of(moved.data(), "file_path"), "b.badge");

    app.request("POST", &format!("/api/resources/{id}/usage"), None)
        .await;
    let used = app
        .request("POST", &format!("/api/resources/{id}/usage"), None)
        .await;
    assert_eq!(used.data()["usage_count"], 2);

    let listed = app
        .request(
            "GET",
            &format!("/api/folders/{}/resources", str_of(&b, "id")),
            None,
        )
        .await;
    assert_eq!(listed.data().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_rename_into_taken_name_conflicts() {
    let app = TestApp::new();
    let a = app.create_folder("texture", None, "a").await;
    let uploaded = app
        .upload(
            &[("target_folder_id", str_of(&a, "id"))],
            &[("one.png", png(1, 1)), ("two.png", png(2, 2))],
        )
        .await;
    let one = str_of(&uploaded.data()[0], "id").to_string();

    let response = app
        .request(
            "PUT",
            &format!("/api/resources/{one}"),
            Some(json!({ "name": "two" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_keeps_shared_file_until_last_reference() {
    let app = TestApp::new();
    let a = app.create_folder("texture", None, "a").await;
    let shared = png(2, 2);
    let uploaded = app
        .upload(
            &[("target_folder_id", str_of(&a, "id"))],
            &[("one.png", shared.clone()), ("two.png", shared)],
        )
        .await;
    let ids: Vec<String> = uploaded
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|r| str_of(r, "id").to_string())
        .collect();
    assert_eq!(ids.len(), 2);
    assert_eq!(app.objects.len().await, 1);

    let first = app
        .request("DELETE", &format!("/api/resources/{}", ids[0]), None)
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.data()["files_preserved"], 1);
    assert_eq!(app.objects.len().await, 1);

    let second = app
        .request("DELETE", &format!("/api/resources/{}", ids[1]), None)
        .await;
    assert_eq!(second.data()["files_unlinked"], 1);
    assert!(app.objects.is_empty().await);

    let gone = app
        .request("GET", &format!("/api/resources/{}", ids[1]), None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}
