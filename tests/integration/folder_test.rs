//! Integration tests for folder operations.

mod helpers;

use std::io::{Cursor, Read};

use http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use helpers::{TestApp, png, str_of};

/// Find a tree node by path and kind.
fn find_node<'a>(node: &'a Value, path: &str, kind: &str) -> Option<&'a Value> {
    if node["path"] == path && node["kind"] == kind {
        return Some(node);
    }
    node["children"]
        .as_array()?
        .iter()
        .find_map(|c| find_node(c, path, kind))
}

fn child_names(node: &Value) -> Vec<String> {
    node["children"]
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|c| c["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_list_roots_creates_category_root() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/folders?category=texture", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    let folders = response.data().as_array().unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(str_of(&folders[0], "path"), "textures");
}

#[tokio::test]
async fn test_missing_owner_header_is_rejected() {
    let app = TestApp::new();

    let response = app
        .request_as(None, "GET", "/api/folders?category=texture", None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_create_validates_and_rejects_duplicates() {
    let app = TestApp::new();
    app.create_folder("texture", None, "sprites").await;

    let duplicate = app
        .request(
            "POST",
            "/api/folders",
            Some(json!({ "category": "texture", "name": "sprites" })),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.body["code"], "ALREADY_EXISTS");

    let empty = app
        .request(
            "POST",
            "/api/folders",
            Some(json!({ "category": "texture", "name": "" })),
        )
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let dotted = app
        .request(
            "POST",
            "/api/folders",
            Some(json!({ "category": "texture", "name": "a.b" })),
        )
        .await;
    assert_eq!(dotted.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rename_rewrites_subtree_and_resource_paths() {
    let app = TestApp::new();
    let sprites = app.create_folder("texture", None, "sprites").await;
    let ui = app
        .create_folder("texture", Some(str_of(&sprites, "id")), "ui")
        .await;

    let uploaded = app
        .upload(
            &[("target_folder_id", str_of(&ui, "id"))],
            &[("icon.png", png(2, 2))],
        )
        .await;
    assert_eq!(uploaded.status, StatusCode::OK);
    let icon_id = str_of(&uploaded.data()[0], "id").to_string();

    let renamed = app
        .request(
            "PUT",
            &format!("/api/folders/{}", str_of(&sprites, "id")),
            Some(json!({ "name": "assets" })),
        )
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(str_of(renamed.data(), "path"), "assets");

    let child = app
        .request("GET", &format!("/api/folders/{}", str_of(&ui, "id")), None)
        .await;
    assert_eq!(str_of(child.data(), "path"), "assets.ui");

    let icon = app
        .request("GET", &format!("/api/resources/{icon_id}"), None)
        .await;
    assert_eq!(str_of(icon.data(), "file_path"), "assets.ui.icon");

    let tree = app
        .request("GET", "/api/folders/tree?category=texture", None)
        .await;
    assert_eq!(tree.status, StatusCode::OK);
    let root = tree.data();
    assert_eq!(root["kind"], "root");
    assert!(find_node(root, "sprites", "folder").is_none());
    assert!(find_node(root, "assets.ui", "folder").is_some());
    let file = find_node(root, "assets.ui.icon", "file").unwrap();
    assert_eq!(file["resource_id"], icon_id.as_str());
}

#[tokio::test]
async fn test_move_rejects_cycles_and_moves_to_top_level() {
    let app = TestApp::new();
    let a = app.create_folder("texture", None, "a").await;
    let b = app.create_folder("texture", Some(str_of(&a, "id")), "b").await;

    let cycle = app
        .request(
            "PUT",
            &format!("/api/folders/{}/move", str_of(&a, "id")),
            Some(json!({ "target_parent_id": str_of(&b, "id") })),
        )
        .await;
    assert_eq!(cycle.status, StatusCode::BAD_REQUEST);

    let moved = app
        .request(
            "PUT",
            &format!("/api/folders/{}/move", str_of(&b, "id")),
            Some(json!({ "target_parent_id": null })),
        )
        .await;
    assert_eq!(moved.status, StatusCode::OK);
    assert_eq!(str_of(moved.data(), "path"), "b");
    assert!(moved.data()["parent_id"].is_null());
}

#[tokio::test]
async fn test_copy_generates_unique_names() {
    let app = TestApp::new();
    let a = app.create_folder("texture", None, "a").await;
    app.create_folder("texture", Some(str_of(&a, "id")), "inner")
        .await;

    let path = format!("/api/folders/{}/copy", str_of(&a, "id"));
    let first = app.request("POST", &path, Some(json!({}))).await;
    let second = app.request("POST", &path, Some(json!({}))).await;

    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(str_of(first.data(), "name"), "a copy");
    assert_eq!(str_of(second.data(), "name"), "a copy 2");

    let tree = app
        .request("GET", "/api/folders/tree?category=texture", None)
        .await;
    assert!(find_node(tree.data(), "a copy.inner", "folder").is_some());
    assert!(find_node(tree.data(), "a copy 2.inner", "folder").is_some());
}

#[tokio::test]
async fn test_category_root_cannot_be_deleted() {
    let app = TestApp::new();
    let roots = app.request("GET", "/api/folders?category=block", None).await;
    let root_id = str_of(&roots.data()[0], "id").to_string();

    let response = app
        .request("DELETE", &format!("/api/folders/{root_id}"), None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "INVALID_OPERATION");
}

#[tokio::test]
async fn test_delete_and_clear_report_counts() {
    let app = TestApp::new();
    let a = app.create_folder("texture", None, "a").await;
    let b = app.create_folder("texture", Some(str_of(&a, "id")), "b").await;
    app.upload(
        &[("target_folder_id", str_of(&b, "id"))],
        &[("one.png", png(1, 1)), ("two.png", png(2, 1))],
    )
    .await;

    let cleared = app
        .request(
            "POST",
            &format!("/api/folders/{}/clear", str_of(&a, "id")),
            None,
        )
        .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert_eq!(cleared.data()["resources_deleted"], 2);
    assert_eq!(cleared.data()["folders_deleted"], 0);
    assert!(app.objects.is_empty().await);

    let still_there = app
        .request("GET", &format!("/api/folders/{}", str_of(&b, "id")), None)
        .await;
    assert_eq!(still_there.status, StatusCode::OK);

    let deleted = app
        .request("DELETE", &format!("/api/folders/{}", str_of(&a, "id")), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.data()["folders_deleted"], 2);

    let gone = app
        .request("GET", &format!("/api/folders/{}", str_of(&b, "id")), None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_other_owner_sees_nothing() {
    let app = TestApp::new();
    let a = app.create_folder("texture", None, "a").await;

    let response = app
        .request_as(
            Some(Uuid::new_v4()),
            "GET",
            &format!("/api/folders/{}", str_of(&a, "id")),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_download_returns_zip_archive() {
    let app = TestApp::new();
    let sprites = app.create_folder("texture", None, "sprites").await;
    let ui = app
        .create_folder("texture", Some(str_of(&sprites, "id")), "ui")
        .await;
    let icon = png(3, 3);
    app.upload(
        &[("target_folder_id", str_of(&ui, "id"))],
        &[("icon.png", icon.clone())],
    )
    .await;

    let (status, headers, body) = app
        .download(&format!("/api/folders/{}/download", str_of(&sprites, "id")))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["content-type"], "application/zip");
    assert_eq!(headers["x-archive-included"], "1");
    assert_eq!(headers["x-archive-total"], "1");

    let mut zip = zip::ZipArchive::new(Cursor::new(body.to_vec())).unwrap();
    let mut entry = zip.by_name("ui/icon.png").unwrap();
    let mut content = Vec::new();
    entry.read_to_end(&mut content).unwrap();
    assert_eq!(content, icon);
}

#[tokio::test]
async fn test_tree_lists_folders_before_files() {
    let app = TestApp::new();
    let lib = app.create_folder("material", None, "lib").await;
    app.create_folder("material", Some(str_of(&lib, "id")), "zeta")
        .await;
    app.upload(
        &[("target_folder_id", str_of(&lib, "id"))],
        &[("alpha.json", b"{}".to_vec())],
    )
    .await;

    let tree = app
        .request("GET", "/api/folders/tree?category=material", None)
        .await;

    let lib_node = find_node(tree.data(), "lib", "folder").unwrap();
    assert_eq!(child_names(lib_node), vec!["zeta", "alpha"]);
    assert_eq!(child_names(tree.data()), vec!["lib", "materials"]);
}

#[tokio::test]
async fn test_folder_and_resource_cannot_share_a_name() {
    let app = TestApp::new();
    let lib = app.create_folder("material", None, "lib").await;
    let lib_id = str_of(&lib, "id");
    app.upload(&[("target_folder_id", lib_id)], &[("stone.json", b"{}".to_vec())])
        .await;

    let folder = app
        .request(
            "POST",
            "/api/folders",
            Some(json!({ "category": "material", "parent_id": lib_id, "name": "stone" })),
        )
        .await;
    assert_eq!(folder.status, StatusCode::CONFLICT);
    assert_eq!(folder.body["code"], "ALREADY_EXISTS");

    app.create_folder("material", Some(lib_id), "wood").await;
    let upload = app
        .upload(&[("target_folder_id", lib_id)], &[("wood.json", b"{}".to_vec())])
        .await;
    assert_eq!(upload.body["success"], false);
    assert_eq!(upload.errors(), vec!["Resource \"wood.json\" already exists"]);

    let tree = app
        .request("GET", "/api/folders/tree?category=material", None)
        .await;
    let lib_node = find_node(tree.data(), "lib", "folder").unwrap();
    assert_eq!(child_names(lib_node), vec!["wood", "stone"]);
}
