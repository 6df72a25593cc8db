//! Integration tests for the health endpoint.

mod helpers;

use http::StatusCode;

use helpers::TestApp;

#[tokio::test]
async fn test_health_reports_backends() {
    let app = TestApp::new();

    let response = app.request_as(None, "GET", "/api/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["database"], "memory");
    assert_eq!(response.data()["database_ok"], true);
    assert_eq!(response.data()["storage_ok"], true);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/nothing-here", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
