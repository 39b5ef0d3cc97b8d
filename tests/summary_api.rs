// Skill summary endpoints: owner scoping and pagination.
mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn summary_crud_is_scoped_to_the_owner() {
    let app = TestApp::new();
    let (owner, _) = app.register("owner@example.com").await;
    let (other, _) = app.register("other@example.com").await;

    let id = app.create_summary(&owner, "rust, sql").await;

    // listing only shows the caller's own rows
    let (status, body) = app.get("/summaries", Some(&owner)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    let (_, body) = app.get("/summaries", Some(&other)).await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    // reads by id are open to any signed-in client
    let (status, body) = app.get(&format!("/summaries/{id}"), Some(&other)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["skills"], json!("rust, sql"));

    // writes by a non-owner address nothing
    let update = json!({ "skills": "hijacked", "bio": "x", "languages": "x" });
    let (status, _) = app
        .put(&format!("/summaries/{id}"), Some(&other), update.clone())
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&format!("/summaries/{id}"), Some(&other)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // the owner can do both
    let (status, body) = app
        .put(
            &format!("/summaries/{id}"),
            Some(&owner),
            json!({ "skills": "rust, sql, go", "bio": "updated", "languages": "en, de" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["skills"], json!("rust, sql, go"));

    let (status, body) = app.delete(&format!("/summaries/{id}"), Some(&owner)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));

    let (status, _) = app.get(&format!("/summaries/{id}"), Some(&owner)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn summary_listing_paginates_and_zero_limit_returns_all() {
    let app = TestApp::new();
    let (owner, _) = app.register("many@example.com").await;
    for n in 0..3 {
        app.create_summary(&owner, &format!("skill-{n}")).await;
    }

    let (_, body) = app.get("/summaries?page=1&limit=2", Some(&owner)).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = app.get("/summaries?page=2&limit=2", Some(&owner)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = app.get("/summaries?limit=0", Some(&owner)).await;
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = app.get("/summaries?limit=-1", Some(&owner)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
}
