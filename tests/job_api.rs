// Job posting endpoints: ownership rules, visibility and pagination.
mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn job_crud_enforces_ownership() {
    let app = TestApp::new();
    let (owner, owner_id) = app.register("poster@example.com").await;
    let (other, _) = app.register("bystander@example.com").await;

    let (status, body) = app
        .post(
            "/jobs",
            Some(&owner),
            json!({ "title": "Build a parser", "description": "CST please" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["owner_id"], json!(owner_id.to_string()));
    assert_eq!(body["responses"], json!(0));
    let id = body["id"].as_str().unwrap().to_string();

    // anyone signed in can read it
    let (status, _) = app.get(&format!("/jobs/{id}"), Some(&other)).await;
    assert_eq!(status, StatusCode::OK);

    // only the owner (or an admin) can write
    let update = json!({ "title": "Taken over", "description": "x" });
    let (status, body) = app
        .put(&format!("/jobs/{id}"), Some(&other), update.clone())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "body: {body}");
    let (status, _) = app.delete(&format!("/jobs/{id}"), Some(&other)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .put(
            &format!("/jobs/{id}"),
            Some(&owner),
            json!({ "title": "Build a faster parser", "description": "CST please" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], json!("Build a faster parser"));
    // the update cannot touch the counter
    assert_eq!(body["responses"], json!(0));

    let admin = app.seed_admin().await;
    let (status, _) = app
        .put(
            &format!("/jobs/{id}"),
            Some(&admin),
            json!({ "title": "Admin edit", "description": "x" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn soft_deleted_jobs_need_the_flag_to_be_seen() {
    let app = TestApp::new();
    let (owner, _) = app.register("fleeting@example.com").await;
    let id = app.create_job(&owner, "Short-lived gig").await;

    let (status, body) = app.delete(&format!("/jobs/{id}"), Some(&owner)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));

    let (status, _) = app.get(&format!("/jobs/{id}"), Some(&owner)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .get(&format!("/jobs/{id}?include_deleted=true"), Some(&owner))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["deleted_at"].is_string());

    // purging an already soft-deleted posting works with both flags
    let (status, _) = app
        .delete(
            &format!("/jobs/{id}?include_deleted=true&hard=true"),
            Some(&owner),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .get(&format!("/jobs/{id}?include_deleted=true"), Some(&owner))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_splits_cleanly_into_pages() {
    let app = TestApp::new();
    let (owner, _) = app.register("lister@example.com").await;
    for n in 0..5 {
        app.create_job(&owner, &format!("job-{n}")).await;
    }

    let (_, all) = app.get("/jobs?limit=0", Some(&owner)).await;
    let all_ids: Vec<String> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(all_ids.len(), 5);

    // consecutive pages partition the full listing in order
    let mut paged: Vec<String> = Vec::new();
    for page in 1..=3 {
        let (_, body) = app
            .get(&format!("/jobs?page={page}&limit=2"), Some(&owner))
            .await;
        for job in body.as_array().unwrap() {
            paged.push(job["id"].as_str().unwrap().to_string());
        }
    }
    assert_eq!(paged, all_ids);

    // page zero behaves like page one
    let (_, first) = app.get("/jobs?page=1&limit=2", Some(&owner)).await;
    let (_, clamped) = app.get("/jobs?page=0&limit=2", Some(&owner)).await;
    assert_eq!(first, clamped);
}

#[tokio::test]
async fn mine_only_lists_the_callers_postings() {
    let app = TestApp::new();
    let (a, _) = app.register("a@example.com").await;
    let (b, _) = app.register("b@example.com").await;
    app.create_job(&a, "first").await;
    app.create_job(&a, "second").await;
    app.create_job(&b, "third").await;

    let (status, body) = app.get("/jobs/mine", Some(&a)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = app.get("/jobs/mine", Some(&b)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = app.get("/jobs", Some(&b)).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn job_listing_filters_by_title_prefix() {
    let app = TestApp::new();
    let (owner, _) = app.register("filters@example.com").await;
    app.create_job(&owner, "Rust backend").await;
    app.create_job(&owner, "Rust CLI").await;
    app.create_job(&owner, "Go service").await;

    let (status, body) = app.get("/jobs?field=title&value=rust", Some(&owner)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = app.get("/jobs?field=responses&value=0", Some(&owner)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_title_is_rejected() {
    let app = TestApp::new();
    let (owner, _) = app.register("blank@example.com").await;
    let (status, body) = app
        .post(
            "/jobs",
            Some(&owner),
            json!({ "title": "   ", "description": "whitespace only" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));
}
