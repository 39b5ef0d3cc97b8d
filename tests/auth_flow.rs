// Registration, login and refresh through the full router.
mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn public_surface_answers_without_credentials() {
    let app = TestApp::new();

    let (status, body) = app.get("/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], json!("gigboard"));

    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
}

#[tokio::test]
async fn register_returns_tokens_and_credential_free_profile() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/auth/register",
            None,
            json!({
                "first_name": "Rio",
                "last_name": "Dev",
                "email": "rio@example.com",
                "password": "long-enough-pw",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());
    assert_eq!(body["client"]["email"], json!("rio@example.com"));
    assert_eq!(body["client"]["role"], json!("client"));
    assert!(body["client"].get("password_hash").is_none());
    assert!(body["client"].get("refresh_token_hash").is_none());
}

#[tokio::test]
async fn duplicate_email_registration_is_conflict() {
    let app = TestApp::new();
    app.register("taken@example.com").await;

    let (status, body) = app
        .post(
            "/auth/register",
            None,
            json!({
                "first_name": "Second",
                "last_name": "Try",
                "email": "taken@example.com",
                "password": "long-enough-pw",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], json!("CONFLICT"));
    assert_eq!(body["error"], json!(true));
}

#[tokio::test]
async fn register_rejects_malformed_input() {
    let app = TestApp::new();
    let cases = [
        json!({ "first_name": "", "last_name": "Dev", "email": "a@b.c", "password": "long-enough-pw" }),
        json!({ "first_name": "Rio", "last_name": "Dev", "email": "not-an-address", "password": "long-enough-pw" }),
        json!({ "first_name": "Rio", "last_name": "Dev", "email": "a@b.c", "password": "short" }),
    ];
    for case in cases {
        let (status, body) = app.post("/auth/register", None, case).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(body["code"], json!("VALIDATION_ERROR"));
    }
}

#[tokio::test]
async fn login_distinguishes_wrong_password_from_unknown_account() {
    let app = TestApp::new();
    app.register("known@example.com").await;

    // wrong password on an existing account: 401
    let (status, body) = app
        .post(
            "/auth/login",
            None,
            json!({ "email": "known@example.com", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!("UNAUTHORIZED"));

    // unknown account: 400, not 401
    let (status, body) = app
        .post(
            "/auth/login",
            None,
            json!({ "email": "nobody@example.com", "password": "long-enough-pw" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));

    // right password: 200 with a fresh pair
    let (status, body) = app
        .post(
            "/auth/login",
            None,
            json!({ "email": "known@example.com", "password": "long-enough-pw" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());
}

#[tokio::test]
async fn deleted_account_cannot_log_in() {
    let app = TestApp::new();
    let (token, _) = app.register("leaver@example.com").await;

    let (status, _) = app.delete("/clients/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            "/auth/login",
            None,
            json!({ "email": "leaver@example.com", "password": "long-enough-pw" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    // same answer as for an address that never existed
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));
}

#[tokio::test]
async fn refresh_rotates_and_invalidates_the_presented_token() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/auth/register",
            None,
            json!({
                "first_name": "Rot",
                "last_name": "Ate",
                "email": "rotate@example.com",
                "password": "long-enough-pw",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let first_refresh = body["refresh_token"].as_str().unwrap().to_string();

    let (status, body) = app
        .post(
            "/auth/refresh",
            None,
            json!({ "refresh_token": first_refresh }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let second_refresh = body["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(first_refresh, second_refresh);

    // the first token was superseded by the exchange
    let (status, body) = app
        .post(
            "/auth/refresh",
            None,
            json!({ "refresh_token": first_refresh }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "body: {body}");

    // the freshly issued one still works
    let (status, _) = app
        .post(
            "/auth/refresh",
            None,
            json!({ "refresh_token": second_refresh }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn token_kinds_are_not_interchangeable() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/auth/register",
            None,
            json!({
                "first_name": "Kin",
                "last_name": "Dred",
                "email": "kinds@example.com",
                "password": "long-enough-pw",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let access = body["access_token"].as_str().unwrap().to_string();
    let refresh = body["refresh_token"].as_str().unwrap().to_string();

    // refresh token presented as a bearer credential
    let (status, _) = app.get("/clients/me", Some(&refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // access token presented for exchange
    let (status, _) = app
        .post("/auth/refresh", None, json!({ "refresh_token": access }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_reject_missing_and_garbage_tokens() {
    let app = TestApp::new();

    let (status, body) = app.get("/clients/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!("UNAUTHORIZED"));

    let (status, _) = app.get("/clients/me", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
