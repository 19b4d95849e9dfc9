mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{TestApp, ADMIN_EMAIL, ADMIN_PASSWORD, PASSWORD};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (status, body) = app.get("/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn login_returns_token_user_and_permissions() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (status, body) = app
        .send(
            reqwest::Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "  ADMIN@example.com ", "password": ADMIN_PASSWORD })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert!(data["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(data["expires_at"].is_string());
    assert_eq!(data["user"]["email"], ADMIN_EMAIL);
    assert!(data["user"].get("password_hash").is_none());
    assert_eq!(data["permissions"].as_array().map(Vec::len), Some(16));
    Ok(())
}

#[tokio::test]
async fn bad_credentials_get_the_same_401() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (wrong_pw, wrong_body) = app
        .send(
            reqwest::Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": ADMIN_EMAIL, "password": "nope-nope" })),
        )
        .await?;
    let (unknown, unknown_body) = app
        .send(
            reqwest::Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ghost@example.com", "password": "nope-nope" })),
        )
        .await?;

    assert_eq!(wrong_pw, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body["message"], unknown_body["message"]);

    let (empty, _) = app
        .send(
            reqwest::Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "", "password": "" })),
        )
        .await?;
    assert_eq!(empty, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn inactive_user_cannot_log_in() -> Result<()> {
    let app = TestApp::spawn().await?;
    let member = app.account_with("writer@example.com", &["blogs.view"]).await?;

    let (status, _) = app
        .put(
            &format!("/api/admin/users/{}", member.id),
            &app.admin.token,
            json!({
                "name": "Member",
                "email": "writer@example.com",
                "user_type_id": member.user_type_id,
                "active": false
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    assert!(app.login("writer@example.com", PASSWORD).await.is_err());
    Ok(())
}

#[tokio::test]
async fn whoami_requires_a_valid_token() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (missing, body) = app.get("/api/auth/whoami", None).await?;
    assert_eq!(missing, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (garbage, _) = app.get("/api/auth/whoami", Some("not.a.jwt")).await?;
    assert_eq!(garbage, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn whoami_reports_current_permissions() -> Result<()> {
    let app = TestApp::spawn().await?;
    let member = app
        .account_with("editor@example.com", &["blogs.view", "blogs.edit"])
        .await?;

    let (status, body) = app.get("/api/auth/whoami", Some(&member.token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "editor@example.com");
    assert_eq!(body["data"]["permissions"], json!(["blogs.edit", "blogs.view"]));
    assert_eq!(body["data"]["user_type"], "Role for editor@example.com");
    Ok(())
}
