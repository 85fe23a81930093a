mod common;

use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

#[tokio::test]
async fn signup_login_and_profile() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };

    let user = common::signup(server).await?;
    let (status, body) = common::get_json(server, &user.token, "/api/v1/users/me").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], user.id);
    assert_eq!(body["data"]["email"], user.email.as_str());
    assert_eq!(body["data"]["role"], "ROLE_USER");
    assert!(body["data"].get("password").is_none(), "profile must not expose the hash: {}", body);
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let user = common::signup(server).await?;

    let res = Client::new()
        .post(server.url("/api/v1/users/join"))
        .json(&json!({ "email": user.email, "password": "another-password", "nickname": "twin" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "CONFLICT");

    // The original password still works, so no second row replaced the first
    common::login(server, &user.email, "correct-horse-battery").await?;
    Ok(())
}

#[tokio::test]
async fn login_failures_are_distinguished() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let user = common::signup(server).await?;
    let client = Client::new();

    let res = client
        .post(server.url("/api/v1/users/login"))
        .json(&json!({ "email": user.email, "password": "wrong-password" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(server.url("/api/v1/users/login"))
        .json(&json!({ "email": common::unique("nobody") + "@e2e.enjoytrip.test", "password": "whatever-123" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn profile_edits_are_limited_to_self() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let owner = common::signup(server).await?;
    let other = common::signup(server).await?;
    let client = Client::new();
    let path = server.url(&format!("/api/v1/users/{}", owner.id));

    let res = client
        .put(&path)
        .bearer_auth(&other.token)
        .json(&json!({ "nickname": "hijacked" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(&path)
        .bearer_auth(&owner.token)
        .json(&json!({ "nickname": "wanderer", "image_file_name": "me.png" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Explicit null clears the image while the nickname stays
    let res = client
        .put(&path)
        .bearer_auth(&owner.token)
        .json(&json!({ "image_file_name": null }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let (_, body) = common::get_json(server, &owner.token, &format!("/api/v1/users/{}", owner.id)).await?;
    assert_eq!(body["data"]["nickname"], "wanderer");
    assert!(body["data"]["image_file_name"].is_null());
    Ok(())
}

#[tokio::test]
async fn password_check_and_change() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let user = common::signup(server).await?;
    let client = Client::new();

    let res = client
        .post(server.url("/api/v1/users/password-check"))
        .bearer_auth(&user.token)
        .json(&json!({ "password": "not-my-password" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .put(server.url(&format!("/api/v1/users/{}/password", user.id)))
        .bearer_auth(&user.token)
        .json(&json!({ "old_password": "correct-horse-battery", "new_password": "new-horse-battery" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    common::login(server, &user.email, "new-horse-battery").await?;
    assert!(common::login(server, &user.email, "correct-horse-battery").await.is_err());
    Ok(())
}

#[tokio::test]
async fn password_change_checks_identity_before_the_new_password() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let user = common::signup(server).await?;
    let stranger = common::signup(server).await?;
    let path = server.url(&format!("/api/v1/users/{}/password", user.id));
    let client = Client::new();

    // "short" would fail validation, but the caller is refused first
    let res = client
        .put(&path)
        .bearer_auth(&stranger.token)
        .json(&json!({ "old_password": "correct-horse-battery", "new_password": "short" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(&path)
        .bearer_auth(&user.token)
        .json(&json!({ "old_password": "wrong-horse-battery", "new_password": "short" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .put(&path)
        .bearer_auth(&user.token)
        .json(&json!({ "old_password": "correct-horse-battery", "new_password": "short" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    common::login(server, &user.email, "correct-horse-battery").await?;
    Ok(())
}

#[tokio::test]
async fn refresh_issues_a_new_token() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let user = common::signup(server).await?;

    let res = Client::new()
        .post(server.url("/api/v1/users/refresh-token"))
        .bearer_auth(&user.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let token = body["data"]["access_token"].as_str().unwrap_or_default().to_string();
    assert!(!token.is_empty());

    let (status, _) = common::get_json(server, &token, "/api/v1/users/me").await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn deleting_an_account_removes_it() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let user = common::signup(server).await?;

    let res = Client::new()
        .delete(server.url(&format!("/api/v1/users/{}", user.id)))
        .bearer_auth(&user.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let (status, _) = common::get_json(server, &user.token, &format!("/api/v1/users/{}", user.id)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
