mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{id_of, message, TestServer};

#[tokio::test]
async fn me_returns_public_profile() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.signup("dj_shadow").await?;

    let res = server.get("/users/me", &user.token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["_id"], user.id.as_str());
    assert_eq!(body["username"], "dj_shadow");
    assert!(body.get("passwordHash").is_none());
    Ok(())
}

#[tokio::test]
async fn patch_updates_profile_and_password() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.signup("dj_shadow").await?;

    let res = server
        .patch(
            "/users/me",
            &user.token,
            &json!({ "phoneNumber": "+44 20 7946 0958", "gender": "other", "password": "new-pass" }),
        )
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["gender"], "other");
    assert_eq!(body["phoneNumber"], "+44 20 7946 0958");

    assert_eq!(server.login(&user.email, "hunter2").await?.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(server.login(&user.email, "new-pass").await?.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn patch_rechecks_uniqueness() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.signup("dj_shadow").await?;
    server.signup("cut_chemist").await?;

    let res = server
        .patch("/users/me", &user.token, &json!({ "username": "cut_chemist" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(message(res).await?, "Username already taken");

    let res = server
        .patch("/users/me", &user.token, &json!({ "email": "cut_chemist@example.com" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(message(res).await?, "Email already in use");

    // keeping your own values is not a clash
    let res = server
        .patch("/users/me", &user.token, &json!({ "username": "dj_shadow" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn delete_removes_account_and_content() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.signup("dj_shadow").await?;
    let other = server.signup("cut_chemist").await?;
    let track = server.create_track(&user, json!({ "title": "Midnight" })).await?;
    let kept = server.create_track(&other, json!({ "title": "Kept" })).await?;

    let res = server.delete("/users/me", &user.token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // token still verifies but the account is gone
    let res = server.get("/users/me", &user.token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(message(res).await?, "User not found");

    let res = server
        .get(&format!("/tracks/{}", id_of(&track)), &other.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server
        .get(&format!("/tracks/{}", id_of(&kept)), &other.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn token_of_deleted_account_cannot_create() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.signup("dj_shadow").await?;

    let res = server.delete("/users/me", &user.token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server
        .post("/tracks", &user.token, &json!({ "title": "Ghost" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(message(res).await?, "User is not authorized");

    let res = server
        .post("/playlists", &user.token, &json!({ "title": "Ghost" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(message(res).await?, "User is not authorized");

    let tracks = server.get("/tracks", &user.token).send().await?.json::<Vec<Value>>().await?;
    assert!(tracks.is_empty());
    Ok(())
}

#[tokio::test]
async fn patch_clears_optional_profile_fields() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.signup("dj_shadow").await?;

    let res = server
        .patch(
            "/users/me",
            &user.token,
            &json!({ "phoneNumber": "555-0100-22", "gender": "female", "birthDate": "1990-04-01" }),
        )
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // absent keys leave values alone
    let res = server
        .patch("/users/me", &user.token, &json!({ "username": "dj_shadow2" }))
        .send()
        .await?;
    let body = res.json::<Value>().await?;
    assert_eq!(body["gender"], "female");
    assert_eq!(body["birthDate"], "1990-04-01");

    let res = server
        .patch(
            "/users/me",
            &user.token,
            &json!({ "phoneNumber": null, "gender": "", "birthDate": null }),
        )
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert!(body.get("phoneNumber").is_none());
    assert!(body.get("gender").is_none());
    assert!(body.get("birthDate").is_none());

    let stored = server.get("/users/me", &user.token).send().await?.json::<Value>().await?;
    assert!(stored.get("gender").is_none());
    Ok(())
}
