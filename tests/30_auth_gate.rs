mod common;

use anyhow::Result;
use chrono::Duration;
use reqwest::StatusCode;
use uuid::Uuid;

use common::{message, TestServer, TEST_JWT_SECRET};
use soundshelf_api::auth::{self, Identity};

const MISSING: &str = "User is not authorized or token is missing";
const INVALID: &str = "User is not authorized";

#[tokio::test]
async fn protected_routes_require_a_token() -> Result<()> {
    let server = TestServer::start().await?;

    for path in ["/tracks", "/playlists", "/users/me", "/exports"] {
        let res = server.client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{}", path);
        assert_eq!(message(res).await?, MISSING);
    }
    Ok(())
}

#[tokio::test]
async fn wrong_scheme_counts_as_missing() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .client
        .get(server.url("/tracks"))
        .header("authorization", "Basic ZGo6aHVudGVyMg==")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(message(res).await?, MISSING);
    Ok(())
}

#[tokio::test]
async fn garbage_and_foreign_tokens_are_rejected() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.get("/tracks", "not.a.jwt").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(message(res).await?, INVALID);

    let identity = Identity {
        id: Uuid::new_v4(),
        username: "intruder".to_string(),
        email: "intruder@example.com".to_string(),
    };
    let foreign = auth::issue(&identity, "some-other-secret", Duration::minutes(10))?;
    let res = server.get("/tracks", &foreign).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(message(res).await?, INVALID);
    Ok(())
}

#[tokio::test]
async fn expired_tokens_are_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.signup("dj_shadow").await?;

    let identity = Identity {
        id: user.id.parse()?,
        username: "dj_shadow".to_string(),
        email: user.email.clone(),
    };
    let expired = auth::issue(&identity, TEST_JWT_SECRET, Duration::seconds(-5))?;

    let res = server.get("/users/me", &expired).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(message(res).await?, INVALID);
    Ok(())
}
