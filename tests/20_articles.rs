mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{ensure_server, unique_slug};

#[tokio::test]
async fn article_lifecycle() -> Result<()> {
    let Some(server) = ensure_server().await? else { return Ok(()) };
    let (username, token) = server.signup().await?;
    let slug = unique_slug();

    let resp = server
        .client
        .post(server.url("/articles"))
        .bearer_auth(&token)
        .json(&json!({ "article": { "title": "Hello", "body": "World", "slug": slug } }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await?;
    assert_eq!(body["article"]["slug"], slug.as_str());

    let resp = server
        .client
        .get(server.url(&format!("/articles?author={}", username)))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    let articles = body["articles"].as_array().cloned().unwrap_or_default();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0]["author"]["username"], username.as_str());

    let resp = server
        .client
        .put(server.url(&format!("/articles/{}", slug)))
        .bearer_auth(&token)
        .json(&json!({ "article": { "body": "Updated" } }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body["article"]["title"], "Hello");
    assert_eq!(body["article"]["body"], "Updated");

    let resp = server
        .client
        .delete(server.url(&format!("/articles/{}", slug)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = server
        .client
        .get(server.url(&format!("/articles/{}", slug)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn non_author_is_forbidden() -> Result<()> {
    let Some(server) = ensure_server().await? else { return Ok(()) };
    let (_, owner) = server.signup().await?;
    let (_, other) = server.signup().await?;
    let slug = unique_slug();

    let resp = server
        .client
        .post(server.url("/articles"))
        .bearer_auth(&owner)
        .json(&json!({ "article": { "title": "t", "body": "b", "slug": slug } }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = server
        .client
        .delete(server.url(&format!("/articles/{}", slug)))
        .bearer_auth(&other)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = server
        .client
        .get(server.url(&format!("/articles/{}", slug)))
        .bearer_auth(&other)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn duplicate_slug_conflicts() -> Result<()> {
    let Some(server) = ensure_server().await? else { return Ok(()) };
    let (_, token) = server.signup().await?;
    let article = json!({ "article": { "title": "t", "body": "b", "slug": unique_slug() } });

    let first = server
        .client
        .post(server.url("/articles"))
        .bearer_auth(&token)
        .json(&article)
        .send()
        .await?;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = server
        .client
        .post(server.url("/articles"))
        .bearer_auth(&token)
        .json(&article)
        .send()
        .await?;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn anonymous_create_is_unauthorized() -> Result<()> {
    let Some(server) = ensure_server().await? else { return Ok(()) };

    let resp = server
        .client
        .post(server.url("/articles"))
        .json(&json!({ "article": { "title": "t", "body": "b", "slug": unique_slug() } }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers().get("www-authenticate").and_then(|v| v.to_str().ok()),
        Some("Token")
    );
    Ok(())
}
