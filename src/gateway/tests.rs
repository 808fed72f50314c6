// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::num::NonZeroU32;

use reqwest::Method;
use secrecy::SecretString;
use serde_json::json;

use crate::{
    error::{Error, Result},
    model::{BlogDraft, ProfileUpdate, Token},
};

use super::{
    mock::{self, Mock},
    Listing,
};

#[tokio::test]
async fn every_request_carries_json_headers() -> Result<()> {
    let mock = Mock::new();
    mock.reply(200, json!({ "success": true, "blogs": [] })).await;
    let gateway = mock::gateway(&mock, None)?;

    let _ = gateway.list_blogs_simple().await?;

    let req = mock.last_request().await.ok_or(Error::Command)?;
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(req.header("accept"), Some("application/json"));
    assert_eq!(req.header("authorization"), None);
    Ok(())
}

#[tokio::test]
async fn session_token_is_sent_as_bearer() -> Result<()> {
    let mock = Mock::new();
    mock.reply(200, json!({ "success": true, "blog": null })).await;
    let gateway = mock::gateway(&mock, Some(Token::new("T1")))?;

    let _ = gateway.get_blog("b1").await?;

    let req = mock.last_request().await.ok_or(Error::Command)?;
    assert_eq!(req.method, Method::GET);
    assert_eq!(req.url.as_str(), "http://blog.test/api/blogs/b1");
    assert_eq!(req.header("authorization"), Some("Bearer T1"));
    Ok(())
}

#[tokio::test]
async fn explicit_bearer_wins_over_session_token() -> Result<()> {
    let mock = Mock::new();
    mock.reply(200, json!({ "success": true, "user": { "id": "u1" } }))
        .await;
    let gateway = mock::gateway(&mock, Some(Token::new("T1")))?;

    let _ = gateway.verify_token(Token::new("STORED")).await?;

    let req = mock.last_request().await.ok_or(Error::Command)?;
    assert_eq!(req.url.path(), "/api/users/verify-token");
    assert_eq!(req.header("authorization"), Some("Bearer STORED"));
    Ok(())
}

#[tokio::test]
async fn login_posts_credentials() -> Result<()> {
    let mock = Mock::new();
    mock.reply(
        200,
        json!({ "success": true, "token": "T1", "user": { "id": "u1", "name": "A" } }),
    )
    .await;
    let gateway = mock::gateway(&mock, None)?;

    let envelope = gateway
        .login("a@b.com", &SecretString::new("secret123".to_owned()), true)
        .await?;

    assert!(envelope.success);
    assert_eq!(envelope.payload.token, Some(Token::new("T1")));
    let req = mock.last_request().await.ok_or(Error::Command)?;
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.url.path(), "/api/users/login");
    assert_eq!(
        req.json()?,
        json!({ "email": "a@b.com", "password": "secret123", "rememberMe": true })
    );
    Ok(())
}

#[tokio::test]
async fn listing_sends_pagination_and_search() -> Result<()> {
    let mock = Mock::new();
    mock.reply(200, json!({ "success": true, "blogs": [] })).await;
    let gateway = mock::gateway(&mock, None)?;

    let listing = Listing {
        page: NonZeroU32::new(2).ok_or(Error::Command)?,
        limit: NonZeroU32::new(5).ok_or(Error::Command)?,
        search: Some("rust & tokio".to_owned()),
    };
    let _ = gateway.list_blogs(&listing).await?;

    let req = mock.last_request().await.ok_or(Error::Command)?;
    assert_eq!(
        req.url.as_str(),
        "http://blog.test/api/blogs?page=2&limit=5&search=rust+%26+tokio"
    );
    Ok(())
}

#[tokio::test]
async fn empty_search_is_omitted() -> Result<()> {
    let mock = Mock::new();
    mock.reply(200, json!({ "success": true, "blogs": [] })).await;
    let gateway = mock::gateway(&mock, None)?;

    let listing = Listing {
        search: Some(String::new()),
        ..Listing::default()
    };
    let _ = gateway.list_blogs(&listing).await?;

    let req = mock.last_request().await.ok_or(Error::Command)?;
    assert_eq!(req.url.query(), Some("page=1&limit=10"));
    Ok(())
}

#[tokio::test]
async fn path_segments_are_escaped() -> Result<()> {
    let mock = Mock::new();
    mock.reply(200, json!({ "success": true })).await;
    let gateway = mock::gateway(&mock, None)?;

    let _ = gateway.verify_email("a/b?c").await?;

    let req = mock.last_request().await.ok_or(Error::Command)?;
    assert_eq!(req.url.path(), "/api/users/verify-email/a%2Fb%3Fc");
    Ok(())
}

#[tokio::test]
async fn failing_status_uses_server_message() -> Result<()> {
    let mock = Mock::new();
    mock.reply(
        403,
        json!({ "success": false, "message": "Please verify your email", "requiresVerification": true }),
    )
    .await;
    let gateway = mock::gateway(&mock, None)?;

    let err = gateway
        .login("a@b.com", &SecretString::new("pw".to_owned()), false)
        .await
        .err()
        .ok_or(Error::Command)?;

    match err {
        Error::Server {
            status,
            message,
            requires_verification,
        } => {
            assert_eq!(status, 403);
            assert_eq!(message, "Please verify your email");
            assert!(requires_verification);
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[tokio::test]
async fn failing_status_without_message_falls_back_to_status_line() -> Result<()> {
    let mock = Mock::new();
    mock.reply_raw(502, "<html>Bad Gateway</html>").await;
    let gateway = mock::gateway(&mock, None)?;

    let err = gateway.list_blogs_simple().await.err().ok_or(Error::Command)?;

    assert!(matches!(
        err,
        Error::Server { status: 502, ref message, .. } if message == "HTTP 502: Bad Gateway"
    ));
    Ok(())
}

#[tokio::test]
async fn transport_failure_is_a_network_error() -> Result<()> {
    let mock = Mock::new();
    mock.fail("connection refused").await;
    let gateway = mock::gateway(&mock, None)?;

    let err = gateway.get_blog("b1").await.err().ok_or(Error::Command)?;

    assert!(matches!(err, Error::Network(_)));
    assert_eq!(mock.request_count().await, 1);
    Ok(())
}

#[tokio::test]
async fn success_false_on_2xx_is_returned_as_is() -> Result<()> {
    let mock = Mock::new();
    mock.reply(200, json!({ "success": false, "message": "Nope" }))
        .await;
    let gateway = mock::gateway(&mock, None)?;

    let envelope = gateway.forgot_password("a@b.com").await?;

    assert!(!envelope.success);
    assert_eq!(envelope.message.as_deref(), Some("Nope"));
    Ok(())
}

#[tokio::test]
async fn authenticated_calls_without_token_never_reach_the_network() -> Result<()> {
    let mock = Mock::new();
    let gateway = mock::gateway(&mock, None)?;
    let draft = BlogDraft {
        title: "T".to_owned(),
        description: "D".to_owned(),
        ..BlogDraft::default()
    };
    let password = SecretString::new("pw".to_owned());

    let results = [
        gateway.create_blog(&draft).await.err(),
        gateway.update_blog("b1", &draft).await.err(),
        gateway.delete_blog("b1").await.err(),
        gateway.add_comment("b1", "hi").await.err(),
        gateway.reply_to_comment("c1", "hi").await.err(),
        gateway.delete_comment("c1").await.err(),
        gateway.toggle_like("b1").await.err(),
        gateway.share_blog("b1", None).await.err(),
        gateway
            .update_user("u1", &ProfileUpdate::default())
            .await
            .err(),
        gateway.change_password("u1", &password, &password).await.err(),
    ];

    for result in results {
        assert!(matches!(result, Some(Error::AuthRequired)));
    }
    assert_eq!(mock.request_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn social_endpoints_build_expected_paths() -> Result<()> {
    let mock = Mock::new();
    for _ in 0..4 {
        mock.reply(200, json!({ "success": true })).await;
    }
    let gateway = mock::gateway(&mock, Some(Token::new("T1")))?;

    let _ = gateway.add_comment("b1", "Nice").await?;
    let _ = gateway.reply_to_comment("c1", "Thanks").await?;
    let _ = gateway.toggle_like("b1").await?;
    let _ = gateway.share_blog("b1", Some("look")).await?;

    let requests = mock.requests().await;
    let paths = requests
        .iter()
        .map(|req| (req.method.clone(), req.url.path().to_owned()))
        .collect::<Vec<_>>();
    assert_eq!(
        paths,
        vec![
            (Method::POST, "/api/blogs/b1/comments".to_owned()),
            (Method::POST, "/api/comments/c1/replies".to_owned()),
            (Method::POST, "/api/blogs/b1/like".to_owned()),
            (Method::POST, "/api/blogs/b1/share".to_owned()),
        ]
    );
    assert_eq!(requests[0].json()?, json!({ "text": "Nice" }));
    assert_eq!(requests[3].json()?, json!({ "message": "look" }));
    Ok(())
}
