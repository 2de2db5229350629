//! Cursor pagination over the GraphQL membership query.

use crate::common::mock_server::{GraphQlCursor, members_page, setup_members_page};
use crate::common::{TEST_ORG, TEST_TOKEN, test_client, test_config};
use scim_audit::{AccessToken, DirectoryPager, FetchError};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn token() -> AccessToken {
    AccessToken::new(TEST_TOKEN)
}

fn pager(server: &MockServer) -> DirectoryPager {
    DirectoryPager::new(test_client(server), test_config(server).graphql_url)
}

fn empty_page() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(members_page("none", &[]))
}

#[tokio::test]
async fn test_empty_page_terminates() {
    let server = MockServer::start().await;
    setup_members_page(
        &server,
        GraphQlCursor::first(),
        ResponseTemplate::new(200).set_body_json(members_page(
            "p1",
            &[("alice", &["alice@acme.com"]), ("bob", &["bob@acme.com"])],
        )),
        1,
    )
    .await;
    setup_members_page(&server, GraphQlCursor::after("p1-2"), empty_page(), 1).await;

    let directory = pager(&server).fetch_all(TEST_ORG, &token()).await.unwrap();

    assert_eq!(directory.total(), 2);
    assert_eq!(
        directory.members().get("alice"),
        Some(&["alice@acme.com".to_string()][..])
    );
    assert!(directory.unverified().is_empty());
}

#[tokio::test]
async fn test_follows_last_edge_cursor() {
    let server = MockServer::start().await;
    setup_members_page(
        &server,
        GraphQlCursor::first(),
        ResponseTemplate::new(200).set_body_json(members_page(
            "p1",
            &[("alice", &["alice@acme.com"]), ("bob", &["bob@acme.com"])],
        )),
        1,
    )
    .await;
    setup_members_page(
        &server,
        GraphQlCursor::after("p1-2"),
        ResponseTemplate::new(200)
            .set_body_json(members_page("p2", &[("dave", &["dave@acme.com"])])),
        1,
    )
    .await;
    setup_members_page(&server, GraphQlCursor::after("p2-1"), empty_page(), 1).await;

    let directory = pager(&server).fetch_all(TEST_ORG, &token()).await.unwrap();

    let logins: Vec<&str> = directory.members().logins().collect();
    assert_eq!(logins, vec!["alice", "bob", "dave"]);
}

#[tokio::test]
async fn test_first_request_has_no_cursor() {
    let server = MockServer::start().await;
    setup_members_page(&server, GraphQlCursor::first(), empty_page(), 1).await;

    let directory = pager(&server).fetch_all(TEST_ORG, &token()).await.unwrap();
    assert_eq!(directory.total(), 0);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body["variables"].get("cursor").is_none());
    let query = body["query"].as_str().unwrap();
    assert!(query.contains("first: 100"));
    assert!(!query.contains("$cursor"));
    assert_eq!(
        requests[0].headers.get("authorization").unwrap().to_str().unwrap(),
        format!("Bearer {}", TEST_TOKEN)
    );
}

#[tokio::test]
async fn test_member_without_email_is_unverified() {
    let server = MockServer::start().await;
    setup_members_page(
        &server,
        GraphQlCursor::first(),
        ResponseTemplate::new(200).set_body_json(members_page(
            "p1",
            &[("alice", &["Alice@Acme.com"]), ("carol", &[])],
        )),
        1,
    )
    .await;
    setup_members_page(&server, GraphQlCursor::after("p1-2"), empty_page(), 1).await;

    let directory = pager(&server).fetch_all(TEST_ORG, &token()).await.unwrap();

    assert_eq!(directory.unverified(), &["carol".to_string()]);
    assert!(!directory.members().contains("carol"));
    assert_eq!(
        directory.members().get("alice"),
        Some(&["alice@acme.com".to_string()][..])
    );
}

#[tokio::test]
async fn test_graphql_errors_are_fatal() {
    let server = MockServer::start().await;
    setup_members_page(
        &server,
        GraphQlCursor::first(),
        ResponseTemplate::new(200)
            .set_body_json(members_page("p1", &[("alice", &["alice@acme.com"])])),
        1,
    )
    .await;
    setup_members_page(
        &server,
        GraphQlCursor::after("p1-1"),
        ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{"type": "FORBIDDEN", "message": "Resource not accessible by integration"}]
        })),
        1,
    )
    .await;

    let err = pager(&server).fetch_all(TEST_ORG, &token()).await.unwrap_err();

    match err {
        FetchError::GraphQl { messages } => {
            assert_eq!(messages, vec!["Resource not accessible by integration".to_string()]);
        }
        other => panic!("expected GraphQL error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_status_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
        .expect(1)
        .mount(&server)
        .await;

    let err = pager(&server).fetch_all(TEST_ORG, &token()).await.unwrap_err();

    assert!(matches!(
        err,
        FetchError::UnexpectedStatus { status, .. } if status.as_u16() == 401
    ));
}

#[tokio::test]
async fn test_unknown_organization_is_fatal() {
    let server = MockServer::start().await;
    setup_members_page(
        &server,
        GraphQlCursor::first(),
        ResponseTemplate::new(200).set_body_json(json!({"data": {"organization": null}})),
        1,
    )
    .await;

    let err = pager(&server).fetch_all(TEST_ORG, &token()).await.unwrap_err();

    assert!(matches!(
        err,
        FetchError::MissingField { field, .. } if field == "organization"
    ));
}

#[tokio::test]
async fn test_undecodable_body_is_fatal() {
    let server = MockServer::start().await;
    setup_members_page(
        &server,
        GraphQlCursor::first(),
        ResponseTemplate::new(200).set_body_string("<html>bad gateway</html>"),
        1,
    )
    .await;

    let err = pager(&server).fetch_all(TEST_ORG, &token()).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }));
}
