//! Canned responses for the token, SCIM and GraphQL endpoints.

use super::{TEST_INSTALL_ID, TEST_ORG, TEST_TOKEN};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

pub fn token_path() -> String {
    format!("/app/installations/{}/access_tokens", TEST_INSTALL_ID)
}

pub fn scim_path() -> String {
    format!("/scim/v2/organizations/{}/Users", TEST_ORG)
}

/// Token endpoint answering 201 with [`TEST_TOKEN`].
pub async fn setup_token_success(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": TEST_TOKEN,
            "expires_at": "2030-01-01T00:00:00Z",
            "permissions": {"members": "read", "organization_administration": "read"},
            "repository_selection": "selected"
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// Token endpoint answering `status` with a GitHub-style error body.
pub async fn setup_token_error(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "message": "A JSON web token could not be decoded",
            "documentation_url": "https://docs.github.com/rest"
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// SCIM list body with one resource per username.
pub fn scim_page(total_results: u64, usernames: &[&str]) -> Value {
    let resources: Vec<Value> = usernames
        .iter()
        .map(|name| {
            json!({
                "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
                "id": format!("id-{}", name),
                "userName": name,
                "active": true
            })
        })
        .collect();

    json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:ListResponse"],
        "totalResults": total_results,
        "itemsPerPage": usernames.len(),
        "startIndex": 1,
        "Resources": resources
    })
}

/// Serve `response` for the SCIM page at `start_index`, expecting `hits` calls.
pub async fn setup_scim_page(
    server: &MockServer,
    start_index: u64,
    response: ResponseTemplate,
    hits: u64,
) {
    Mock::given(method("GET"))
        .and(path(scim_path()))
        .and(query_param("startIndex", start_index.to_string()))
        .and(query_param("count", "100"))
        .respond_with(response)
        .expect(hits)
        .mount(server)
        .await;
}

/// Membership query body. Edge cursors are `<prefix>-<n>`.
pub fn members_page(cursor_prefix: &str, members: &[(&str, &[&str])]) -> Value {
    let edges: Vec<Value> = members
        .iter()
        .enumerate()
        .map(|(i, (login, emails))| {
            json!({
                "cursor": format!("{}-{}", cursor_prefix, i + 1),
                "node": {
                    "login": login,
                    "name": format!("{} Example", login),
                    "organizationVerifiedDomainEmails": emails,
                    "createdAt": "2021-06-01T12:00:00Z",
                    "url": format!("https://github.com/{}", login)
                }
            })
        })
        .collect();

    json!({"data": {"organization": {"membersWithRole": {"edges": edges}}}})
}

/// Matches GraphQL requests by their `cursor` variable; `None` matches the
/// first-page request, which carries no cursor.
pub struct GraphQlCursor(pub Option<String>);

impl GraphQlCursor {
    pub fn first() -> Self {
        Self(None)
    }

    pub fn after(cursor: &str) -> Self {
        Self(Some(cursor.to_string()))
    }
}

impl Match for GraphQlCursor {
    fn matches(&self, request: &Request) -> bool {
        let Ok(body) = serde_json::from_slice::<Value>(&request.body) else {
            return false;
        };
        let cursor = body["variables"].get("cursor").and_then(Value::as_str);
        body["variables"]["org"] == TEST_ORG && cursor == self.0.as_deref()
    }
}

/// Serve `response` for the GraphQL page selected by `cursor`.
pub async fn setup_members_page(
    server: &MockServer,
    cursor: GraphQlCursor,
    response: ResponseTemplate,
    hits: u64,
) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(cursor)
        .respond_with(response)
        .expect(hits)
        .mount(server)
        .await;
}

/// Authorization header values of every request received for `request_path`.
pub async fn authorization_headers(server: &MockServer, request_path: &str) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .filter_map(|request| {
            request
                .headers
                .get("authorization")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        })
        .collect()
}
