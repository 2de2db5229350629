//! Cursor-paginated organization membership via GraphQL.

use super::query::{GraphQlRequest, GraphQlResponse, MemberEdge, MembersData};
use crate::auth::AccessToken;
use crate::error::FetchError;
use crate::http::ApiClient;
use crate::identity::{DirectoryMembers, OrgMember};
use futures::{Stream, StreamExt};
use log::{debug, info};

const ENDPOINT: &str = "GraphQL organization members";

/// One non-empty page of the membership query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryPage {
    pub members: Vec<OrgMember>,
    /// Cursor of the last edge; the next page starts after it.
    pub end_cursor: String,
}

enum Cursor {
    Start,
    After(String),
}

/// Collects every organization member with their verified emails.
#[derive(Debug, Clone)]
pub struct DirectoryPager {
    client: ApiClient,
    graphql_url: String,
}

impl DirectoryPager {
    pub fn new(client: ApiClient, graphql_url: impl Into<String>) -> Self {
        Self {
            client,
            graphql_url: graphql_url.into(),
        }
    }

    /// Stream the membership pages. The first page whose edge list is empty
    /// ends the stream and is not yielded.
    pub fn pages<'a>(
        &'a self,
        organization: &'a str,
        token: &'a AccessToken,
    ) -> impl Stream<Item = Result<DirectoryPage, FetchError>> + 'a {
        futures::stream::try_unfold(Cursor::Start, move |cursor| {
            self.next_page(organization, token, cursor)
        })
    }

    async fn next_page(
        &self,
        organization: &str,
        token: &AccessToken,
        cursor: Cursor,
    ) -> Result<Option<(DirectoryPage, Cursor)>, FetchError> {
        let after = match &cursor {
            Cursor::Start => None,
            Cursor::After(value) => Some(value.as_str()),
        };

        let edges = self.fetch_edges(organization, token, after).await?;
        let Some(end_cursor) = edges.last().map(|edge| edge.cursor.clone()) else {
            return Ok(None);
        };

        let page = DirectoryPage {
            members: edges.into_iter().map(into_member).collect(),
            end_cursor: end_cursor.clone(),
        };
        Ok(Some((page, Cursor::After(end_cursor))))
    }

    /// Fetch the complete membership.
    ///
    /// # Errors
    ///
    /// Any failure on any page aborts the fetch; no partial result is
    /// returned.
    pub async fn fetch_all(
        &self,
        organization: &str,
        token: &AccessToken,
    ) -> Result<DirectoryMembers, FetchError> {
        let mut directory = DirectoryMembers::new();
        let mut pages = std::pin::pin!(self.pages(organization, token));
        let mut page_count = 0;

        while let Some(page) = pages.next().await {
            let page = page?;
            page_count += 1;
            for member in page.members {
                directory.push(member);
            }
        }

        info!(
            "Collected {} members of {} from {} page(s), {} without a verified email",
            directory.total(),
            organization,
            page_count,
            directory.unverified().len()
        );

        Ok(directory)
    }

    async fn fetch_edges(
        &self,
        organization: &str,
        token: &AccessToken,
        cursor: Option<&str>,
    ) -> Result<Vec<MemberEdge>, FetchError> {
        debug!(
            "Requesting organization members after cursor {}",
            cursor.unwrap_or("<start>")
        );

        let request = self
            .client
            .http()
            .post(&self.graphql_url)
            .bearer_auth(token.value())
            .json(&GraphQlRequest::members(organization, cursor));

        let response = self.client.send_with_retry(ENDPOINT, request).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::transport(ENDPOINT, e))?;

        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                endpoint: ENDPOINT.to_string(),
                status,
                body,
            });
        }

        parse_edges(&body)
    }
}

fn parse_edges(body: &str) -> Result<Vec<MemberEdge>, FetchError> {
    if body.trim().is_empty() {
        return Err(FetchError::EmptyBody {
            endpoint: ENDPOINT.to_string(),
        });
    }

    let response: GraphQlResponse<MembersData> =
        serde_json::from_str(body).map_err(|e| FetchError::decode(ENDPOINT, e))?;

    if !response.errors.is_empty() {
        return Err(FetchError::GraphQl {
            messages: response.errors.into_iter().map(|e| e.message).collect(),
        });
    }

    let organization = response
        .data
        .ok_or_else(|| FetchError::missing_field(ENDPOINT, "data"))?
        .organization
        .ok_or_else(|| FetchError::missing_field(ENDPOINT, "organization"))?;

    Ok(organization.members_with_role.edges)
}

fn into_member(edge: MemberEdge) -> OrgMember {
    let node = edge.node;
    let member = OrgMember::new(node.login, &node.organization_verified_domain_emails);

    debug!(
        "Login: {}, Name: {}, E-mails: {}, Date Created: {}, URL: {}",
        member.login,
        node.name.as_deref().unwrap_or(""),
        member.verified_emails.join(", "),
        node.created_at.as_deref().unwrap_or(""),
        node.url.as_deref().unwrap_or("")
    );

    member
}
