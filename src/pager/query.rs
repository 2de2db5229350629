//! GraphQL membership query and its response schema.

use super::PAGE_SIZE;
use serde::{Deserialize, Serialize};

/// Build the membership query.
///
/// The first page is requested without a cursor; later pages declare a
/// `$cursor` variable and pass it as `after`.
pub fn members_query(with_cursor: bool) -> String {
    let (cursor_declaration, after_argument) = if with_cursor {
        (", $cursor: String!", ", after: $cursor")
    } else {
        ("", "")
    };

    format!(
        r#"query ($org: String!{cursor_declaration}) {{
  organization(login: $org) {{
    membersWithRole(first: {PAGE_SIZE}{after_argument}) {{
      edges {{
        cursor
        node {{
          login
          name
          organizationVerifiedDomainEmails(login: $org)
          createdAt
          url
        }}
      }}
    }}
  }}
}}"#
    )
}

/// Variables of the membership query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembersVariables {
    pub org: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// A GraphQL request body.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<V> {
    pub query: String,
    pub variables: V,
}

impl GraphQlRequest<MembersVariables> {
    /// Request for the page after `cursor`, or the first page.
    pub fn members(organization: &str, cursor: Option<&str>) -> Self {
        Self {
            query: members_query(cursor.is_some()),
            variables: MembersVariables {
                org: organization.to_string(),
                cursor: cursor.map(str::to_string),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct MembersData {
    pub organization: Option<Organization>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub members_with_role: MemberConnection,
}

#[derive(Debug, Deserialize)]
pub struct MemberConnection {
    pub edges: Vec<MemberEdge>,
}

#[derive(Debug, Deserialize)]
pub struct MemberEdge {
    pub cursor: String,
    pub node: MemberNode,
}

/// A member node. `name`, `created_at` and `url` are only logged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberNode {
    pub login: String,
    pub name: Option<String>,
    pub organization_verified_domain_emails: Vec<String>,
    pub created_at: Option<String>,
    pub url: Option<String>,
}
