//! Offset-paginated SCIM user listing.

use super::PAGE_SIZE;
use crate::auth::AccessToken;
use crate::error::FetchError;
use crate::http::ApiClient;
use crate::identity::ScimIdentities;
use futures::{Stream, StreamExt};
use log::{debug, error, info};
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;

const SCIM_CONTENT_TYPE: &str = "application/scim+json";
const ENDPOINT: &str = "SCIM organization identities";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScimListResponse {
    total_results: Option<u64>,
    #[serde(rename = "Resources")]
    resources: Option<Vec<ScimUserResource>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScimUserResource {
    user_name: Option<String>,
}

/// One page of the SCIM listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScimPage {
    /// `startIndex` this page was requested with.
    pub start_index: u64,
    /// `totalResults` reported by this page.
    pub total_results: u64,
    /// Usernames on this page, lower-cased, in response order.
    pub usernames: Vec<String>,
}

impl ScimPage {
    /// `startIndex` of the following page, or `None` past the last one.
    pub fn next_start_index(&self) -> Option<u64> {
        let next = self.start_index + u64::from(PAGE_SIZE);
        (next <= self.total_results).then_some(next)
    }
}

/// Collects every SCIM-provisioned username of an organization.
#[derive(Debug, Clone)]
pub struct ScimPager {
    client: ApiClient,
}

impl ScimPager {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Stream the listing page by page, starting at `startIndex=1`.
    ///
    /// The stream ends after the page whose next `startIndex` exceeds
    /// `totalResults`, or after the first error.
    pub fn pages<'a>(
        &'a self,
        organization: &'a str,
        token: &'a AccessToken,
    ) -> impl Stream<Item = Result<ScimPage, FetchError>> + 'a {
        futures::stream::try_unfold(Some(1u64), move |start_index| {
            self.next_page(organization, token, start_index)
        })
    }

    async fn next_page(
        &self,
        organization: &str,
        token: &AccessToken,
        start_index: Option<u64>,
    ) -> Result<Option<(ScimPage, Option<u64>)>, FetchError> {
        let Some(start_index) = start_index else {
            return Ok(None);
        };
        let page = self.fetch_page(organization, token, start_index).await?;
        let next = page.next_start_index();
        Ok(Some((page, next)))
    }

    /// Fetch the complete identity set.
    ///
    /// A non-200 page, an empty body or a page without `Resources` ends the
    /// listing early: the failure is logged and the identities gathered so
    /// far are returned, marked incomplete.
    ///
    /// # Errors
    ///
    /// Only transport failures (connection errors, timeouts) are returned.
    pub async fn fetch_all(
        &self,
        organization: &str,
        token: &AccessToken,
    ) -> Result<ScimIdentities, FetchError> {
        let mut identities = ScimIdentities::default();
        let mut pages = std::pin::pin!(self.pages(organization, token));
        let mut page_count = 0;

        while let Some(page) = pages.next().await {
            match page {
                Ok(page) => {
                    page_count += 1;
                    for username in &page.usernames {
                        identities.insert(username);
                    }
                }
                Err(err) if err.is_transport() => return Err(err),
                Err(err) => {
                    error!("Failed to list SCIM organization identities: {}", err);
                    identities.mark_incomplete(err);
                    break;
                }
            }
        }

        info!(
            "Collected {} SCIM identities for {} from {} page(s){}",
            identities.len(),
            organization,
            page_count,
            if identities.is_complete() { "" } else { " (incomplete)" }
        );

        Ok(identities)
    }

    async fn fetch_page(
        &self,
        organization: &str,
        token: &AccessToken,
        start_index: u64,
    ) -> Result<ScimPage, FetchError> {
        let url = self
            .client
            .endpoint(&format!("scim/v2/organizations/{}/Users", organization));
        debug!("Requesting SCIM identities startIndex={}", start_index);

        let request = self
            .client
            .http()
            .get(&url)
            .bearer_auth(token.value())
            .header(ACCEPT, SCIM_CONTENT_TYPE)
            .query(&[("startIndex", start_index), ("count", u64::from(PAGE_SIZE))]);

        let response = self.client.send_with_retry(ENDPOINT, request).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::transport(ENDPOINT, e))?;

        if status != StatusCode::OK {
            return Err(FetchError::UnexpectedStatus {
                endpoint: ENDPOINT.to_string(),
                status,
                body,
            });
        }

        parse_page(start_index, &body)
    }
}

fn parse_page(start_index: u64, body: &str) -> Result<ScimPage, FetchError> {
    if body.trim().is_empty() {
        return Err(FetchError::EmptyBody {
            endpoint: ENDPOINT.to_string(),
        });
    }

    let value: Value = serde_json::from_str(body).map_err(|e| FetchError::decode(ENDPOINT, e))?;
    let is_empty = match &value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if is_empty {
        return Err(FetchError::EmptyBody {
            endpoint: ENDPOINT.to_string(),
        });
    }

    let list: ScimListResponse =
        serde_json::from_value(value).map_err(|e| FetchError::decode(ENDPOINT, e))?;

    let resources = list
        .resources
        .filter(|resources| !resources.is_empty())
        .ok_or_else(|| FetchError::missing_field(ENDPOINT, "Resources"))?;
    let total_results = list
        .total_results
        .ok_or_else(|| FetchError::missing_field(ENDPOINT, "totalResults"))?;

    let usernames = resources
        .into_iter()
        .filter_map(|resource| resource.user_name)
        .map(|name| name.to_lowercase())
        .collect();

    Ok(ScimPage {
        start_index,
        total_results,
        usernames,
    })
}
