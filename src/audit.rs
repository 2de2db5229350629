//! The audit workflow.
//!
//! A run is: mint token → (SCIM listing ∥ membership query) → reconcile.
//! Minting must succeed before any listing starts. The two listings share
//! nothing but the token and run concurrently. Reconciliation waits for
//! both.

use crate::auth::{AccessToken, TokenMinter};
use crate::config::AuditConfig;
use crate::error::{AuditResult, ConfigurationError};
use crate::http::ApiClient;
use crate::pager::{DirectoryPager, ScimPager};
use crate::reconcile::{ReconciliationResult, reconcile};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use uuid::Uuid;

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub run_id: Uuid,
    pub organization: String,
    pub generated_at: DateTime<Utc>,
    /// Distinct SCIM usernames collected.
    pub scim_identity_count: usize,
    /// Distinct organization members collected, with or without emails.
    pub member_count: usize,
    /// Why the SCIM listing stopped early, if it did. When set, members may
    /// be reported as missing only because their identity was on a page
    /// that was never read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scim_incomplete: Option<String>,
    #[serde(flatten)]
    pub result: ReconciliationResult,
}

impl AuditReport {
    pub fn is_scim_complete(&self) -> bool {
        self.scim_incomplete.is_none()
    }
}

/// Runs audits for one configured organization.
#[derive(Debug, Clone)]
pub struct Auditor {
    config: AuditConfig,
    client: ApiClient,
}

impl Auditor {
    /// Validate `config` and prepare the HTTP client.
    pub fn new(config: AuditConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let client = ApiClient::from_config(&config)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Execute one full audit run.
    ///
    /// # Errors
    ///
    /// Configuration and authentication failures abort before any listing
    /// request. A failed membership query, or a transport failure on either
    /// listing, aborts the run. A SCIM listing that ends early does not; the
    /// report carries the reason instead.
    pub async fn run(&self) -> AuditResult<AuditReport> {
        let run_id = Uuid::new_v4();
        let organization = self.config.organization.as_str();
        info!("[{}] Starting SCIM audit of organization {}", run_id, organization);

        let minter = TokenMinter::new(self.client.clone());
        let token = minter.mint(&self.config.credentials).await?;
        let directory_token = match &self.config.directory_token {
            Some(value) => AccessToken::new(value.clone()),
            None => token.clone(),
        };

        let scim_pager = ScimPager::new(self.client.clone());
        let directory_pager = DirectoryPager::new(self.client.clone(), &self.config.graphql_url);

        let (scim, directory) = tokio::try_join!(
            scim_pager.fetch_all(organization, &token),
            directory_pager.fetch_all(organization, &directory_token)
        )?;

        let scim_incomplete = scim.incomplete_reason().map(|reason| reason.to_string());
        if let Some(reason) = &scim_incomplete {
            warn!(
                "[{}] SCIM listing is incomplete ({}); missing members may be over-reported",
                run_id, reason
            );
        }

        let result = reconcile(&directory, &scim);
        info!(
            "[{}] {} of {} members lack a SCIM identity, {} have no verified email",
            run_id,
            result.missing_from_scim.len(),
            directory.total(),
            result.unverified_members.len()
        );

        Ok(AuditReport {
            run_id,
            organization: organization.to_string(),
            generated_at: Utc::now(),
            scim_identity_count: scim.len(),
            member_count: directory.total(),
            scim_incomplete,
            result,
        })
    }
}
