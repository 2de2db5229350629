//! Configuration for audit runs.
//!
//! An [`AuditConfig`] is assembled once, explicitly, and handed to the
//! [`Auditor`](crate::audit::Auditor). Nothing in the library reads the
//! process environment; the `scim-audit` binary is responsible for turning
//! environment variables and flags into a config.

use crate::auth::Credentials;
use crate::error::ConfigurationError;
use crate::http::RetryPolicy;
use std::time::Duration;

/// Default REST API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Default GraphQL endpoint.
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Complete settings for one audit run against one organization.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Organization login to audit.
    pub organization: String,

    /// GitHub App credentials used to mint the installation token.
    pub credentials: Credentials,

    /// REST API root, used for token issuance and the SCIM listing.
    /// Examples: "https://api.github.com", "https://ghe.example.com/api/v3"
    pub api_base_url: String,

    /// GraphQL endpoint for the membership query.
    pub graphql_url: String,

    /// Bearer token for the GraphQL query. When absent the minted
    /// installation token is used for both APIs.
    pub directory_token: Option<String>,

    /// Upper bound on a single HTTP request, including reading the body.
    pub request_timeout: Duration,

    /// Retry behaviour for transient listing failures.
    pub retry: RetryPolicy,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl AuditConfig {
    /// Start building a config for `organization`.
    pub fn builder(
        organization: impl Into<String>,
        credentials: Credentials,
    ) -> AuditConfigBuilder {
        AuditConfigBuilder::new(organization, credentials)
    }

    /// Validate the configuration.
    ///
    /// Credential contents are checked later by the token minter; this only
    /// covers settings that can be judged without reading key material.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.organization.trim().is_empty() {
            return Err(ConfigurationError::missing("organization"));
        }

        validate_url("api_base_url", &self.api_base_url)?;
        validate_url("graphql_url", &self.graphql_url)?;

        if self.request_timeout.is_zero() {
            return Err(ConfigurationError::invalid(
                "request_timeout must be greater than zero",
            ));
        }

        if self
            .directory_token
            .as_deref()
            .is_some_and(|token| token.trim().is_empty())
        {
            return Err(ConfigurationError::missing("directory_token"));
        }

        Ok(())
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigurationError> {
    if value.is_empty() {
        return Err(ConfigurationError::missing(field));
    }

    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(ConfigurationError::InvalidUrl {
            field: field.to_string(),
            value: value.to_string(),
        });
    }

    Ok(())
}

/// Builder for [`AuditConfig`].
///
/// # Examples
///
/// ```rust
/// use scim_audit::{AuditConfig, Credentials, PrivateKeySource};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = Credentials::new(
///     "12345",
///     "67890",
///     PrivateKeySource::File("/etc/scim-audit/app.pem".into()),
/// );
///
/// let config = AuditConfig::builder("acme", credentials)
///     .with_api_base_url("https://ghe.example.com/api/v3")
///     .with_graphql_url("https://ghe.example.com/api/graphql")
///     .with_request_timeout(Duration::from_secs(10))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct AuditConfigBuilder {
    config: AuditConfig,
}

impl AuditConfigBuilder {
    /// Create a builder with default endpoints, timeout and retry policy.
    pub fn new(organization: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            config: AuditConfig {
                organization: organization.into(),
                credentials,
                api_base_url: DEFAULT_API_BASE_URL.to_string(),
                graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
                directory_token: None,
                request_timeout: DEFAULT_REQUEST_TIMEOUT,
                retry: RetryPolicy::default(),
                user_agent: concat!("scim-audit/", env!("CARGO_PKG_VERSION")).to_string(),
            },
        }
    }

    /// Set the REST API root. A trailing slash is ignored.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the GraphQL endpoint.
    pub fn with_graphql_url(mut self, url: impl Into<String>) -> Self {
        self.config.graphql_url = url.into();
        self
    }

    /// Use a separate bearer token for the membership query.
    pub fn with_directory_token(mut self, token: impl Into<String>) -> Self {
        self.config.directory_token = Some(token.into());
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Override the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Validate and return the config.
    pub fn build(self) -> Result<AuditConfig, ConfigurationError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
