//! Audit a GitHub organization against its SCIM-provisioned identities.
//!
//! Finds organization members that have no SCIM identity, and members that
//! have no organization-verified email at all.
//!
//! # Core Components
//!
//! - [`TokenMinter`] - Mints an installation token from GitHub App credentials
//! - [`ScimPager`] - Offset-paginated listing of SCIM usernames
//! - [`DirectoryPager`] - Cursor-paginated GraphQL listing of members and emails
//! - [`reconcile`] - Pure diff of the two collections
//! - [`Auditor`] - Runs the whole workflow for one organization
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use scim_audit::{AuditConfig, Auditor, Credentials, OutputFormat, PrivateKeySource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new(
//!     "12345",
//!     "67890",
//!     PrivateKeySource::File("app.pem".into()),
//! );
//! let config = AuditConfig::builder("acme", credentials).build()?;
//!
//! let report = Auditor::new(config)?.run().await?;
//! println!("{}", scim_audit::report::render(&report, OutputFormat::Txt, false)?);
//! # Ok(())
//! # }
//! ```
//!
//! The library logs through the `log` facade and never installs a logger.

pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod pager;
pub mod reconcile;
pub mod report;

// Re-export commonly used types for convenience
pub use audit::{AuditReport, Auditor};
pub use auth::{AccessToken, Credentials, PrivateKeySource, TokenMinter};
pub use config::{AuditConfig, AuditConfigBuilder};
pub use error::{AuditError, AuditResult, AuthenticationError, ConfigurationError, FetchError};
pub use http::{ApiClient, RetryPolicy};
pub use identity::{DirectoryMembers, MemberDirectory, OrgMember, ScimIdentities};
pub use pager::{DirectoryPager, ScimPager};
pub use reconcile::{ReconciliationResult, reconcile};
pub use report::OutputFormat;
