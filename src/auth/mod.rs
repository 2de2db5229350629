//! GitHub App authentication.
//!
//! The SCIM listing requires an installation token, which is minted from
//! the app's long-lived credentials:
//!
//! 1. [`Credentials::validate`] checks that every field is present and that
//!    the key carries RSA private key PEM markers, decoding base64-wrapped
//!    keys first.
//! 2. [`TokenMinter::mint`] signs an RS256 assertion (`iss` = app id,
//!    backdated 60s, valid 8 minutes) and exchanges it for an
//!    [`AccessToken`].
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use scim_audit::auth::{Credentials, PrivateKeySource, TokenMinter};
//! use scim_audit::http::ApiClient;
//! use scim_audit::AuditConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new(
//!     "12345",
//!     "67890",
//!     PrivateKeySource::File("app.pem".into()),
//! );
//! let config = AuditConfig::builder("acme", credentials.clone()).build()?;
//!
//! let minter = TokenMinter::new(ApiClient::from_config(&config)?);
//! let token = minter.mint(&credentials).await?;
//! println!("token minted at {}", token.minted_at());
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod minter;

pub use credentials::{BASE64_PEM_PREFIX, Credentials, PrivateKeyPem, PrivateKeySource};
pub use minter::{AccessToken, AssertionClaims, TokenMinter};
