//! Installation token minting.
//!
//! A GitHub App authenticates as one of its installations by signing a
//! short RS256 assertion with the app's private key and exchanging it at
//! `/app/installations/{id}/access_tokens`. The resulting token is valid
//! for about an hour; one token is minted per run and never refreshed.

use super::credentials::Credentials;
use crate::error::{AuditError, AuthenticationError, ConfigurationError};
use crate::http::ApiClient;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use log::{debug, error, info};
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How far `iat` is backdated to absorb clock drift.
pub const ASSERTION_BACKDATE_SECS: i64 = 60;

/// Assertion lifetime after `now`. GitHub rejects anything over ten minutes.
pub const ASSERTION_LIFETIME_SECS: i64 = 480;

/// Claims of the application assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl AssertionClaims {
    pub fn new(application_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            iat: (now - Duration::seconds(ASSERTION_BACKDATE_SECS)).timestamp(),
            exp: (now + Duration::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
            iss: application_id.into(),
        }
    }
}

/// Opaque bearer token for the SCIM and GraphQL APIs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    minted_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Wrap a token obtained elsewhere, such as a personal access token.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            minted_at: Utc::now(),
            expires_at: None,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn minted_at(&self) -> DateTime<Utc> {
        self.minted_at
    }

    /// Expiry reported by the issuing endpoint, if any.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("minted_at", &self.minted_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct InstallationTokenResponse {
    token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

/// Exchanges GitHub App credentials for an installation token.
#[derive(Debug, Clone)]
pub struct TokenMinter {
    client: ApiClient,
}

impl TokenMinter {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Mint an installation token.
    ///
    /// # Errors
    ///
    /// * [`AuditError::Configuration`] if a credential is empty or the key is
    ///   not an RSA private key
    /// * [`AuditError::Authentication`] if the exchange does not answer
    ///   `201 Created` with a token
    pub async fn mint(&self, credentials: &Credentials) -> Result<AccessToken, AuditError> {
        let pem = credentials.validate()?;
        debug!(
            "Signing assertion for app {} with key sha256:{}",
            credentials.application_id(),
            pem.fingerprint()
        );

        let key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| ConfigurationError::invalid_key(e.to_string()))?;
        let claims = AssertionClaims::new(credentials.application_id(), Utc::now());
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(signing_error)?;

        let url = self.client.endpoint(&format!(
            "app/installations/{}/access_tokens",
            credentials.installation_id()
        ));

        let response = self
            .client
            .http()
            .post(&url)
            .bearer_auth(assertion)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(AuthenticationError::Transport)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(AuthenticationError::Transport)?;

        if status != StatusCode::CREATED {
            error!("Failed to get app token from GitHub API: {}", body);
            return Err(AuthenticationError::Rejected { status, body }.into());
        }

        let parsed: InstallationTokenResponse = serde_json::from_str(&body)
            .map_err(|e| AuthenticationError::malformed(e.to_string()))?;
        let value = parsed
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthenticationError::malformed("missing 'token'"))?;

        info!(
            "Minted installation token for installation {}",
            credentials.installation_id()
        );

        Ok(AccessToken {
            value,
            minted_at: Utc::now(),
            expires_at: parsed.expires_at,
        })
    }
}

/// Key problems only surface once the signer parses the DER body.
fn signing_error(error: jsonwebtoken::errors::Error) -> AuditError {
    match error.kind() {
        ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
            ConfigurationError::invalid_key(error.to_string()).into()
        }
        _ => AuthenticationError::Signing(error).into(),
    }
}
