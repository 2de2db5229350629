//! Error types for audit runs.
//!
//! Failures fall into three families that match the phases of a run:
//! configuration problems caught before any network call, rejection of the
//! installation token exchange, and failures while paging through the
//! SCIM or directory APIs. [`AuditError`] wraps all three.

use reqwest::StatusCode;

/// Main error type for an audit run.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Missing or malformed configuration and credentials
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The token-issuance endpoint rejected the application assertion
    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    /// A paginated fetch could not continue
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
}

/// Errors raised while validating credentials and settings.
///
/// These are always fatal and are reported before any request is sent.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// A required value was empty or absent
    #[error("Required setting '{field}' is missing or empty")]
    MissingField { field: String },

    /// Key material does not look like an RSA private key
    #[error("Private key is not a PEM-encoded RSA private key: {reason}")]
    InvalidPrivateKey { reason: String },

    /// The key file could not be read
    #[error("Failed to read private key from '{path}': {source}")]
    KeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A URL setting could not be used as an endpoint
    #[error("Invalid URL for '{field}': {value}")]
    InvalidUrl { field: String, value: String },

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// Any other invalid setting
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Errors raised while exchanging the application assertion for a token.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    /// The endpoint answered with something other than 201 Created
    #[error("Token issuance rejected with HTTP {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    /// The assertion could not be signed
    #[error("Failed to sign application assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// The request never produced a response
    #[error("Token issuance request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The 201 response did not carry a usable token
    #[error("Token issuance response is malformed: {message}")]
    MalformedResponse { message: String },
}

/// Errors raised while paging through a listing endpoint.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection failure or per-request timeout
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered with an unexpected status code
    #[error("{endpoint} returned HTTP {status}: {body}")]
    UnexpectedStatus {
        endpoint: String,
        status: StatusCode,
        body: String,
    },

    /// The response body was empty
    #[error("{endpoint} returned an empty body")]
    EmptyBody { endpoint: String },

    /// An expected field was absent from the response
    #[error("{endpoint} response is missing '{field}'")]
    MissingField { endpoint: String, field: String },

    /// The response body could not be decoded
    #[error("Failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// The GraphQL endpoint reported query errors
    #[error("GraphQL query failed: {}", messages.join("; "))]
    GraphQl { messages: Vec<String> },
}

/// Result type alias for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;

impl ConfigurationError {
    /// Create a missing field error
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid private key error
    pub fn invalid_key(reason: impl Into<String>) -> Self {
        Self::InvalidPrivateKey {
            reason: reason.into(),
        }
    }

    /// Create a generic invalid configuration error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

impl AuthenticationError {
    /// Create a malformed response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }
}

impl FetchError {
    /// Create a transport error for an endpoint
    pub fn transport(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Create a missing field error for an endpoint
    pub fn missing_field(endpoint: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            endpoint: endpoint.into(),
            field: field.into(),
        }
    }

    /// Create a decode error for an endpoint
    pub fn decode(endpoint: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Whether the failure happened below HTTP (connection, timeout).
    ///
    /// Transport failures end every fetch; the SCIM pager only tolerates
    /// failures that come back as a response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
