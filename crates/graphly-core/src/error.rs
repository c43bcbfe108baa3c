// ── Core error types ──
//
// User-facing errors from graphly-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<graphly_api::Error>`
// impl translates wire-level errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection / auth ────────────────────────────────────────────
    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// No access token in the session for an operation that needs one.
    #[error("Not authenticated -- authorize first")]
    AuthRequired,

    /// The server rejected the stored token. The session has been cleared;
    /// re-authentication is the caller's responsibility.
    #[error("Access token rejected: {reason}")]
    TokenRejected { reason: String },

    // ── Server-side errors ───────────────────────────────────────────
    #[error("Graph API error: {message}")]
    Api {
        message: String,
        code: Option<i64>,
    },

    // ── Data errors ──────────────────────────────────────────────────
    /// The payload shape did not match what the mapper expected.
    #[error("Response mapping failed: {reason}")]
    Mapping { reason: String },

    #[error("{entity} not found for {identifier}")]
    NotFound {
        entity: &'static str,
        identifier: String,
    },

    /// The operation could not be expressed as a Graph request.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    // ── Cache ────────────────────────────────────────────────────────
    #[error("Cache I/O error: {0}")]
    Cache(#[from] std::io::Error),
}

impl From<graphly_api::Error> for CoreError {
    fn from(err: graphly_api::Error) -> Self {
        use graphly_api::Error as Api;
        match err {
            Api::Authentication { message } => Self::AuthenticationFailed { message },
            Api::TokenMissing => Self::AuthRequired,
            Api::TokenRejected { reason } => Self::TokenRejected { reason },
            Api::Transport(e) => Self::ConnectionFailed {
                reason: e.to_string(),
            },
            Api::InvalidUrl(e) => Self::InvalidRequest {
                reason: e.to_string(),
            },
            Api::Api { message, code, .. } => Self::Api { message, code },
            Api::Deserialization { message, .. } => Self::Mapping { reason: message },
        }
    }
}
