use thiserror::Error;

/// Top-level error type for the `graphly-api` crate.
///
/// Covers every failure mode at the wire level: authentication, transport,
/// structured Graph API errors, and payload decoding. `graphly-core` maps
/// these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The OAuth dance failed (denied dialog, bad redirect, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// No access token in the session for an operation that requires one.
    #[error("Access token required but not present")]
    TokenMissing,

    /// The server rejected the access token (expired or revoked).
    #[error("Access token rejected: {reason}")]
    TokenRejected { reason: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Graph API ───────────────────────────────────────────────────
    /// Structured error body from the Graph API (`{"error": {...}}`).
    #[error("Graph API error: {message}")]
    Api {
        message: String,
        code: Option<i64>,
        error_type: Option<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error means the stored token is no longer
    /// usable and re-authentication might resolve it.
    pub fn is_token_rejected(&self) -> bool {
        matches!(self, Self::TokenRejected { .. })
    }

    /// Returns `true` for network-level failures (as opposed to errors
    /// the server deliberately returned).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Extract the Graph API error code, if available.
    pub fn api_error_code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => *code,
            _ => None,
        }
    }
}
