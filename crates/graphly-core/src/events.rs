// ── Broadcast events ──
//
// Cross-cutting outcomes the façade announces for observers outside this
// crate (login UIs, badges). Delivery rides a `tokio::sync::broadcast`
// channel; slow subscribers lose old events, never block the client.

/// Events broadcast by [`Facebook`](crate::Facebook).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacebookEvent {
    /// An OAuth flow completed and the session holds a fresh token.
    UserAuthenticated { user_id: Option<String> },

    /// The OAuth flow failed (dialog denied, bad redirect).
    AuthenticationError { reason: String },

    /// The server rejected the stored access token. The session has been
    /// cleared; a login UI should re-prompt.
    AccessTokenRejected,

    /// A request failed at the transport level.
    ConnectionError { reason: String },
}

/// Capacity of the event channel; slow receivers drop old events.
pub(crate) const EVENT_CHANNEL_SIZE: usize = 256;
