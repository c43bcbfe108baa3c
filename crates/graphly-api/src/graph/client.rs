// Graph API HTTP client
//
// Wraps `reqwest::Client` with Graph-specific URL construction, token
// appending, and error-envelope detection. Endpoint methods live in
// `read.rs` and `write.rs` to keep this module focused on transport
// mechanics.

use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::session::Session;
use crate::transport::TransportConfig;
use crate::urls;

/// The Graph API wraps failures as `{"error":{"message","type","code"}}`,
/// sometimes with HTTP 200.
#[derive(serde::Deserialize)]
struct GraphErrorBody {
    error: Option<GraphErrorInner>,
}

#[derive(serde::Deserialize)]
struct GraphErrorInner {
    message: Option<String>,
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<i64>,
}

/// Raw HTTP client for the Facebook Graph API.
///
/// Appends the session's access token to every outgoing request, detects
/// the Graph error envelope before handing JSON back, and classifies OAuth
/// token rejections so callers can clear the session. Methods return raw
/// `serde_json::Value` payloads -- domain mapping is `graphly-core`'s job.
pub struct GraphClient {
    http: reqwest::Client,
    base_url: Url,
    session: Session,
}

impl GraphClient {
    /// Create a new client against the production Graph base.
    pub fn new(session: Session, transport: &TransportConfig) -> Result<Self, Error> {
        Self::with_base_url(Url::parse(urls::GRAPH_BASE)?, session, transport)
    }

    /// Create a client against an arbitrary base URL (tests, proxies).
    pub fn with_base_url(
        base_url: Url,
        session: Session,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// The session whose token rides on every request.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The Graph base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL construction ─────────────────────────────────────────────

    /// Build a full request URL with the session token appended (when one
    /// is present -- public objects are readable without auth).
    pub(crate) fn request_url(
        &self,
        request: &str,
        params: &[(&str, &str)],
    ) -> Result<Url, Error> {
        let token = self.session.access_token();
        let full = urls::query_url_on(
            self.base_url.as_str(),
            request,
            params,
            token.as_ref().map(ExposeSecret::expose_secret),
        );
        Ok(Url::parse(&full)?)
    }

    /// Like [`request_url`](Self::request_url) but fails with
    /// [`Error::TokenMissing`] when the session holds no token. Write
    /// endpoints always require auth.
    pub(crate) fn authed_url(
        &self,
        request: &str,
        params: &[(&str, &str)],
    ) -> Result<Url, Error> {
        if self.session.access_token().is_none() {
            return Err(Error::TokenMissing);
        }
        self.request_url(request, params)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and return the decoded JSON payload.
    pub(crate) async fn get(&self, url: Url) -> Result<Value, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        self.parse_body(resp).await
    }

    /// Send a POST request with a form body and return the decoded JSON.
    pub(crate) async fn post_form(
        &self,
        url: Url,
        form: &[(&str, &str)],
    ) -> Result<Value, Error> {
        debug!("POST {}", url);
        let resp = self
            .http
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(Error::Transport)?;
        self.parse_body(resp).await
    }

    /// Send a DELETE request and return the decoded JSON.
    pub(crate) async fn delete(&self, url: Url) -> Result<Value, Error> {
        debug!("DELETE {}", url);
        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(Error::Transport)?;
        self.parse_body(resp).await
    }

    /// Send a GET request for a binary payload (photo downloads).
    pub(crate) async fn get_bytes(&self, url: Url) -> Result<Vec<u8>, Error> {
        debug!("GET {} (binary)", url);
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            if let Some(err) = classify_error_body(&body) {
                return Err(err);
            }
            return Err(Error::Api {
                message: format!("HTTP {status}: {}", preview(&body)),
                code: None,
                error_type: None,
            });
        }

        Ok(resp.bytes().await.map_err(Error::Transport)?.to_vec())
    }

    /// Decode a response body, surfacing the Graph error envelope when
    /// present.
    ///
    /// The envelope is probed on every response regardless of HTTP status:
    /// the API has returned structured errors with 200, 400, and 500 over
    /// the years, and the body is the authoritative signal.
    async fn parse_body(&self, resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if let Some(err) = classify_error_body(&body) {
            return Err(err);
        }

        if !status.is_success() {
            return Err(Error::Api {
                message: format!("HTTP {status}: {}", preview(&body)),
                code: None,
                error_type: None,
            });
        }

        trace!(bytes = body.len(), "decoding response body");
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }
}

/// Probe a body for the Graph error envelope and classify it.
///
/// OAuth failures (an `OAuthException` type, or the canonical
/// "Invalid OAuth access token." message) become [`Error::TokenRejected`]
/// so the caller knows to drop the stored token; everything else is a
/// plain [`Error::Api`].
fn classify_error_body(body: &str) -> Option<Error> {
    let wrapper: GraphErrorBody = serde_json::from_str(body).ok()?;
    let inner = wrapper.error?;

    let message = inner.message.unwrap_or_default();
    let is_oauth = inner.error_type.as_deref() == Some("OAuthException")
        || message.to_ascii_lowercase().contains("oauth access token");

    Some(if is_oauth {
        Error::TokenRejected { reason: message }
    } else {
        Error::Api {
            message,
            code: inner.code,
            error_type: inner.error_type,
        }
    })
}

fn preview(body: &str) -> &str {
    if body.len() <= 200 {
        return body;
    }
    let mut end = 200;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oauth_error_body_classified_as_token_rejected() {
        let body = r#"{"error":{"message":"Invalid OAuth access token.","type":"OAuthException","code":190}}"#;
        let err = classify_error_body(body).expect("error expected");
        assert!(err.is_token_rejected());
    }

    #[test]
    fn oauth_message_without_type_still_rejects_token() {
        let body = r#"{"error":{"message":"Invalid OAuth access token."}}"#;
        let err = classify_error_body(body).expect("error expected");
        assert!(err.is_token_rejected());
    }

    #[test]
    fn plain_api_error_keeps_code() {
        let body = r#"{"error":{"message":"Unsupported get request.","type":"GraphMethodException","code":100}}"#;
        let err = classify_error_body(body).expect("error expected");
        assert_eq!(err.api_error_code(), Some(100));
    }

    #[test]
    fn non_error_bodies_pass_through() {
        assert!(classify_error_body(r#"{"id":"123"}"#).is_none());
        assert!(classify_error_body("not json at all").is_none());
        assert!(classify_error_body(r#"{"error":null}"#).is_none());
    }
}
