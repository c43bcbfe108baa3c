// ── Request builder ──
//
// Pure functions from (endpoint, parameters, token) to fully-formed URL
// strings. Everything here is deterministic: identical inputs always yield
// byte-identical URLs. Parameters encode in the order given, with the
// access token appended last.

use url::form_urlencoded;

use crate::error::Error;
use crate::object_type::{ObjectType, connection};

/// Graph API base URL.
pub const GRAPH_BASE: &str = "https://graph.facebook.com";

/// Facebook's browser login page.
pub const LOGIN_URL: &str = "https://www.facebook.com/login.php";

/// Redirect target signalling a completed browser login.
pub const LOGIN_SUCCESS_URL: &str = "http://www.facebook.com/connect/login_success.html";

/// Default page size for feed/stream queries when the caller gives none.
pub const DEFAULT_LIMIT: u32 = 10;

// Redirect fragment keys set by the OAuth user-agent flow.
const ACCESS_TOKEN_KEY: &str = "access_token=";
const EXPIRES_IN_KEY: &str = "expires_in=";
const ERROR_REASON_KEY: &str = "error_description=";

// ── OAuth endpoints ─────────────────────────────────────────────────

/// Build the OAuth user-agent authorize URL.
///
/// Template (preserved exactly as Facebook documents it):
/// `https://graph.facebook.com/oauth/authorize?client_id=<id>&redirect_uri=<uri>[&scope=<scope>]&type=user_agent&display=popup`
pub fn authorize_url(client_id: &str, redirect_uri: &str, scope: Option<&str>) -> String {
    match scope {
        Some(scope) => format!(
            "{GRAPH_BASE}/oauth/authorize?client_id={client_id}&redirect_uri={redirect_uri}&scope={scope}&type=user_agent&display=popup"
        ),
        None => format!(
            "{GRAPH_BASE}/oauth/authorize?client_id={client_id}&redirect_uri={redirect_uri}&type=user_agent&display=popup"
        ),
    }
}

/// Outcome of a successful OAuth redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRedirect {
    pub access_token: String,
    pub expires_in: Option<u64>,
}

/// Parse the redirect URL the OAuth dialog lands on.
///
/// The user-agent flow returns `access_token=` and `expires_in=` in the URL
/// fragment on success, or `error_description=` on denial. Both the query
/// and the fragment are scanned -- Facebook has used each over the years.
pub fn parse_auth_redirect(redirect_url: &str) -> Result<AuthRedirect, Error> {
    if let Some(reason) = extract_param(redirect_url, ERROR_REASON_KEY) {
        return Err(Error::Authentication {
            message: percent_decode(&reason),
        });
    }

    let Some(token) = extract_param(redirect_url, ACCESS_TOKEN_KEY) else {
        return Err(Error::Authentication {
            message: "redirect carried neither an access token nor an error".into(),
        });
    };

    let expires_in = extract_param(redirect_url, EXPIRES_IN_KEY).and_then(|v| v.parse().ok());

    Ok(AuthRedirect {
        access_token: percent_decode(&token),
        expires_in,
    })
}

/// Find `key=` anywhere after the `?` or `#` and return the value up to the
/// next `&`.
fn extract_param(url: &str, key: &str) -> Option<String> {
    let start = url.find(key)? + key.len();
    let rest = &url[start..];
    let end = rest.find('&').unwrap_or(rest.len());
    Some(rest[..end].to_owned())
}

fn percent_decode(raw: &str) -> String {
    // The fragment values are form-encoded; '+' means space.
    form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| format!("{k}{v}"))
        .collect()
}

// ── Graph query construction ────────────────────────────────────────

/// Build a fully-qualified Graph URL: `<base>/<request>?<params..>[&access_token=..]`.
///
/// `request` may already carry a query string (the feed/stream builders
/// produce those); further parameters join with `&`. Parameters are
/// percent-encoded in the order given and the token, when present, goes
/// last, so the output is stable for identical inputs.
pub fn query_url_on(
    base: &str,
    request: &str,
    params: &[(&str, &str)],
    access_token: Option<&str>,
) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in params {
        serializer.append_pair(name, value);
    }
    if let Some(token) = access_token {
        serializer.append_pair("access_token", token);
    }
    let query = serializer.finish();

    let base = base.trim_end_matches('/');
    let request = request.trim_start_matches('/');
    if query.is_empty() {
        format!("{base}/{request}")
    } else if request.contains('?') {
        format!("{base}/{request}&{query}")
    } else {
        format!("{base}/{request}?{query}")
    }
}

/// [`query_url_on`] against the production Graph base.
pub fn query_url(request: &str, params: &[(&str, &str)], access_token: Option<&str>) -> String {
    query_url_on(GRAPH_BASE, request, params, access_token)
}

/// News feed request for a user: `{user}/home?limit=N`.
///
/// `limit` falls back to [`DEFAULT_LIMIT`] when absent or zero.
pub fn news_feed_query(user_id: &str, limit: Option<u32>) -> String {
    let limit = effective_limit(limit);
    format!("{user_id}/{}?limit={limit}", connection::HOME)
}

/// Stream request for a user, filtered by object kind:
/// `{user}/{filter_key}?limit=N[&since=T]`.
///
/// Kinds without a declared filter key fall back to the `feed` edge.
pub fn stream_query(
    user_id: &str,
    object_type: ObjectType,
    limit: Option<u32>,
    updated_since: Option<i64>,
) -> String {
    let key = object_type
        .connection_filter_key()
        .unwrap_or(connection::FEED);
    let limit = effective_limit(limit);
    match updated_since {
        Some(since) => format!("{user_id}/{key}?limit={limit}&since={since}"),
        None => format!("{user_id}/{key}?limit={limit}"),
    }
}

/// Canonical picture URL for an object: `<graph-base>/<objectID>/picture`.
pub fn picture_url(object_id: &str) -> String {
    format!("{GRAPH_BASE}/{object_id}/picture")
}

/// FQL query endpoint: `<graph-base>/fql?q=<query>[&access_token=..]`.
pub fn fql_query_url(query: &str, access_token: Option<&str>) -> String {
    query_url("fql", &[("q", query)], access_token)
}

fn effective_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => DEFAULT_LIMIT,
        Some(n) => n,
    }
}
