// ── Façade configuration ──

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use graphly_api::urls;

/// Configuration for a [`Facebook`](crate::Facebook) façade.
#[derive(Debug, Clone)]
pub struct FacebookConfig {
    /// Facebook application id (`client_id` in the OAuth dance).
    pub app_id: String,

    /// Where the OAuth dialog redirects after login.
    pub redirect_uri: String,

    /// Comma-separated permission scope to request, if any.
    pub permissions: Option<String>,

    /// Root directory for the disk cache. `None` keeps the cache in memory.
    pub cache_dir: Option<PathBuf>,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Graph API base URL. Only tests and proxies override this.
    pub graph_base: Url,
}

impl FacebookConfig {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            redirect_uri: urls::LOGIN_SUCCESS_URL.to_owned(),
            permissions: None,
            cache_dir: None,
            timeout: Duration::from_secs(30),
            graph_base: Url::parse(urls::GRAPH_BASE).expect("graph base URL is valid"),
        }
    }

    /// The OAuth authorize URL for this app, with scope when configured.
    pub fn authorize_url(&self) -> String {
        urls::authorize_url(
            &self.app_id,
            &self.redirect_uri,
            self.permissions.as_deref(),
        )
    }
}
