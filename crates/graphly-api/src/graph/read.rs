// Graph API read endpoints
//
// Object, connection, likes, feed/stream, FQL, and picture reads. All
// methods return raw JSON (or bytes); the domain layer maps them.

use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::graph::client::GraphClient;
use crate::object_type::ObjectType;
use crate::urls;

impl GraphClient {
    /// Fetch a single object by id.
    ///
    /// `GET /{id}`
    pub async fn object(&self, object_id: &str) -> Result<Value, Error> {
        let url = self.request_url(object_id, &[])?;
        self.get(url).await
    }

    /// Fetch a connection edge, e.g. `123/feed`.
    ///
    /// `GET /{path}?{params}` -- `path` is the full edge path, params carry
    /// paging bounds (`limit`, `since`, `until`).
    pub async fn connection(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, Error> {
        let url = self.request_url(path, params)?;
        self.get(url).await
    }

    /// Fetch the likes edge of an object.
    ///
    /// `GET /{id}/likes`
    pub async fn likes(&self, object_id: &str) -> Result<Value, Error> {
        let url = self.request_url(&format!("{object_id}/likes"), &[])?;
        self.get(url).await
    }

    /// Fetch a user's news feed.
    ///
    /// `GET /{user}/home?limit=N`
    pub async fn news_feed(&self, user_id: &str, limit: Option<u32>) -> Result<Value, Error> {
        let request = urls::news_feed_query(user_id, limit);
        let url = self.request_url(&request, &[])?;
        self.get(url).await
    }

    /// Fetch a user's stream filtered by object kind.
    ///
    /// `GET /{user}/{filter_key}?limit=N[&since=T]`
    pub async fn stream(
        &self,
        user_id: &str,
        object_type: ObjectType,
        limit: Option<u32>,
        updated_since: Option<i64>,
    ) -> Result<Value, Error> {
        let request = urls::stream_query(user_id, object_type, limit, updated_since);
        let url = self.request_url(&request, &[])?;
        self.get(url).await
    }

    /// Run an FQL query.
    ///
    /// `GET /fql?q={query}`
    pub async fn fql(&self, query: &str) -> Result<Value, Error> {
        debug!("FQL: {}", query);
        let url = self.request_url("fql", &[("q", query)])?;
        self.get(url).await
    }

    /// Download an object's picture bytes.
    ///
    /// `GET /{id}/picture` -- the Graph redirects to the CDN image; the
    /// transport follows and the final payload comes back raw.
    pub async fn picture(&self, object_id: &str) -> Result<Vec<u8>, Error> {
        let url = self.request_url(&format!("{object_id}/picture"), &[])?;
        self.get_bytes(url).await
    }
}
