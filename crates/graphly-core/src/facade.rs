// ── Facebook façade ──
//
// The single entry point consumers hold. Composes the wire client, the
// response mapper, the object cache, the session, and the event broadcast
// channel. One calling convention for everything.
//
// Every operation is an async fn: the returned future resolves exactly once
// with a value or an error, and two concurrently issued operations complete
// in whatever order the network decides -- callers must not assume ordering.

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use graphly_api::transport::TransportConfig;
use graphly_api::{GraphClient, ObjectType, Session, urls};

use crate::config::FacebookConfig;
use crate::convert::{self, FeedPage, LoadType};
use crate::error::CoreError;
use crate::events::{EVENT_CHANNEL_SIZE, FacebookEvent};
use crate::model::{GraphObject, ObjectData};
use crate::store::{DiskCache, ObjectCache};

/// Paging bound for a connection load.
#[derive(Debug, Clone, Copy)]
enum PageBound {
    Initial,
    Since(i64),
    Until(i64),
}

impl PageBound {
    fn load_type(self) -> LoadType {
        match self {
            Self::Initial => LoadType::Initial,
            Self::Since(_) => LoadType::New,
            Self::Until(_) => LoadType::Old,
        }
    }
}

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc` internals; clone it into tasks freely. All
/// shared state (session, cache) is safe under concurrent completions.
#[derive(Clone)]
pub struct Facebook {
    inner: Arc<FacebookInner>,
}

struct FacebookInner {
    config: FacebookConfig,
    client: GraphClient,
    session: Session,
    cache: ObjectCache,
    event_tx: broadcast::Sender<FacebookEvent>,
}

impl Facebook {
    /// Build a façade from configuration and an explicitly constructed
    /// session.
    pub fn new(config: FacebookConfig, session: Session) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
            ..TransportConfig::default()
        };
        let client =
            GraphClient::with_base_url(config.graph_base.clone(), session.clone(), &transport)?;

        let cache = match &config.cache_dir {
            Some(dir) => ObjectCache::with_disk(DiskCache::new(dir)?),
            None => ObjectCache::in_memory(),
        };

        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);

        Ok(Self {
            inner: Arc::new(FacebookInner {
                config,
                client,
                session,
                cache,
                event_tx,
            }),
        })
    }

    pub fn config(&self) -> &FacebookConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Subscribe to the broadcast event stream.
    pub fn events(&self) -> broadcast::Receiver<FacebookEvent> {
        self.inner.event_tx.subscribe()
    }

    // ── Authentication ───────────────────────────────────────────────

    /// The OAuth authorize URL to open in a browser dialog.
    pub fn authorize_url(&self) -> String {
        self.inner.config.authorize_url()
    }

    /// Complete the OAuth dance from the dialog's redirect URL.
    ///
    /// Stores the token and expiry in the session, resolves the current
    /// user id (best-effort), and broadcasts
    /// [`UserAuthenticated`](FacebookEvent::UserAuthenticated) -- or
    /// [`AuthenticationError`](FacebookEvent::AuthenticationError) when the
    /// dialog was denied.
    pub async fn complete_authorization(&self, redirect_url: &str) -> Result<(), CoreError> {
        let auth = match urls::parse_auth_redirect(redirect_url) {
            Ok(auth) => auth,
            Err(graphly_api::Error::Authentication { message }) => {
                warn!(reason = %message, "authentication failed");
                self.broadcast(FacebookEvent::AuthenticationError {
                    reason: message.clone(),
                });
                return Err(CoreError::AuthenticationFailed { message });
            }
            Err(e) => return Err(e.into()),
        };

        let session = &self.inner.session;
        session.set_access_token(SecretString::from(auth.access_token));
        if let Some(secs) = auth.expires_in.and_then(|s| i64::try_from(s).ok()) {
            session.set_access_token_expiration(chrono::Utc::now() + chrono::Duration::seconds(secs));
        }
        if let Some(scope) = &self.inner.config.permissions {
            session.set_access_permissions(scope);
        }

        // Resolve who we are. Non-fatal: the token is already stored.
        match self.inner.client.object("me").await {
            Ok(me) => {
                if let Some(id) = me.get("id").and_then(Value::as_str) {
                    session.set_current_user_id(id);
                }
            }
            Err(e) => warn!(error = %e, "could not resolve current user id"),
        }

        info!("user authenticated");
        self.broadcast(FacebookEvent::UserAuthenticated {
            user_id: session.current_user_id(),
        });
        Ok(())
    }

    /// Drop the session and everything cached: full logout.
    pub fn logout(&self) {
        self.inner.session.clear();
        self.inner.cache.flush_all();
    }

    // ── Loaders ──────────────────────────────────────────────────────

    /// Load an object by id, serving from the cache when possible.
    pub async fn load_object(
        &self,
        object_id: &str,
        expected: ObjectType,
    ) -> Result<GraphObject, CoreError> {
        if let Some(cached) = self.inner.cache.get_json(object_id) {
            match serde_json::from_str::<Value>(&cached) {
                Ok(value) => {
                    trace!(object_id, "serving object from cache");
                    return convert::map_object(&value, expected);
                }
                Err(e) => {
                    warn!(object_id, error = %e, "dropping unreadable cache entry");
                    self.inner.cache.flush_object(object_id);
                }
            }
        }

        let value = self.run(self.inner.client.object(object_id).await)?;
        self.cache_value(object_id, &value);
        convert::map_object(&value, expected)
    }

    /// Load the first page of an object's connection edge.
    ///
    /// The object is either a connection child (tagged with its
    /// `connection_type`) or any object with a graph path. Objects carrying
    /// an FQL query refresh through FQL instead.
    pub async fn load_connection(&self, object: &GraphObject) -> Result<FeedPage, CoreError> {
        self.load_connection_page(object, PageBound::Initial).await
    }

    /// Load entries newer than `since` (epoch seconds).
    pub async fn refresh_connection(
        &self,
        object: &GraphObject,
        since: i64,
    ) -> Result<FeedPage, CoreError> {
        self.load_connection_page(object, PageBound::Since(since))
            .await
    }

    /// Page backwards: entries older than `until` (epoch seconds).
    pub async fn load_older(
        &self,
        object: &GraphObject,
        until: i64,
    ) -> Result<FeedPage, CoreError> {
        self.load_connection_page(object, PageBound::Until(until))
            .await
    }

    async fn load_connection_page(
        &self,
        object: &GraphObject,
        bound: PageBound,
    ) -> Result<FeedPage, CoreError> {
        let element = object
            .connection_type
            .as_deref()
            .map_or(ObjectType::Mixed, convert::connection_element_type);

        // FQL-backed connections rerun their query verbatim.
        if let Some(fql) = &object.fql {
            debug!(query = %fql, "loading connection via FQL");
            let value = self.run(self.inner.client.fql(fql).await)?;
            return convert::map_feed_response(&value, element, bound.load_type());
        }

        let path = object.graph_path().ok_or_else(|| CoreError::InvalidRequest {
            reason: "object has neither an id nor a connection path".into(),
        })?;

        let limit = urls::DEFAULT_LIMIT.to_string();
        let bound_param;
        let mut params: Vec<(&str, &str)> = vec![("limit", &limit)];
        match bound {
            PageBound::Initial => {}
            PageBound::Since(since) => {
                bound_param = since.to_string();
                params.push(("since", &bound_param));
            }
            PageBound::Until(until) => {
                bound_param = until.to_string();
                params.push(("until", &bound_param));
            }
        }

        let value = self.run(self.inner.client.connection(&path, &params).await)?;
        convert::map_feed_response(&value, element, bound.load_type())
    }

    /// Load a user's news feed (`{user}/home`).
    pub async fn load_news_feed(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<FeedPage, CoreError> {
        let value = self.run(self.inner.client.news_feed(user_id, limit).await)?;
        convert::map_feed_response(&value, ObjectType::Mixed, LoadType::Initial)
    }

    /// Load the album containing a photo.
    ///
    /// Uses the photo's album reference when the payload carried one,
    /// falling back to the parent id.
    pub async fn load_album_for_photo(
        &self,
        photo: &GraphObject,
    ) -> Result<GraphObject, CoreError> {
        let album_id = match &photo.payload {
            ObjectData::Photo {
                album: Some(album), ..
            } => album.clone(),
            _ => photo
                .parent
                .clone()
                .ok_or_else(|| CoreError::NotFound {
                    entity: "album",
                    identifier: photo.id.clone().unwrap_or_default(),
                })?,
        };

        self.load_object(&album_id, ObjectType::Album).await
    }

    /// Load the users who liked an object.
    pub async fn load_likes(&self, object_id: &str) -> Result<Vec<GraphObject>, CoreError> {
        let value = self.run(self.inner.client.likes(object_id).await)?;
        let data = value.get("data").unwrap_or(&value);
        convert::map_array(data, ObjectType::User)
    }

    /// Load (or reload) a user object. Falls back to the session's current
    /// user, then to `me`.
    pub async fn load_user(&self, user: &GraphObject) -> Result<GraphObject, CoreError> {
        let id = user
            .id
            .clone()
            .or_else(|| self.inner.session.current_user_id())
            .unwrap_or_else(|| "me".to_owned());
        self.load_object(&id, ObjectType::User).await
    }

    /// Download an object's picture bytes through the photo cache.
    pub async fn load_picture(&self, object_id: &str) -> Result<Vec<u8>, CoreError> {
        if let Some(bytes) = self.inner.cache.get_photo(object_id) {
            trace!(object_id, "serving picture from cache");
            return Ok(bytes.to_vec());
        }

        let bytes = self.run(self.inner.client.picture(object_id).await)?;
        self.inner.cache.put_photo(object_id, &bytes);
        Ok(bytes)
    }

    // ── Writers ──────────────────────────────────────────────────────

    /// Post a comment on an object. Returns the raw JSON result (the API
    /// echoes only the new comment's id).
    pub async fn post_comment(
        &self,
        message: &str,
        object_id: &str,
    ) -> Result<Value, CoreError> {
        let value = self.run(self.inner.client.post_comment(object_id, message).await)?;
        // The cached copy no longer reflects the comment count.
        self.inner.cache.flush_object(object_id);
        Ok(value)
    }

    /// Like (`is_liked == true`) or unlike (`false`) an object. Returns the
    /// raw JSON success marker.
    pub async fn post_like(&self, object_id: &str, is_liked: bool) -> Result<Value, CoreError> {
        let value = self.run(self.inner.client.set_like(object_id, is_liked).await)?;
        self.inner.cache.flush_object(object_id);
        Ok(value)
    }

    // ── Cache control ────────────────────────────────────────────────

    /// Drop the cached entries for one object id.
    pub fn flush_object(&self, object_id: &str) {
        self.inner.cache.flush_object(object_id);
    }

    /// Drop the entire cache.
    pub fn flush_cache(&self) {
        self.inner.cache.flush_all();
    }

    // ── Failure plumbing ─────────────────────────────────────────────

    /// Translate a wire-level result, firing the side-channel events each
    /// failure class owes: token rejections clear the session and announce
    /// it, transport failures announce a connection error. Each failure
    /// surfaces exactly once.
    fn run<T>(&self, result: Result<T, graphly_api::Error>) -> Result<T, CoreError> {
        result.map_err(|err| self.surface(err))
    }

    fn surface(&self, err: graphly_api::Error) -> CoreError {
        match &err {
            graphly_api::Error::TokenRejected { reason } => {
                warn!(reason = %reason, "access token rejected -- clearing session");
                self.inner.session.clear();
                self.broadcast(FacebookEvent::AccessTokenRejected);
            }
            graphly_api::Error::Transport(e) => {
                self.broadcast(FacebookEvent::ConnectionError {
                    reason: e.to_string(),
                });
            }
            _ => {}
        }
        err.into()
    }

    fn broadcast(&self, event: FacebookEvent) {
        // No subscribers is fine; events are advisory.
        let _ = self.inner.event_tx.send(event);
    }

    fn cache_value(&self, object_id: &str, value: &Value) {
        match serde_json::to_string(value) {
            Ok(body) => self.inner.cache.put_json(object_id, &body),
            Err(e) => warn!(object_id, error = %e, "could not serialize payload for cache"),
        }
    }
}
