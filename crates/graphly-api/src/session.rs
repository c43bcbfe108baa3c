// ── Session state ──
//
// Access token, expiry, permission scope, and current user id for one
// authenticated Facebook user. Explicitly constructed and threaded through
// the client -- there is no process-wide singleton, so tests and multi-user
// processes can hold several sessions at once.
//
// All reads and writes go through the accessors below, which serialize on
// a single `RwLock`: an in-flight request reading the token can never race
// a concurrent re-authentication half-way through a write.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, trace};

/// Store keys under which session values persist.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access-token";
    pub const TOKEN_EXPIRY: &str = "access-token-expiry";
    pub const PERMISSIONS: &str = "access-permissions";
    pub const CURRENT_USER_ID: &str = "current-user-id";
}

/// Persisted key-value storage behind a [`Session`].
///
/// Implementations are simple string stores (a config file, the OS
/// keychain, `NSUserDefaults`-alikes). Failures are the implementation's
/// to log; the session treats persistence as best-effort.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory [`TokenStore`] for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .expect("token store lock poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .write()
            .expect("token store lock poisoned")
            .insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.values
            .write()
            .expect("token store lock poisoned")
            .remove(key);
    }
}

#[derive(Default)]
struct SessionState {
    access_token: Option<SecretString>,
    token_expiry: Option<DateTime<Utc>>,
    permissions: Option<String>,
    current_user_id: Option<String>,
    hydrated: bool,
}

/// Shared, cheaply cloneable session handle.
///
/// Setters persist through the [`TokenStore`] immediately; getters read
/// memory and hydrate lazily from the store on first access.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: Arc<dyn TokenStore>,
    state: RwLock<SessionState>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                store,
                state: RwLock::new(SessionState::default()),
            }),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn access_token(&self) -> Option<SecretString> {
        self.hydrate_if_needed();
        self.read(|s| s.access_token.clone())
    }

    pub fn set_access_token(&self, token: SecretString) {
        debug!("storing access token");
        self.inner
            .store
            .set(keys::ACCESS_TOKEN, token.expose_secret());
        self.write(|s| s.access_token = Some(token));
    }

    pub fn access_token_expiration(&self) -> Option<DateTime<Utc>> {
        self.hydrate_if_needed();
        self.read(|s| s.token_expiry)
    }

    pub fn set_access_token_expiration(&self, expiry: DateTime<Utc>) {
        self.inner
            .store
            .set(keys::TOKEN_EXPIRY, &expiry.to_rfc3339());
        self.write(|s| s.token_expiry = Some(expiry));
    }

    pub fn access_permissions(&self) -> Option<String> {
        self.hydrate_if_needed();
        self.read(|s| s.permissions.clone())
    }

    pub fn set_access_permissions(&self, permissions: &str) {
        self.inner.store.set(keys::PERMISSIONS, permissions);
        self.write(|s| s.permissions = Some(permissions.to_owned()));
    }

    pub fn current_user_id(&self) -> Option<String> {
        self.hydrate_if_needed();
        self.read(|s| s.current_user_id.clone())
    }

    pub fn set_current_user_id(&self, user_id: &str) {
        self.inner.store.set(keys::CURRENT_USER_ID, user_id);
        self.write(|s| s.current_user_id = Some(user_id.to_owned()));
    }

    /// `true` when a token is present but past its recorded expiry.
    pub fn is_token_expired(&self, now: DateTime<Utc>) -> bool {
        self.hydrate_if_needed();
        self.read(|s| {
            s.access_token.is_some() && s.token_expiry.is_some_and(|expiry| expiry <= now)
        })
    }

    /// Wipe the session: memory and every persisted key.
    ///
    /// Called on logout and whenever the server rejects the token.
    pub fn clear(&self) {
        debug!("clearing session state");
        for key in [
            keys::ACCESS_TOKEN,
            keys::TOKEN_EXPIRY,
            keys::PERMISSIONS,
            keys::CURRENT_USER_ID,
        ] {
            self.inner.store.remove(key);
        }
        self.write(|s| {
            *s = SessionState {
                hydrated: true,
                ..SessionState::default()
            };
        });
    }

    // ── Hydration ────────────────────────────────────────────────────

    /// Pull persisted values into memory on first access.
    fn hydrate_if_needed(&self) {
        if self.read(|s| s.hydrated) {
            return;
        }

        let store = &self.inner.store;
        let token = store.get(keys::ACCESS_TOKEN).map(SecretString::from);
        let expiry = store
            .get(keys::TOKEN_EXPIRY)
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|dt| dt.with_timezone(&Utc));
        let permissions = store.get(keys::PERMISSIONS);
        let user_id = store.get(keys::CURRENT_USER_ID);

        trace!(token_present = token.is_some(), "hydrated session from store");

        self.write(|s| {
            // A setter may have landed while we were reading the store;
            // memory wins.
            if s.access_token.is_none() {
                s.access_token = token;
            }
            if s.token_expiry.is_none() {
                s.token_expiry = expiry;
            }
            if s.permissions.is_none() {
                s.permissions = permissions;
            }
            if s.current_user_id.is_none() {
                s.current_user_id = user_id;
            }
            s.hydrated = true;
        });
    }

    fn read<T>(&self, f: impl FnOnce(&SessionState) -> T) -> T {
        f(&self.inner.state.read().expect("session lock poisoned"))
    }

    fn write(&self, f: impl FnOnce(&mut SessionState)) {
        f(&mut self.inner.state.write().expect("session lock poisoned"));
    }
}
