// Integration tests for the `Facebook` façade using wiremock.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use graphly_api::{MemoryTokenStore, ObjectType, Session};
use graphly_core::{CoreError, Facebook, FacebookConfig, FacebookEvent, GraphObject, LoadType};

// ── Helpers ─────────────────────────────────────────────────────────

fn config_for(server: &MockServer, cache_dir: Option<&std::path::Path>) -> FacebookConfig {
    let mut config = FacebookConfig::new("192822854100507");
    config.graph_base = Url::parse(&server.uri()).expect("mock server uri");
    config.cache_dir = cache_dir.map(std::path::Path::to_path_buf);
    config.timeout = Duration::from_secs(5);
    config
}

fn authed_session() -> Session {
    let session = Session::new(Arc::new(MemoryTokenStore::new()));
    session.set_access_token(SecretString::from("tok"));
    session
}

async fn setup() -> (MockServer, Facebook) {
    let server = MockServer::start().await;
    let facebook =
        Facebook::new(config_for(&server, None), authed_session()).expect("facade construction");
    (server, facebook)
}

fn connection_object(parent: &str, tag: &str) -> GraphObject {
    GraphObject {
        parent: Some(parent.to_owned()),
        connection_type: Some(tag.to_owned()),
        ..GraphObject::default()
    }
}

// ── Loads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn load_object_maps_the_payload() {
    let (server, facebook) = setup().await;

    Mock::given(method("GET"))
        .and(path("/123"))
        .and(query_param("access_token", "tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "123", "message": "hi", "type": "status"
        })))
        .mount(&server)
        .await;

    let object = facebook
        .load_object("123", ObjectType::Status)
        .await
        .expect("load");
    assert_eq!(object.id.as_deref(), Some("123"));
    assert_eq!(object.message(), Some("hi"));
    assert_eq!(object.kind(), ObjectType::Status);
}

#[tokio::test]
async fn load_object_serves_repeat_loads_from_cache() {
    let (server, facebook) = setup().await;

    Mock::given(method("GET"))
        .and(path("/123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "123", "type": "status", "message": "cached"
        })))
        .expect(1) // the second load must not hit the network
        .mount(&server)
        .await;

    let first = facebook.load_object("123", ObjectType::Status).await.expect("first");
    let second = facebook.load_object("123", ObjectType::Status).await.expect("second");
    assert_eq!(first.message(), second.message());
}

#[tokio::test]
async fn flush_object_forces_a_reload() {
    let (server, facebook) = setup().await;

    Mock::given(method("GET"))
        .and(path("/123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "123", "type": "status"
        })))
        .expect(2)
        .mount(&server)
        .await;

    facebook.load_object("123", ObjectType::Status).await.expect("first");
    facebook.flush_object("123");
    facebook.load_object("123", ObjectType::Status).await.expect("second");
}

#[tokio::test]
async fn disk_cache_survives_facade_restart() {
    let server = MockServer::start().await;
    let cache_dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("GET"))
        .and(path("/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "42", "type": "user", "name": "Ann"
        })))
        .expect(1)
        .mount(&server)
        .await;

    {
        let facebook = Facebook::new(
            config_for(&server, Some(cache_dir.path())),
            authed_session(),
        )
        .expect("facade");
        facebook.load_object("42", ObjectType::User).await.expect("network load");
    }

    let facebook = Facebook::new(
        config_for(&server, Some(cache_dir.path())),
        authed_session(),
    )
    .expect("facade");
    let user = facebook.load_object("42", ObjectType::User).await.expect("cache load");
    assert_eq!(user.name(), Some("Ann"));
}

#[tokio::test]
async fn load_connection_requests_the_edge_path() {
    let (server, facebook) = setup().await;

    Mock::given(method("GET"))
        .and(path("/42/photos"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "p1", "type": "photo" },
                { "id": "p2", "type": "photo" },
            ]
        })))
        .mount(&server)
        .await;

    let page = facebook
        .load_connection(&connection_object("42", "photos"))
        .await
        .expect("connection load");

    assert_eq!(page.count, 2);
    assert_eq!(page.load_type, LoadType::Initial);
    assert_eq!(page.objects[0].kind(), ObjectType::Photo);
}

#[tokio::test]
async fn refresh_connection_passes_since_and_reports_new() {
    let (server, facebook) = setup().await;

    Mock::given(method("GET"))
        .and(path("/42/feed"))
        .and(query_param("since", "1328000000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let page = facebook
        .refresh_connection(&connection_object("42", "feed"), 1_328_000_000)
        .await
        .expect("refresh");
    assert_eq!(page.load_type, LoadType::New);
    assert_eq!(page.count, 0);
}

#[tokio::test]
async fn load_older_passes_until_and_reports_old() {
    let (server, facebook) = setup().await;

    Mock::given(method("GET"))
        .and(path("/42/feed"))
        .and(query_param("until", "1327000000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "old-post", "type": "status" }]
        })))
        .mount(&server)
        .await;

    let page = facebook
        .load_older(&connection_object("42", "feed"), 1_327_000_000)
        .await
        .expect("page back");
    assert_eq!(page.load_type, LoadType::Old);
    assert_eq!(page.objects[0].id.as_deref(), Some("old-post"));
}

#[tokio::test]
async fn load_likes_maps_users() {
    let (server, facebook) = setup().await;

    Mock::given(method("GET"))
        .and(path("/55/likes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "u1", "name": "Ann" },
                { "id": "u2", "name": "Bob" },
            ]
        })))
        .mount(&server)
        .await;

    let likes = facebook.load_likes("55").await.expect("likes");
    assert_eq!(likes.len(), 2);
    assert_eq!(likes[0].kind(), ObjectType::User);
    assert_eq!(likes[1].name(), Some("Bob"));
}

#[tokio::test]
async fn load_album_for_photo_follows_the_album_reference() {
    let (server, facebook) = setup().await;

    Mock::given(method("GET"))
        .and(path("/p9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "p9", "type": "photo", "album": { "id": "a5" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "a5", "type": "album", "name": "Trip", "count": 24
        })))
        .mount(&server)
        .await;

    let photo = facebook.load_object("p9", ObjectType::Photo).await.expect("photo");
    let album = facebook.load_album_for_photo(&photo).await.expect("album");
    assert_eq!(album.kind(), ObjectType::Album);
    assert_eq!(album.name(), Some("Trip"));
}

#[tokio::test]
async fn load_user_falls_back_to_session_user() {
    let (server, facebook) = setup().await;
    facebook.session().set_current_user_id("100001");

    Mock::given(method("GET"))
        .and(path("/100001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "100001", "type": "user", "name": "Ann"
        })))
        .mount(&server)
        .await;

    let user = facebook.load_user(&GraphObject::default()).await.expect("user");
    assert_eq!(user.id.as_deref(), Some("100001"));
}

#[tokio::test]
async fn load_picture_caches_bytes() {
    let (server, facebook) = setup().await;

    let jpeg: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0];
    Mock::given(method("GET"))
        .and(path("/77/picture"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg))
        .expect(1)
        .mount(&server)
        .await;

    let first = facebook.load_picture("77").await.expect("first fetch");
    let second = facebook.load_picture("77").await.expect("cached fetch");
    assert_eq!(first, jpeg);
    assert_eq!(second, jpeg);
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn post_like_and_unlike_hit_the_same_edge() {
    let (server, facebook) = setup().await;

    Mock::given(method("POST"))
        .and(path("/55/likes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/55/likes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    let liked = facebook.post_like("55", true).await.expect("like");
    assert_eq!(liked, json!(true));
    let unliked = facebook.post_like("55", false).await.expect("unlike");
    assert_eq!(unliked, json!(true));
}

#[tokio::test]
async fn post_comment_returns_raw_json_and_invalidates_cache() {
    let (server, facebook) = setup().await;

    Mock::given(method("GET"))
        .and(path("/55"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "55", "type": "photo"
        })))
        .expect(2) // reloaded after the comment invalidates the cache
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/55/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "55_901" })))
        .mount(&server)
        .await;

    facebook.load_object("55", ObjectType::Photo).await.expect("prime cache");
    let result = facebook.post_comment("nice photo", "55").await.expect("comment");
    assert_eq!(result["id"], "55_901");
    facebook.load_object("55", ObjectType::Photo).await.expect("reload");
}

// ── Failures & events ───────────────────────────────────────────────

#[tokio::test]
async fn token_rejection_clears_session_and_broadcasts_once() {
    let (server, facebook) = setup().await;
    let mut events = facebook.events();

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "Invalid OAuth access token.", "type": "OAuthException", "code": 190 }
        })))
        .mount(&server)
        .await;

    let result = facebook.load_object("me", ObjectType::User).await;
    assert!(matches!(result, Err(CoreError::TokenRejected { .. })));

    // Session token is gone.
    assert!(facebook.session().access_token().is_none());

    // Exactly one rejection event.
    assert_eq!(
        events.try_recv().expect("one event"),
        FacebookEvent::AccessTokenRejected
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn transport_failure_broadcasts_connection_error() {
    // Point at a closed port; no server listening.
    let mut config = FacebookConfig::new("app");
    config.graph_base = Url::parse("http://127.0.0.1:1").expect("url");
    config.timeout = Duration::from_secs(1);
    let facebook = Facebook::new(config, authed_session()).expect("facade");
    let mut events = facebook.events();

    let result = facebook.load_object("123", ObjectType::Status).await;
    assert!(matches!(result, Err(CoreError::ConnectionFailed { .. })));

    match events.try_recv().expect("one event") {
        FacebookEvent::ConnectionError { .. } => {}
        other => panic!("expected ConnectionError, got {other:?}"),
    }
}

#[tokio::test]
async fn completed_authorization_stores_token_and_broadcasts() {
    let (server, facebook) = setup().await;
    facebook.session().clear();
    let mut events = facebook.events();

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "100001", "type": "user", "name": "Ann"
        })))
        .mount(&server)
        .await;

    let redirect =
        "http://www.facebook.com/connect/login_success.html#access_token=fresh-tok&expires_in=5184000";
    facebook.complete_authorization(redirect).await.expect("auth");

    let session = facebook.session();
    assert!(session.access_token().is_some());
    assert!(session.access_token_expiration().is_some());
    assert_eq!(session.current_user_id().as_deref(), Some("100001"));

    assert_eq!(
        events.try_recv().expect("one event"),
        FacebookEvent::UserAuthenticated {
            user_id: Some("100001".to_owned())
        }
    );
}

#[tokio::test]
async fn denied_authorization_broadcasts_the_reason() {
    let (_server, facebook) = setup().await;
    let mut events = facebook.events();

    let result = facebook
        .complete_authorization("http://cb?error_description=The+user+denied+your+request.")
        .await;
    assert!(matches!(result, Err(CoreError::AuthenticationFailed { .. })));

    match events.try_recv().expect("one event") {
        FacebookEvent::AuthenticationError { reason } => {
            assert_eq!(reason, "The user denied your request.");
        }
        other => panic!("expected AuthenticationError, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_top_level_response_is_a_mapping_error() {
    let (server, facebook) = setup().await;

    Mock::given(method("GET"))
        .and(path("/123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("just a string")))
        .mount(&server)
        .await;

    let result = facebook.load_object("123", ObjectType::Status).await;
    assert!(
        matches!(result, Err(CoreError::Mapping { .. })),
        "expected Mapping, got: {result:?}"
    );
}
