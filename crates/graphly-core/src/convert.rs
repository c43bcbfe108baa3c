// ── JSON-to-domain mapping ──
//
// Turns raw Graph/FQL payloads into `GraphObject`s. Field-by-field copies:
// unknown keys are ignored, missing keys leave fields unset, and only a
// top-level shape mismatch (or a Graph error envelope) is an error.
// Anything less than that degrades to a partially-populated object with a
// log line.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::warn;

use graphly_api::ObjectType;
use graphly_api::object_type::connection;

use crate::error::CoreError;
use crate::model::{CommentSummary, GraphObject, LikeSummary, ObjectData, ObjectRef};

/// Which direction a feed page was loaded in, relative to what the caller
/// already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum LoadType {
    /// Newer than what was loaded before (a `since` query).
    New = -1,
    /// First page.
    Initial = 0,
    /// Older, paged content (an `until`/offset query).
    Old = 1,
}

/// One mapped page of a feed/stream response.
#[derive(Debug, Clone)]
pub struct FeedPage {
    pub objects: Vec<GraphObject>,
    pub load_type: LoadType,
    pub count: usize,
}

// ── Entry points ────────────────────────────────────────────────────

/// Map a JSON dictionary into a [`GraphObject`].
///
/// `expected` is a hint for payloads that do not describe themselves (FQL
/// rows, bare connection entries); a `"type"` marker in the payload always
/// wins over the hint.
pub fn map_object(value: &Value, expected: ObjectType) -> Result<GraphObject, CoreError> {
    if let Some(err) = detect_api_error(value) {
        return Err(err);
    }

    let Some(dict) = value.as_object() else {
        return Err(CoreError::Mapping {
            reason: format!("expected a JSON object, got {}", json_kind(value)),
        });
    };

    Ok(map_dict(dict, expected))
}

/// Map a JSON array into objects, preserving input order.
pub fn map_array(value: &Value, expected: ObjectType) -> Result<Vec<GraphObject>, CoreError> {
    if let Some(err) = detect_api_error(value) {
        return Err(err);
    }

    let Some(items) = value.as_array() else {
        return Err(CoreError::Mapping {
            reason: format!("expected a JSON array, got {}", json_kind(value)),
        });
    };

    Ok(map_elements(items, expected))
}

/// Map a feed/stream response: either a bare array (FQL) or the Graph's
/// `{"data": [...]}` wrapper. The load direction is threaded through from
/// the request that produced the response; `count` is the number of mapped
/// objects.
pub fn map_feed_response(
    value: &Value,
    expected: ObjectType,
    load_type: LoadType,
) -> Result<FeedPage, CoreError> {
    if let Some(err) = detect_api_error(value) {
        return Err(err);
    }

    let objects = match value {
        Value::Array(items) => map_elements(items, expected),
        Value::Object(dict) => match dict.get("data").and_then(Value::as_array) {
            Some(items) => map_elements(items, expected),
            // A single object where a page was expected: map it alone.
            None => vec![map_dict(dict, expected)],
        },
        other => {
            return Err(CoreError::Mapping {
                reason: format!("expected a feed response, got {}", json_kind(other)),
            });
        }
    };

    let count = objects.len();
    Ok(FeedPage {
        objects,
        load_type,
        count,
    })
}

/// Surface the Graph error envelope as a typed error instead of mapping it.
pub fn detect_api_error(value: &Value) -> Option<CoreError> {
    let error = value.get("error")?.as_object()?;
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    let error_type = error.get("type").and_then(Value::as_str);
    let code = error.get("code").and_then(Value::as_i64);

    let is_oauth = error_type == Some("OAuthException")
        || message.to_ascii_lowercase().contains("oauth access token");

    Some(if is_oauth {
        CoreError::TokenRejected { reason: message }
    } else {
        CoreError::Api { message, code }
    })
}

/// The element kind carried by a connection edge.
pub fn connection_element_type(tag: &str) -> ObjectType {
    match tag {
        connection::PHOTOS => ObjectType::Photo,
        connection::ALBUMS => ObjectType::Album,
        connection::STATUSES => ObjectType::Status,
        connection::LINKS => ObjectType::Link,
        connection::GROUPS => ObjectType::Group,
        connection::FRIEND_LISTS => ObjectType::FriendList,
        _ => ObjectType::Mixed,
    }
}

// ── Mapping internals ───────────────────────────────────────────────

fn map_elements(items: &[Value], expected: ObjectType) -> Vec<GraphObject> {
    items
        .iter()
        .filter_map(|item| match item.as_object() {
            Some(dict) => Some(map_dict(dict, expected)),
            None => {
                warn!(kind = json_kind(item), "skipping non-object array element");
                None
            }
        })
        .collect()
}

fn map_dict(dict: &Map<String, Value>, expected: ObjectType) -> GraphObject {
    let kind = dict
        .get("type")
        .and_then(Value::as_str)
        .map_or(expected, ObjectType::from_marker);

    let id = str_field(dict, "id").or_else(|| str_field(dict, "post_id"));

    let mut object = GraphObject {
        id,
        created_at: time_field(dict, "created_time"),
        updated_at: time_field(dict, "updated_time"),
        from: dict.get("from").and_then(map_object_ref),
        to: dict.get("to").and_then(map_to_ref),
        likes: map_likes(dict),
        comments: map_comments(dict),
        data: dict
            .get("data")
            .and_then(Value::as_array)
            .map(|items| map_elements(items, ObjectType::Mixed))
            .unwrap_or_default(),
        payload: map_payload(kind, dict),
        ..GraphObject::default()
    };

    object.connections = map_connections(dict, object.id.as_deref());
    object
}

/// Build tagged connection children for every connection key present in
/// the dict (the Graph inlines them when a query asks for fields).
fn map_connections(dict: &Map<String, Value>, parent: Option<&str>) -> Vec<GraphObject> {
    const CONNECTION_KEYS: [&str; 8] = [
        connection::HOME,
        connection::FEED,
        connection::GROUPS,
        connection::PHOTOS,
        connection::ALBUMS,
        connection::STATUSES,
        connection::LINKS,
        connection::FRIEND_LISTS,
    ];

    let mut connections = Vec::new();
    for key in CONNECTION_KEYS {
        let Some(value) = dict.get(key) else { continue };

        // Either `{"data": [...]}` or a bare array.
        let items = match value {
            Value::Object(inner) => inner.get("data").and_then(Value::as_array),
            Value::Array(items) => Some(items),
            _ => None,
        };
        let Some(items) = items else { continue };

        let element_type = connection_element_type(key);
        let mut entries = map_elements(items, element_type);
        for entry in &mut entries {
            if entry.parent.is_none() {
                entry.parent = parent.map(str::to_owned);
            }
        }

        connections.push(GraphObject {
            connection_type: Some(key.to_owned()),
            parent: parent.map(str::to_owned),
            data: entries,
            payload: ObjectData::Mixed {
                name: Some(key.to_owned()),
            },
            ..GraphObject::default()
        });
    }
    connections
}

fn map_payload(kind: ObjectType, dict: &Map<String, Value>) -> ObjectData {
    match kind {
        ObjectType::Status => ObjectData::Status {
            message: str_field(dict, "message"),
        },
        ObjectType::Photo => ObjectData::Photo {
            picture: str_field(dict, "picture"),
            source: str_field(dict, "source"),
            icon: str_field(dict, "icon"),
            caption: str_field(dict, "caption"),
            album: dict
                .get("album")
                .and_then(|album| album.get("id"))
                .and_then(Value::as_str)
                .map(str::to_owned),
        },
        ObjectType::Link => {
            let link = str_field(dict, "link");
            let is_video = link.as_deref().is_some_and(is_video_link);
            ObjectData::Link {
                link,
                name: str_field(dict, "name"),
                caption: str_field(dict, "caption"),
                description: str_field(dict, "description"),
                picture: str_field(dict, "picture"),
                is_video,
            }
        }
        ObjectType::Video => ObjectData::Video {
            name: str_field(dict, "name"),
            source: str_field(dict, "source"),
            picture: str_field(dict, "picture"),
            description: str_field(dict, "description"),
        },
        ObjectType::Checkin => ObjectData::Checkin {
            message: str_field(dict, "message"),
            place: dict
                .get("place")
                .and_then(|place| place.get("name"))
                .and_then(Value::as_str)
                .map(str::to_owned),
        },
        ObjectType::Activity => ObjectData::Activity {
            name: str_field(dict, "name"),
        },
        ObjectType::Comment => ObjectData::Comment {
            message: str_field(dict, "message"),
        },
        ObjectType::User => ObjectData::User {
            name: str_field(dict, "name"),
            picture: picture_field(dict),
            installed: bool_field(dict, "installed"),
        },
        ObjectType::Page => ObjectData::Page {
            name: str_field(dict, "name"),
            picture: picture_field(dict),
            link: str_field(dict, "link"),
            category: str_field(dict, "category"),
        },
        ObjectType::Group => ObjectData::Group {
            name: str_field(dict, "name"),
            description: str_field(dict, "description"),
            icon: str_field(dict, "icon"),
        },
        ObjectType::FriendList => ObjectData::FriendList {
            name: str_field(dict, "name"),
        },
        ObjectType::Album => ObjectData::Album {
            name: str_field(dict, "name"),
            link: str_field(dict, "link"),
            cover_photo: str_field(dict, "cover_photo"),
            photo_count: dict.get("count").and_then(Value::as_u64),
        },
        _ => ObjectData::Mixed {
            name: str_field(dict, "name"),
        },
    }
}

// ── Summaries ───────────────────────────────────────────────────────

fn map_likes(dict: &Map<String, Value>) -> LikeSummary {
    let mut summary = LikeSummary::default();

    match dict.get("likes") {
        // Old-style: `"likes": 12`
        Some(Value::Number(n)) => summary.count = n.as_u64(),
        // Graph/FQL style: `"likes": { "count": 12, "data": [...], ... }`
        Some(Value::Object(likes)) => {
            summary.count = likes.get("count").and_then(Value::as_u64);
            if let Some(flag) = likes.get("user_likes").and_then(Value::as_bool) {
                summary.liked_by_viewer = flag;
            }
            if let Some(flag) = likes.get("can_like").and_then(Value::as_bool) {
                summary.can_like = flag;
            }
            if let Some(items) = likes.get("data").and_then(Value::as_array) {
                summary.entries = map_elements(items, ObjectType::User);
            }
        }
        _ => {}
    }

    // FQL stream rows flatten these to the top level.
    if summary.count.is_none() {
        summary.count = dict.get("like_count").and_then(Value::as_u64);
    }
    if let Some(flag) = dict.get("user_likes").and_then(Value::as_bool) {
        summary.liked_by_viewer = flag;
    }

    summary
}

fn map_comments(dict: &Map<String, Value>) -> CommentSummary {
    let mut summary = CommentSummary::default();

    if let Some(Value::Object(comments)) = dict.get("comments") {
        summary.count = comments.get("count").and_then(Value::as_u64);
        if let Some(flag) = comments.get("user_commented").and_then(Value::as_bool) {
            summary.commented_by_viewer = flag;
        }
        // The Graph spells it `can_comment`; FQL's comment table `can_post`.
        if let Some(flag) = comments
            .get("can_comment")
            .or_else(|| comments.get("can_post"))
            .and_then(Value::as_bool)
        {
            summary.can_comment = flag;
        }
        if let Some(items) = comments.get("data").and_then(Value::as_array) {
            summary.entries = map_elements(items, ObjectType::Comment);
        }
    }

    if summary.count.is_none() {
        summary.count = dict.get("comment_count").and_then(Value::as_u64);
    }

    summary
}

// ── Field helpers ───────────────────────────────────────────────────

fn str_field(dict: &Map<String, Value>, key: &str) -> Option<String> {
    dict.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn bool_field(dict: &Map<String, Value>, key: &str) -> bool {
    dict.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// `picture` is a plain URL string in old payloads and
/// `{"data": {"url": ...}}` in newer ones.
fn picture_field(dict: &Map<String, Value>) -> Option<String> {
    match dict.get("picture") {
        Some(Value::String(url)) => Some(url.clone()),
        Some(Value::Object(wrapper)) => wrapper
            .get("data")
            .and_then(|data| data.get("url"))
            .and_then(Value::as_str)
            .map(str::to_owned),
        _ => None,
    }
}

/// Facebook timestamps: ISO-8601 with a numeric zone
/// (`2012-02-07T10:00:00+0000`) in the Graph, epoch seconds in FQL.
fn time_field(dict: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    match dict.get(key)? {
        Value::String(raw) => DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(|ts| DateTime::from_timestamp(ts, 0)),
        _ => None,
    }
}

fn map_object_ref(value: &Value) -> Option<ObjectRef> {
    let dict = value.as_object()?;
    Some(ObjectRef {
        id: str_field(dict, "id"),
        name: str_field(dict, "name"),
    })
}

/// `to` is sometimes a direct object, sometimes `{"data": [...]}`; the
/// first target is the one the old field pair (`toID`/`toName`) carried.
fn map_to_ref(value: &Value) -> Option<ObjectRef> {
    if let Some(items) = value.get("data").and_then(Value::as_array) {
        return items.first().and_then(map_object_ref);
    }
    map_object_ref(value)
}

fn is_video_link(url: &str) -> bool {
    const VIDEO_HOSTS: [&str; 3] = ["youtube.com", "youtu.be", "vimeo.com"];
    VIDEO_HOSTS.iter().any(|host| url.contains(host))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
