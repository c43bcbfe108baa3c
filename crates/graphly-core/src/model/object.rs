// ── GraphObject: the canonical Facebook entity ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use graphly_api::ObjectType;
use graphly_api::object_type::connection;

use super::payload::ObjectData;

/// Lightweight reference to another object: id and display name only.
///
/// Used for `from`/`to` attribution and the parent back-reference. A plain
/// id lookup, never an owning edge -- photo → album → photo-list cycles
/// stay cycles of strings, not of pointers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Like state of an object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeSummary {
    pub count: Option<u64>,
    pub liked_by_viewer: bool,
    pub can_like: bool,
    /// Users who liked the object, when the payload inlines them.
    pub entries: Vec<GraphObject>,
}

impl Default for LikeSummary {
    fn default() -> Self {
        Self {
            count: None,
            liked_by_viewer: false,
            can_like: true,
            entries: Vec::new(),
        }
    }
}

/// Comment state of an object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentSummary {
    pub count: Option<u64>,
    pub commented_by_viewer: bool,
    pub can_comment: bool,
    /// Inlined comment objects, when present.
    pub entries: Vec<GraphObject>,
}

impl Default for CommentSummary {
    fn default() -> Self {
        Self {
            count: None,
            commented_by_viewer: false,
            can_comment: true,
            entries: Vec::new(),
        }
    }
}

/// A Facebook entity of any kind.
///
/// Common fields live here; kind-specific fields live in [`ObjectData`].
/// Everything except the payload discriminant is optional -- the Graph API
/// populates whatever the query asked for and nothing more.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphObject {
    /// Facebook object id. Absent on synthetic/aggregate objects.
    pub id: Option<String>,
    /// The connection edge that produced this object, when it represents
    /// one (e.g. "feed", "photos").
    pub connection_type: Option<String>,
    /// Id of the enclosing object (a photo's album, a connection's owner).
    pub parent: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub from: Option<ObjectRef>,
    pub to: Option<ObjectRef>,
    pub likes: LikeSummary,
    pub comments: CommentSummary,
    /// The FQL query associated with this object, when it was produced by
    /// one; reused to refresh the object's connection.
    pub fql: Option<String>,
    /// Connection edges hanging off this object, each tagged with its own
    /// `connection_type`.
    pub connections: Vec<GraphObject>,
    /// Child objects from the payload's `data` array.
    pub data: Vec<GraphObject>,
    pub payload: ObjectData,
}

impl GraphObject {
    /// Create an object with the given payload and nothing else set.
    pub fn new(payload: ObjectData) -> Self {
        Self {
            payload,
            ..Self::default()
        }
    }

    /// Create an object known only by id -- the starting point for loads.
    pub fn with_id(id: impl Into<String>, kind: ObjectType) -> Self {
        Self {
            id: Some(id.into()),
            payload: ObjectData::empty(kind),
            ..Self::default()
        }
    }

    /// The object's type tag.
    pub fn kind(&self) -> ObjectType {
        self.payload.kind()
    }

    /// The object's Graph API path.
    ///
    /// For a connection object that is `{parent}/{connection_type}`; for a
    /// plain entity it is the id. `None` when neither is known.
    pub fn graph_path(&self) -> Option<String> {
        match (&self.parent, &self.connection_type) {
            (Some(parent), Some(tag)) => Some(format!("{parent}/{tag}")),
            _ => self.id.clone(),
        }
    }

    // ── Connection lookups ───────────────────────────────────────────

    /// First connection whose tag matches -- tags are unique-ish but not
    /// guaranteed, so first match wins.
    pub fn connection(&self, tag: &str) -> Option<&GraphObject> {
        self.connections
            .iter()
            .find(|c| c.connection_type.as_deref() == Some(tag))
    }

    pub fn home_connection(&self) -> Option<&GraphObject> {
        self.connection(connection::HOME)
    }

    pub fn feed_connection(&self) -> Option<&GraphObject> {
        self.connection(connection::FEED)
    }

    pub fn groups_connection(&self) -> Option<&GraphObject> {
        self.connection(connection::GROUPS)
    }

    pub fn photos_connection(&self) -> Option<&GraphObject> {
        self.connection(connection::PHOTOS)
    }

    pub fn albums_connection(&self) -> Option<&GraphObject> {
        self.connection(connection::ALBUMS)
    }

    pub fn statuses_connection(&self) -> Option<&GraphObject> {
        self.connection(connection::STATUSES)
    }

    pub fn links_connection(&self) -> Option<&GraphObject> {
        self.connection(connection::LINKS)
    }

    /// Display name, whatever kind this is.
    pub fn name(&self) -> Option<&str> {
        self.payload.name()
    }

    /// Message text, whatever kind this is.
    pub fn message(&self) -> Option<&str> {
        self.payload.message()
    }
}
