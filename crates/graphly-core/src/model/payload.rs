// ── Kind-specific payloads ──
//
// One variant per Facebook entity kind. The discriminant doubles as the
// object's type tag, so matching on a payload is exhaustive where the old
// "bag of optionals" style could silently miss a kind.

use serde::{Deserialize, Serialize};

use graphly_api::ObjectType;

/// Kind-specific fields of a [`GraphObject`](super::GraphObject).
///
/// Every field is optional; mapping never fails because a key is absent
/// from the source JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ObjectData {
    Status {
        message: Option<String>,
    },
    Photo {
        picture: Option<String>,
        source: Option<String>,
        icon: Option<String>,
        caption: Option<String>,
        /// Id of the containing album, when the payload names one.
        album: Option<String>,
    },
    Link {
        link: Option<String>,
        name: Option<String>,
        caption: Option<String>,
        description: Option<String>,
        picture: Option<String>,
        /// Some links point at video hosts (YouTube and friends).
        is_video: bool,
    },
    Video {
        name: Option<String>,
        source: Option<String>,
        picture: Option<String>,
        description: Option<String>,
    },
    Checkin {
        message: Option<String>,
        place: Option<String>,
    },
    Activity {
        name: Option<String>,
    },
    Comment {
        message: Option<String>,
    },
    User {
        name: Option<String>,
        picture: Option<String>,
        installed: bool,
    },
    Page {
        name: Option<String>,
        picture: Option<String>,
        link: Option<String>,
        category: Option<String>,
    },
    Group {
        name: Option<String>,
        description: Option<String>,
        icon: Option<String>,
    },
    FriendList {
        name: Option<String>,
    },
    Album {
        name: Option<String>,
        link: Option<String>,
        cover_photo: Option<String>,
        photo_count: Option<u64>,
    },
    /// Synthetic/aggregate containers (connection sets, FQL result sets).
    Mixed {
        name: Option<String>,
    },
}

impl ObjectData {
    /// The type tag this payload corresponds to.
    pub fn kind(&self) -> ObjectType {
        match self {
            Self::Status { .. } => ObjectType::Status,
            Self::Photo { .. } => ObjectType::Photo,
            Self::Link { .. } => ObjectType::Link,
            Self::Video { .. } => ObjectType::Video,
            Self::Checkin { .. } => ObjectType::Checkin,
            Self::Activity { .. } => ObjectType::Activity,
            Self::Comment { .. } => ObjectType::Comment,
            Self::User { .. } => ObjectType::User,
            Self::Page { .. } => ObjectType::Page,
            Self::Group { .. } => ObjectType::Group,
            Self::FriendList { .. } => ObjectType::FriendList,
            Self::Album { .. } => ObjectType::Album,
            Self::Mixed { .. } => ObjectType::Mixed,
        }
    }

    /// An empty payload of the given kind, for objects known only by id.
    pub fn empty(kind: ObjectType) -> Self {
        match kind {
            ObjectType::Status => Self::Status { message: None },
            ObjectType::Photo => Self::Photo {
                picture: None,
                source: None,
                icon: None,
                caption: None,
                album: None,
            },
            ObjectType::Link => Self::Link {
                link: None,
                name: None,
                caption: None,
                description: None,
                picture: None,
                is_video: false,
            },
            ObjectType::Video => Self::Video {
                name: None,
                source: None,
                picture: None,
                description: None,
            },
            ObjectType::Checkin => Self::Checkin {
                message: None,
                place: None,
            },
            ObjectType::Activity => Self::Activity { name: None },
            ObjectType::Comment => Self::Comment { message: None },
            ObjectType::User => Self::User {
                name: None,
                picture: None,
                installed: false,
            },
            ObjectType::Page => Self::Page {
                name: None,
                picture: None,
                link: None,
                category: None,
            },
            ObjectType::Group => Self::Group {
                name: None,
                description: None,
                icon: None,
            },
            ObjectType::FriendList => Self::FriendList { name: None },
            ObjectType::Album => Self::Album {
                name: None,
                link: None,
                cover_photo: None,
                photo_count: None,
            },
            _ => Self::Mixed { name: None },
        }
    }

    /// Display name across kinds, whichever field carries it.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Link { name, .. }
            | Self::Video { name, .. }
            | Self::Activity { name }
            | Self::User { name, .. }
            | Self::Page { name, .. }
            | Self::Group { name, .. }
            | Self::FriendList { name }
            | Self::Album { name, .. }
            | Self::Mixed { name } => name.as_deref(),
            _ => None,
        }
    }

    /// Message text across kinds, whichever field carries it.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Status { message }
            | Self::Checkin { message, .. }
            | Self::Comment { message } => message.as_deref(),
            _ => None,
        }
    }
}

impl Default for ObjectData {
    fn default() -> Self {
        Self::Mixed { name: None }
    }
}
