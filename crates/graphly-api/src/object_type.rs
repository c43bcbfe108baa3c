// ── Graph object type tags ──
//
// Every entity the Graph/FQL APIs return carries (or implies) one of these
// type tags. The tag drives payload mapping in `graphly-core` and connection
// path construction in `urls`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Connection edge names used by the Graph API.
///
/// A connection is a named one-to-many edge from an object to related
/// objects (e.g. a user's `feed`). Consumers scan connection sequences by
/// these tags.
pub mod connection {
    pub const HOME: &str = "home";
    pub const FEED: &str = "feed";
    pub const GROUPS: &str = "groups";
    pub const PHOTOS: &str = "photos";
    pub const ALBUMS: &str = "albums";
    pub const STATUSES: &str = "statuses";
    pub const LINKS: &str = "links";
    pub const FRIEND_LISTS: &str = "friendlists";
}

/// The kind of a Facebook entity.
///
/// Matches the `"type"` marker the Graph API embeds in self-describing
/// payloads. FQL result rows carry no marker, so callers supply an expected
/// kind as a hint and the marker wins whenever both are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ObjectType {
    Status,
    Photo,
    Link,
    Video,
    Checkin,
    Activity,
    Comment,
    User,
    Page,
    Group,
    FriendList,
    Album,
    /// Synthetic/aggregate containers and anything without a clean kind.
    Mixed,
}

impl ObjectType {
    /// Parse a Graph API type marker. Unknown markers map to [`Mixed`](Self::Mixed)
    /// rather than failing -- the API grows new kinds faster than clients do.
    pub fn from_marker(marker: &str) -> Self {
        match marker.to_ascii_lowercase().as_str() {
            "status" => Self::Status,
            "photo" => Self::Photo,
            "link" => Self::Link,
            "video" => Self::Video,
            "checkin" => Self::Checkin,
            "activity" => Self::Activity,
            "comment" => Self::Comment,
            "user" => Self::User,
            "page" => Self::Page,
            "group" => Self::Group,
            "friendlist" | "friend_list" => Self::FriendList,
            "album" => Self::Album,
            _ => Self::Mixed,
        }
    }

    /// The canonical wire marker for this kind.
    pub fn as_marker(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Photo => "photo",
            Self::Link => "link",
            Self::Video => "video",
            Self::Checkin => "checkin",
            Self::Activity => "activity",
            Self::Comment => "comment",
            Self::User => "user",
            Self::Page => "page",
            Self::Group => "group",
            Self::FriendList => "friendlist",
            Self::Album => "album",
            Self::Mixed => "mixed",
        }
    }

    /// The connection path segment this kind is loaded through, where one
    /// is declared.
    ///
    /// Only explicitly mapped kinds return a key; everything else is `None`.
    /// Notably `User` has no mapping -- users are not reachable through a
    /// type-filtered connection.
    pub fn connection_filter_key(self) -> Option<&'static str> {
        match self {
            Self::Photo => Some(connection::PHOTOS),
            Self::Album => Some(connection::ALBUMS),
            Self::Status => Some(connection::STATUSES),
            Self::Link => Some(connection::LINKS),
            Self::Group => Some(connection::GROUPS),
            Self::FriendList => Some(connection::FRIEND_LISTS),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_marker())
    }
}

impl FromStr for ObjectType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_marker(s))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn marker_roundtrip() {
        for ty in [
            ObjectType::Status,
            ObjectType::Photo,
            ObjectType::Link,
            ObjectType::Video,
            ObjectType::Checkin,
            ObjectType::Activity,
            ObjectType::Comment,
            ObjectType::User,
            ObjectType::Page,
            ObjectType::Group,
            ObjectType::FriendList,
            ObjectType::Album,
        ] {
            assert_eq!(ObjectType::from_marker(ty.as_marker()), ty);
        }
    }

    #[test]
    fn unknown_marker_maps_to_mixed() {
        assert_eq!(ObjectType::from_marker("question"), ObjectType::Mixed);
        assert_eq!(ObjectType::from_marker(""), ObjectType::Mixed);
    }

    #[test]
    fn marker_parsing_is_case_insensitive() {
        assert_eq!(ObjectType::from_marker("Photo"), ObjectType::Photo);
        assert_eq!(ObjectType::from_marker("STATUS"), ObjectType::Status);
    }

    #[test]
    fn declared_filter_keys() {
        assert_eq!(
            ObjectType::Photo.connection_filter_key(),
            Some("photos")
        );
        assert_eq!(
            ObjectType::Album.connection_filter_key(),
            Some("albums")
        );
        assert_eq!(
            ObjectType::FriendList.connection_filter_key(),
            Some("friendlists")
        );
    }

    #[test]
    fn unmapped_kinds_have_no_filter_key() {
        assert_eq!(ObjectType::User.connection_filter_key(), None);
        assert_eq!(ObjectType::Comment.connection_filter_key(), None);
        assert_eq!(ObjectType::Mixed.connection_filter_key(), None);
    }

    #[test]
    fn from_str_never_fails() {
        let ty: ObjectType = "album".parse().unwrap();
        assert_eq!(ty, ObjectType::Album);
    }
}
