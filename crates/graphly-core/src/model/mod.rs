// ── Domain model ──
//
// The canonical representation of Facebook entities. One struct carries
// the fields every kind shares; the `ObjectData` payload enum carries what
// is specific to each kind, keyed by the wire type tag.

pub mod object;
pub mod payload;

pub use object::{CommentSummary, GraphObject, LikeSummary, ObjectRef};
pub use payload::ObjectData;
