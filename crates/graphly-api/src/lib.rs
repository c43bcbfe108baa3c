// graphly-api: Async Rust client for the Facebook Graph and FQL APIs

pub mod error;
pub mod graph;
pub mod object_type;
pub mod session;
pub mod transport;
pub mod urls;

pub use error::Error;
pub use graph::GraphClient;
pub use object_type::ObjectType;
pub use session::{MemoryTokenStore, Session, TokenStore};
