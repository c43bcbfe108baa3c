// Graph API surface: transport mechanics in `client`, read endpoints in
// `read`, write endpoints in `write`. Endpoint modules are inherent-method
// extensions of `GraphClient`, one file per concern.

mod client;
mod read;
mod write;

pub use client::GraphClient;
