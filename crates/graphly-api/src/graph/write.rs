// Graph API write endpoints
//
// Comments and likes. Writes require an access token; the raw JSON result
// goes straight back to the caller because the API echoes only a success
// marker or the new object's id.

use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::graph::client::GraphClient;

impl GraphClient {
    /// Post a comment on an object.
    ///
    /// `POST /{id}/comments` with a form-encoded `message`.
    pub async fn post_comment(&self, object_id: &str, message: &str) -> Result<Value, Error> {
        let url = self.authed_url(&format!("{object_id}/comments"), &[])?;
        self.post_form(url, &[("message", message)]).await
    }

    /// Like or unlike an object.
    ///
    /// `POST /{id}/likes` to like; `DELETE /{id}/likes` to remove the
    /// like -- same edge, different verb.
    pub async fn set_like(&self, object_id: &str, liked: bool) -> Result<Value, Error> {
        let url = self.authed_url(&format!("{object_id}/likes"), &[])?;
        if liked {
            self.post_form(url, &[]).await
        } else {
            debug!("removing like on {}", object_id);
            self.delete(url).await
        }
    }
}
