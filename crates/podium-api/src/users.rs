// User endpoints
//
// Users are addressed by the URI the API hands out (`PodiumAccount::user_uri`,
// friendship and follower listings), so the call takes a full URL rather
// than an id.

use serde_json::Value;
use tracing::debug;

use crate::account::listing_body;
use crate::client::PodiumClient;
use crate::context::{Deliver, RequestContext};
use crate::error::Error;
use crate::header::json_header_token;
use crate::request::{RequestHandle, RequestSpec};
use crate::types::{self, PodiumToken, PodiumUser};

/// Callbacks for [`PodiumClient::get_user`]; success receives the user.
pub type UserCallbacks = RequestContext<Deliver<PodiumUser>>;

impl PodiumClient {
    /// Fetch the user at `user_uri`.
    ///
    /// `GET {user_uri}` with the same `expand` / `quiet` fields as
    /// [`get_account`](Self::get_account). The payload is `{"user": {...}}`.
    pub fn get_user(
        &self,
        token: &PodiumToken,
        user_uri: &str,
        expand: bool,
        quiet: Option<&str>,
        callbacks: UserCallbacks,
    ) -> RequestHandle {
        debug!(user_uri, expand, "requesting user");
        let spec = RequestSpec::new(user_uri)
            .with_header(json_header_token(token))
            .with_body(listing_body(expand, quiet));
        self.make_request_custom_success(spec, user_success, callbacks)
    }
}

fn user_success(_: &RequestHandle, raw: Value, ctx: &UserCallbacks) -> Result<(), Error> {
    let user = PodiumUser::from_json(types::member(&raw, "user")?)?;
    ctx.deliver(user);
    Ok(())
}
