// Token endpoint
//
// Exchanges a username and password for a session token. This is the one
// call authorized by the registered application rather than by a token.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use crate::client::PodiumClient;
use crate::context::{Deliver, RequestContext};
use crate::error::Error;
use crate::header::json_header;
use crate::request::{FormBody, RequestHandle, RequestSpec};
use crate::types::PodiumToken;

/// Callbacks for [`PodiumClient::request_token`]; success receives the token.
pub type TokenCallbacks = RequestContext<Deliver<PodiumToken>>;

impl PodiumClient {
    /// Log in as `username`.
    ///
    /// `POST /oauth/token` with `grant_type=password`. Fails with
    /// [`Error::ApplicationNotRegistered`] before touching the network when
    /// no application is registered.
    pub fn request_token(
        &self,
        username: &str,
        password: &SecretString,
        callbacks: TokenCallbacks,
    ) -> Result<RequestHandle, Error> {
        let header = json_header()?;
        debug!(username, "requesting session token");

        let mut body = FormBody::new();
        body.insert("grant_type".into(), "password".into());
        body.insert("username".into(), username.into());
        body.insert("password".into(), password.expose_secret().into());

        let spec = RequestSpec::new(self.url("oauth/token"))
            .with_method(Method::POST)
            .with_header(header)
            .with_body(body);
        Ok(self.make_request_custom_success(spec, token_success, callbacks))
    }
}

fn token_success(_: &RequestHandle, raw: Value, ctx: &TokenCallbacks) -> Result<(), Error> {
    ctx.deliver(PodiumToken::from_json(&raw)?);
    Ok(())
}
