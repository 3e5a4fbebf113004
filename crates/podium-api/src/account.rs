// Account endpoint
//
// `GET /api/v1/account` returns the account behind the session token,
// wrapped as `{"account": {...}}`.

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::client::PodiumClient;
use crate::context::{Deliver, RequestContext};
use crate::error::Error;
use crate::header::json_header_token;
use crate::request::{FormBody, RequestHandle, RequestSpec};
use crate::types::{self, PodiumAccount, PodiumToken};

/// Callbacks for [`PodiumClient::get_account`]; success receives the account.
pub type AccountCallbacks = RequestContext<Deliver<PodiumAccount>>;

impl PodiumClient {
    /// Fetch the account for `token`.
    ///
    /// `GET /api/v1/account` with form fields `expand` and, when given,
    /// `quiet` (suppresses the endpoint description in HTML renderings).
    pub fn get_account(
        &self,
        token: &PodiumToken,
        expand: bool,
        quiet: Option<&str>,
        callbacks: AccountCallbacks,
    ) -> RequestHandle {
        debug!(expand, quiet, "requesting account");
        let spec = RequestSpec::new(self.api_url("account"))
            .with_method(Method::GET)
            .with_header(json_header_token(token))
            .with_body(listing_body(expand, quiet));
        self.make_request_custom_success(spec, account_success, callbacks)
    }
}

/// `{expand}` plus `quiet` only when the caller supplied it.
pub(crate) fn listing_body(expand: bool, quiet: Option<&str>) -> FormBody {
    let mut body = FormBody::new();
    body.insert("expand".into(), expand.to_string());
    if let Some(quiet) = quiet {
        body.insert("quiet".into(), quiet.into());
    }
    body
}

fn account_success(_: &RequestHandle, raw: Value, ctx: &AccountCallbacks) -> Result<(), Error> {
    let account = PodiumAccount::from_json(types::member(&raw, "account")?)?;
    ctx.deliver(account);
    Ok(())
}
