// Header builders for authenticated JSON requests
//
// Every Podium call sends a form-encoded body and expects JSON back. The
// only thing that varies is where `Authorization` comes from: the
// registered application (login) or a user session token (everything else).

use indexmap::IndexMap;

use crate::auth::{ApplicationRegistry, application_registry};
use crate::error::Error;
use crate::types::PodiumToken;

/// Request headers, kept in insertion order.
pub type Header = IndexMap<String, String>;

pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";
pub const ACCEPT_JSON: &str = "application/json";

/// Headers authorized by the process-wide registered application.
///
/// Fails with [`Error::ApplicationNotRegistered`] when nothing is registered.
pub fn json_header() -> Result<Header, Error> {
    json_header_from(application_registry())
}

/// Headers authorized by the application held in `registry`.
pub fn json_header_from(registry: &ApplicationRegistry) -> Result<Header, Error> {
    let credential = registry.current().ok_or(Error::ApplicationNotRegistered)?;
    Ok(with_authorization(credential.authorization()))
}

/// Headers authorized by a user session token.
pub fn json_header_token(token: &PodiumToken) -> Header {
    with_authorization(token.authorization())
}

fn with_authorization(authorization: String) -> Header {
    let mut header = Header::with_capacity(3);
    header.insert("Content-Type".into(), CONTENT_TYPE_FORM.into());
    header.insert("Accept".into(), ACCEPT_JSON.into());
    header.insert("Authorization".into(), authorization);
    header
}
