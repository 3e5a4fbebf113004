// Podium domain types
//
// Flat records built from successful API responses. Every required key
// must be present: a missing key is a `MalformedResponse`, never a
// partially filled object.

mod account;
mod token;
mod user;

pub use account::PodiumAccount;
pub use token::PodiumToken;
pub use user::PodiumUser;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;

/// Deserialize `value` into `T`, mapping failures to `MalformedResponse`.
pub(crate) fn from_json<T: DeserializeOwned>(value: &Value) -> Result<T, Error> {
    T::deserialize(value).map_err(|e| Error::MalformedResponse {
        message: e.to_string(),
        body: value.to_string(),
    })
}

/// Look up a top-level key of a response envelope such as `{"account": {...}}`.
pub(crate) fn member<'a>(raw: &'a Value, key: &str) -> Result<&'a Value, Error> {
    raw.get(key).ok_or_else(|| Error::MalformedResponse {
        message: format!("missing field `{key}`"),
        body: raw.to_string(),
    })
}
