use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// A Podium user profile.
///
/// `description` and `avatar_url` may be `null` but the keys must exist;
/// the explicit `deserialize_with` turns off serde's missing-as-`None`
/// handling for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodiumUser {
    #[serde(rename = "id")]
    pub user_id: i64,
    #[serde(rename = "URI")]
    pub uri: String,
    pub username: String,
    #[serde(deserialize_with = "Option::deserialize")]
    pub description: Option<String>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub avatar_url: Option<String>,
    /// Third-party links, kept as opaque JSON (usually an array).
    pub links: Value,
    pub friendships_uri: String,
    pub followers_uri: String,
}

impl PodiumUser {
    pub fn from_json(json: &Value) -> Result<Self, Error> {
        super::from_json(json)
    }
}
