use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// The account behind an authentication token, from `GET /api/v1/account`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodiumAccount {
    #[serde(rename = "id")]
    pub account_id: i64,
    pub username: String,
    pub email: String,
    pub devices_uri: String,
    pub exports_uri: String,
    pub streams_uri: String,
    pub user_uri: String,
    pub events_uri: String,
}

impl PodiumAccount {
    pub fn from_json(json: &Value) -> Result<Self, Error> {
        super::from_json(json)
    }
}
