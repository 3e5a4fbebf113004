use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::Error;

/// A session token authorizing requests on behalf of a user.
///
/// Either obtained from [`PodiumClient::request_token`](crate::PodiumClient::request_token)
/// or constructed from a token the caller already holds. The library never
/// stores tokens; each request takes one explicitly.
#[derive(Debug, Clone, Deserialize)]
pub struct PodiumToken {
    #[serde(rename = "access_token", deserialize_with = "secret_string")]
    token: SecretString,
    token_type: String,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    created_at: Option<DateTime<Utc>>,
}

impl PodiumToken {
    /// Wrap an existing bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            token_type: "bearer".into(),
            created_at: None,
        }
    }

    pub fn from_json(json: &Value) -> Result<Self, Error> {
        super::from_json(json)
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub(crate) fn authorization(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }
}

fn secret_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}
