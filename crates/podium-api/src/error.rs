use thiserror::Error;

/// Top-level error type for the `podium-api` crate.
///
/// Covers the failures the library itself can detect: missing application
/// registration, request construction, transport setup, and response
/// decoding. Outcomes reported by the server (HTTP failure statuses,
/// redirects, connection errors during a request) are not errors here --
/// they reach the caller's failure callback as a [`FailureKind`](crate::FailureKind).
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Application-level auth was requested but no application is registered.
    #[error("No Podium application registered; call register_application first")]
    ApplicationNotRegistered,

    // ── Request construction ────────────────────────────────────────
    /// Caller-supplied context data used one of the callback key names.
    #[error("Context key '{0}' is reserved for request callbacks")]
    ReservedContextKey(String),

    /// A header name or value cannot be sent over HTTP.
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS root certificate could not be loaded.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The transport was built outside of a tokio runtime.
    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),

    // ── Data ────────────────────────────────────────────────────────
    /// A success payload lacks keys required to build a domain object.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String, body: String },
}

impl Error {
    /// Returns `true` if the request was refused before reaching the network
    /// because no application credential is registered.
    pub fn is_not_registered(&self) -> bool {
        matches!(self, Self::ApplicationNotRegistered)
    }

    /// Returns `true` if a response could not be mapped to a domain object.
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, Self::MalformedResponse { .. })
    }
}
