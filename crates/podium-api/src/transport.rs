// Transport: where requests actually meet the network.
//
// The request layer only ever talks to the `Transport` trait. The bundled
// `ReqwestTransport` runs each request as its own tokio task and reports
// progress and the terminal outcome back through the `RequestHandle`.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::error::Error;
use crate::header::Header;
use crate::request::{FailureKind, Outcome, RequestHandle};

/// Executes requests out of band.
///
/// `start` must return without waiting on the network. The implementation
/// then calls [`RequestHandle::progress`] any number of times followed by
/// exactly one [`RequestHandle::complete`].
pub trait Transport: Send + Sync {
    fn start(&self, request: RequestHandle);
}

/// TLS root configuration.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the bundled webpki roots.
    #[default]
    System,
    /// Additionally trust the CA certificate in the given PEM file.
    CustomCa(PathBuf),
}

/// Settings for the HTTP client behind [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            user_agent: concat!("podium-api/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// Redirects are never followed: a 3xx is a terminal outcome of its own.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .redirect(Policy::none());

        if let TlsMode::CustomCa(path) = &self.tls {
            let cert_pem = std::fs::read(path)
                .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
            let cert = reqwest::Certificate::from_pem(&cert_pem)
                .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

// ── ReqwestTransport ─────────────────────────────────────────────────

/// [`Transport`] backed by `reqwest`, one spawned task per request.
///
/// Outcome mapping: 2xx is success, 3xx redirect, any other status failure,
/// and a request that never got a response is an error. Bodies are decoded
/// as JSON, falling back to a JSON string of the text (`null` when empty).
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    runtime: Handle,
}

impl ReqwestTransport {
    /// Build a transport on the tokio runtime of the calling context.
    pub fn new(config: &TransportConfig) -> Result<Self, Error> {
        let runtime = Handle::try_current().map_err(|e| Error::NoRuntime(e.to_string()))?;
        Ok(Self::with_client(config.build_client()?, runtime))
    }

    /// Use a pre-built client and an explicit runtime handle.
    ///
    /// The client should not follow redirects, or 3xx outcomes are lost.
    pub fn with_client(http: reqwest::Client, runtime: Handle) -> Self {
        Self { http, runtime }
    }
}

impl Transport for ReqwestTransport {
    fn start(&self, request: RequestHandle) {
        let http = self.http.clone();
        self.runtime.spawn(run(http, request));
    }
}

async fn run(http: reqwest::Client, request: RequestHandle) {
    let outcome = match execute(&http, &request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            debug!(id = %request.id(), error = %e, "request errored");
            Outcome::Failure(FailureKind::Error, Value::String(e.to_string()))
        }
    };

    if let Err(e) = request.complete(outcome) {
        warn!(id = %request.id(), error = %e, "success handler rejected response");
    }
}

async fn execute(http: &reqwest::Client, request: &RequestHandle) -> Result<Outcome, Error> {
    let mut builder = http.request(request.method().clone(), request.url());
    if let Some(header) = request.header() {
        builder = builder.headers(header_map(header)?);
    }
    if let Some(body) = request.body() {
        builder = builder.body(body.to_owned());
    }

    let mut resp = builder.send().await?;
    let status = resp.status();
    let total = resp.content_length();

    let mut payload = Vec::new();
    while let Some(chunk) = resp.chunk().await? {
        payload.extend_from_slice(&chunk);
        request.progress(u64::try_from(payload.len()).unwrap_or(u64::MAX), total);
    }

    debug!(id = %request.id(), %status, bytes = payload.len(), "response received");

    let raw = decode_payload(&payload);
    Ok(if status.is_success() {
        Outcome::Success(raw)
    } else if status.is_redirection() {
        Outcome::Failure(FailureKind::Redirect, raw)
    } else {
        Outcome::Failure(FailureKind::Failure, raw)
    })
}

fn header_map(header: &Header) -> Result<HeaderMap, Error> {
    let mut map = HeaderMap::with_capacity(header.len());
    for (name, value) in header {
        let invalid = |reason: String| Error::InvalidHeader {
            name: name.clone(),
            reason,
        };
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn decode_payload(payload: &[u8]) -> Value {
    if payload.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(payload)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(payload).into_owned()))
}
