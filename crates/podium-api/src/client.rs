// Podium API client
//
// Holds the base URL and the transport. The three request builders live
// here; resource calls (account, users, oauth) are inherent methods in
// their own files and only choose URL, method, body and headers.

use std::fmt;
use std::sync::Arc;

use serde_json::{Value, json};
use url::Url;

use crate::context::{DefaultContext, RequestContext, ResultTransformer, context_hooks};
use crate::error::Error;
use crate::request::{self, FailureKind, Hooks, RequestHandle, RequestSpec};
use crate::transport::{ReqwestTransport, Transport, TransportConfig};

/// Production host.
pub const DEFAULT_BASE_URL: &str = "https://podium.live";

/// Entry point for issuing Podium requests.
///
/// Cheaply cloneable; clones share the transport. Every call returns a
/// [`RequestHandle`] immediately and reports through callbacks later.
#[derive(Clone)]
pub struct PodiumClient {
    transport: Arc<dyn Transport>,
    base_url: Url,
}

impl PodiumClient {
    /// Create a client backed by [`ReqwestTransport`].
    ///
    /// Must be called from within a tokio runtime; request tasks are
    /// spawned onto it.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let transport = ReqwestTransport::new(transport)?;
        Ok(Self::with_transport(base_url, Arc::new(transport)))
    }

    /// Client for the production host.
    pub fn production(transport: &TransportConfig) -> Result<Self, Error> {
        Self::new(Url::parse(DEFAULT_BASE_URL)?, transport)
    }

    /// Create a client on top of any [`Transport`].
    pub fn with_transport(base_url: Url, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            base_url,
        }
    }

    /// The host every resource URL is built from.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/{path}`
    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// `{base}/api/v1/{path}`
    pub(crate) fn api_url(&self, path: &str) -> String {
        self.url(&format!("api/v1/{}", path.trim_start_matches('/')))
    }

    // ── Request builders ─────────────────────────────────────────────

    /// Start a request with explicit lifecycle hooks.
    ///
    /// Unset hooks stay unset. `extra` is passed, unchanged, as the last
    /// argument of whichever hook fires. No result transformation happens:
    /// hooks see the raw decoded payload.
    pub fn make_request<D: Send + Sync + 'static>(
        &self,
        spec: RequestSpec,
        hooks: Hooks<D>,
        extra: Option<D>,
    ) -> RequestHandle {
        request::start(self.transport.as_ref(), spec, hooks, extra)
    }

    /// Start a request reporting through a flat callback context.
    ///
    /// Success calls `success_callback(raw, ctx)`; failure, error and
    /// redirect call `failure_callback(kind, raw, ctx)`; progress calls
    /// `progress_callback(current, total, ctx)`. Unset callbacks are no-ops.
    pub fn make_request_default(&self, spec: RequestSpec, ctx: DefaultContext) -> RequestHandle {
        let hooks = context_hooks().on_success(
            |_: &RequestHandle, raw: Value, ctx: Option<&DefaultContext>| {
                if let Some(ctx) = ctx {
                    ctx.notify_success(raw);
                }
            },
        );
        self.make_request(spec, hooks, Some(ctx))
    }

    /// Like [`make_request_default`](Self::make_request_default), but success
    /// runs `transformer(handle, raw, ctx)`, which decides whether and how
    /// the success callback fires.
    ///
    /// A transformer error reaches `failure_callback` as
    /// [`FailureKind::Error`] with `{"error": message, "body": raw}`, and is
    /// also returned from [`RequestHandle::complete`].
    pub fn make_request_custom_success<S, T>(
        &self,
        spec: RequestSpec,
        transformer: T,
        ctx: RequestContext<S>,
    ) -> RequestHandle
    where
        S: Send + Sync + 'static,
        T: ResultTransformer<S>,
    {
        let hooks = context_hooks().try_on_success(
            move |handle: &RequestHandle, raw: Value, ctx: Option<&RequestContext<S>>| {
                let Some(ctx) = ctx else {
                    return Ok(());
                };
                let body = raw.clone();
                transformer.transform(handle, raw, ctx).inspect_err(|e| {
                    ctx.notify_failure(
                        FailureKind::Error,
                        json!({ "error": e.to_string(), "body": body }),
                    );
                })
            },
        );
        self.make_request(spec, hooks, Some(ctx))
    }
}

impl fmt::Debug for PodiumClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PodiumClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
