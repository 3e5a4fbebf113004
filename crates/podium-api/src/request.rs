// Generic asynchronous request factory
//
// A request is described once (`RequestSpec`), bundled with up to five
// lifecycle hooks into a `RequestHandle`, and handed to a `Transport`.
// The transport reports back through `RequestHandle::progress` and
// `RequestHandle::complete`; the handle routes each report to the matching
// hook together with the request's extra data.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::error::Error;
use crate::header::Header;
use crate::transport::Transport;

/// Form fields for a request body, kept in insertion order.
pub type FormBody = IndexMap<String, String>;

/// `application/x-www-form-urlencoded` rendering of `body`.
pub fn encode_form(body: &FormBody) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(body)
        .finish()
}

// ── RequestSpec ──────────────────────────────────────────────────────

/// What to send: target URL, method, headers and body fields.
///
/// Defaults to `GET` with no headers and no body. Headers are sent exactly
/// as given; nothing is merged in at this level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    url: String,
    method: Method,
    header: Option<Header>,
    body: Option<FormBody>,
}

impl RequestSpec {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            header: None,
            body: None,
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, header: Header) -> Self {
        self.header = Some(header);
        self
    }

    pub fn with_body(mut self, body: FormBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    pub fn body(&self) -> Option<&FormBody> {
        self.body.as_ref()
    }
}

// ── Outcomes ─────────────────────────────────────────────────────────

/// Which non-success terminal event the transport reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The server answered with a failure status (4xx / 5xx).
    Failure,
    /// The request never produced a response (connect, timeout, bad URL).
    Error,
    /// The server answered with a redirect (3xx); redirects are not followed.
    Redirect,
}

impl FailureKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Failure => "failure",
            Self::Error => "error",
            Self::Redirect => "redirect",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of a request, carrying the raw decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Value),
    Failure(FailureKind, Value),
}

// ── Hooks ────────────────────────────────────────────────────────────

type TerminalHook<D> =
    Box<dyn FnOnce(&RequestHandle, Value, Option<&D>) -> Result<(), Error> + Send>;
type ProgressHook<D> = Box<dyn FnMut(&RequestHandle, u64, Option<u64>, Option<&D>) + Send>;

/// The five independently settable lifecycle slots of a request.
///
/// `D` is the extra data forwarded unchanged to whichever hook fires.
pub struct Hooks<D> {
    success: Option<TerminalHook<D>>,
    failure: Option<TerminalHook<D>>,
    error: Option<TerminalHook<D>>,
    redirect: Option<TerminalHook<D>>,
    progress: Option<ProgressHook<D>>,
}

impl<D: 'static> Hooks<D> {
    pub fn new() -> Self {
        Self {
            success: None,
            failure: None,
            error: None,
            redirect: None,
            progress: None,
        }
    }

    pub fn on_success<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&RequestHandle, Value, Option<&D>) + Send + 'static,
    {
        self.success = Some(infallible(hook));
        self
    }

    /// Like [`on_success`](Self::on_success), but the hook may reject the
    /// payload. The error is returned from [`RequestHandle::complete`].
    pub fn try_on_success<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&RequestHandle, Value, Option<&D>) -> Result<(), Error> + Send + 'static,
    {
        self.success = Some(Box::new(hook));
        self
    }

    pub fn on_failure<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&RequestHandle, Value, Option<&D>) + Send + 'static,
    {
        self.failure = Some(infallible(hook));
        self
    }

    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&RequestHandle, Value, Option<&D>) + Send + 'static,
    {
        self.error = Some(infallible(hook));
        self
    }

    pub fn on_redirect<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&RequestHandle, Value, Option<&D>) + Send + 'static,
    {
        self.redirect = Some(infallible(hook));
        self
    }

    pub fn on_progress<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&RequestHandle, u64, Option<u64>, Option<&D>) + Send + 'static,
    {
        self.progress = Some(Box::new(hook));
        self
    }

    pub fn slots(&self) -> HookSlots {
        HookSlots {
            success: self.success.is_some(),
            failure: self.failure.is_some(),
            error: self.error.is_some(),
            redirect: self.redirect.is_some(),
            progress: self.progress.is_some(),
        }
    }
}

impl<D: 'static> Default for Hooks<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> fmt::Debug for Hooks<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("success", &self.success.is_some())
            .field("failure", &self.failure.is_some())
            .field("error", &self.error.is_some())
            .field("redirect", &self.redirect.is_some())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

fn infallible<D, F>(hook: F) -> TerminalHook<D>
where
    D: 'static,
    F: FnOnce(&RequestHandle, Value, Option<&D>) + Send + 'static,
{
    Box::new(
        move |handle: &RequestHandle, raw: Value, extra: Option<&D>| -> Result<(), Error> {
            hook(handle, raw, extra);
            Ok(())
        },
    )
}

/// Which lifecycle slots a request registered.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HookSlots {
    pub success: bool,
    pub failure: bool,
    pub error: bool,
    pub redirect: bool,
    pub progress: bool,
}

// ── Type-erased adapters ─────────────────────────────────────────────

/// Routes the terminal outcome to the matching hook. Consumed on use.
type TerminalAdapter = Box<dyn FnOnce(&RequestHandle, Outcome) -> Result<(), Error> + Send>;
type ProgressAdapter = Box<dyn FnMut(&RequestHandle, u64, Option<u64>) + Send>;

/// Bind each hook to the shared extra data, erasing `D`.
fn adapters<D: Send + Sync + 'static>(
    hooks: Hooks<D>,
    extra: Option<D>,
) -> (TerminalAdapter, Option<ProgressAdapter>) {
    let Hooks {
        success,
        failure,
        error,
        redirect,
        progress,
    } = hooks;
    let extra = extra.map(Arc::new);

    let progress = progress.map(|mut hook| {
        let extra = extra.clone();
        Box::new(move |handle: &RequestHandle, current: u64, total: Option<u64>| {
            hook(handle, current, total, extra.as_deref());
        }) as ProgressAdapter
    });

    let terminal: TerminalAdapter = Box::new(move |handle: &RequestHandle, outcome: Outcome| {
        let (hook, raw) = match outcome {
            Outcome::Success(raw) => (success, raw),
            Outcome::Failure(FailureKind::Failure, raw) => (failure, raw),
            Outcome::Failure(FailureKind::Error, raw) => (error, raw),
            Outcome::Failure(FailureKind::Redirect, raw) => (redirect, raw),
        };
        match hook {
            Some(hook) => hook(handle, raw, extra.as_deref()),
            None => Ok(()),
        }
    });

    (terminal, progress)
}

// ── RequestHandle ────────────────────────────────────────────────────

/// A dispatched request.
///
/// Cheaply cloneable via `Arc`. The transport holds one clone while the
/// request is in flight; callers may keep another to inspect what was sent.
/// Each request gets a random id that doubles as its identity in hooks.
///
/// Hooks never run with an internal lock held, so they may call back into
/// the handle (`is_complete`, `progress`, `complete`).
#[derive(Clone)]
pub struct RequestHandle {
    inner: Arc<RequestInner>,
}

struct RequestInner {
    id: Uuid,
    spec: RequestSpec,
    body: Option<String>,
    slots: HookSlots,
    /// `None` once a terminal outcome has been delivered.
    terminal: Mutex<Option<TerminalAdapter>>,
    /// `None` when unset, after completion, or while the hook is running.
    progress: Mutex<Option<ProgressAdapter>>,
}

impl RequestHandle {
    pub(crate) fn new<D: Send + Sync + 'static>(
        spec: RequestSpec,
        hooks: Hooks<D>,
        extra: Option<D>,
    ) -> Self {
        let body = spec.body.as_ref().map(encode_form);
        let slots = hooks.slots();
        let (terminal, progress) = adapters(hooks, extra);
        Self {
            inner: Arc::new(RequestInner {
                id: Uuid::new_v4(),
                spec,
                body,
                slots,
                terminal: Mutex::new(Some(terminal)),
                progress: Mutex::new(progress),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn url(&self) -> &str {
        self.inner.spec.url()
    }

    pub fn method(&self) -> &Method {
        self.inner.spec.method()
    }

    pub fn header(&self) -> Option<&Header> {
        self.inner.spec.header()
    }

    /// The form-encoded request body, if the request carries one.
    pub fn body(&self) -> Option<&str> {
        self.inner.body.as_deref()
    }

    pub fn spec(&self) -> &RequestSpec {
        &self.inner.spec
    }

    /// Which lifecycle slots were registered at construction.
    pub fn hooks(&self) -> HookSlots {
        self.inner.slots
    }

    /// `true` once a terminal outcome has been delivered.
    pub fn is_complete(&self) -> bool {
        lock(&self.inner.terminal).is_none()
    }

    /// Report download progress. Ignored after completion, and when called
    /// from inside the progress hook itself.
    pub fn progress(&self, current: u64, total: Option<u64>) {
        trace!(id = %self.inner.id, current, ?total, "request progress");
        let hook = lock(&self.inner.progress).take();
        let Some(mut hook) = hook else {
            return;
        };
        hook(self, current, total);
        // A completion during the hook retires it for good. Lock order is
        // terminal, then progress.
        let terminal = lock(&self.inner.terminal);
        if terminal.is_some() {
            *lock(&self.inner.progress) = Some(hook);
        }
    }

    /// Deliver the terminal outcome to the matching hook.
    ///
    /// Only the first call has any effect. Errors come from a fallible
    /// success hook rejecting the payload.
    pub fn complete(&self, outcome: Outcome) -> Result<(), Error> {
        // Take the adapter out first so hooks run without the lock held.
        let terminal = lock(&self.inner.terminal).take();
        let Some(terminal) = terminal else {
            warn!(id = %self.inner.id, ?outcome, "request already completed, ignoring outcome");
            return Ok(());
        };
        *lock(&self.inner.progress) = None;
        debug!(
            id = %self.inner.id,
            outcome = match &outcome {
                Outcome::Success(_) => "success",
                Outcome::Failure(kind, _) => kind.as_str(),
            },
            "request finished"
        );
        terminal(self, outcome)
    }
}

fn lock<T>(slot: &Mutex<T>) -> MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PartialEq for RequestHandle {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for RequestHandle {}

impl fmt::Debug for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandle")
            .field("id", &self.inner.id)
            .field("method", self.method())
            .field("url", &self.url())
            .field("hooks", &self.inner.slots)
            .finish_non_exhaustive()
    }
}

/// Build a handle for `spec` and start it on `transport`.
///
/// The handle is returned as soon as the transport accepted the request,
/// whatever the eventual outcome.
pub(crate) fn start<D: Send + Sync + 'static>(
    transport: &dyn Transport,
    spec: RequestSpec,
    hooks: Hooks<D>,
    extra: Option<D>,
) -> RequestHandle {
    let handle = RequestHandle::new(spec, hooks, extra);
    debug!(
        id = %handle.id(),
        method = %handle.method(),
        url = handle.url(),
        has_body = handle.body().is_some(),
        "starting request"
    );
    transport.start(handle.clone());
    handle
}
