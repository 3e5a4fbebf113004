// Caller-facing callback context
//
// Resource calls take one flat set of callbacks (success / failure /
// progress) instead of five lifecycle hooks. The callbacks and any extra
// caller data travel together in a `RequestContext`, and every callback
// that fires receives that same context.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::Error;
use crate::request::{FailureKind, Hooks, RequestHandle};

/// Context keys taken by the callbacks themselves.
pub const RESERVED_CONTEXT_KEYS: [&str; 3] =
    ["success_callback", "failure_callback", "progress_callback"];

/// `(kind, raw_result, ctx)` for failure, error and redirect outcomes.
pub type FailureCallback<S> = Box<dyn Fn(FailureKind, Value, &RequestContext<S>) + Send + Sync>;

/// `(current_size, total_size, ctx)`; the total is unknown without a
/// `Content-Length`.
pub type ProgressCallback<S> = Box<dyn Fn(u64, Option<u64>, &RequestContext<S>) + Send + Sync>;

/// Success callback receiving the raw payload and the context.
pub struct RawSuccess(Box<dyn Fn(Value, &RequestContext<RawSuccess>) + Send + Sync>);

/// Success callback receiving a typed result, with no context.
pub struct Deliver<T>(Box<dyn Fn(T) + Send + Sync>);

/// Context for [`PodiumClient::make_request_default`](crate::PodiumClient::make_request_default).
pub type DefaultContext = RequestContext<RawSuccess>;

/// Callbacks plus free-form caller data for one request.
///
/// `S` is the shape of the success callback: [`RawSuccess`] for plain
/// requests, [`Deliver<T>`] for resource calls that hand over a domain
/// object.
pub struct RequestContext<S> {
    success_callback: Option<S>,
    failure_callback: Option<FailureCallback<S>>,
    progress_callback: Option<ProgressCallback<S>>,
    data: Map<String, Value>,
}

impl<S: 'static> RequestContext<S> {
    pub fn new() -> Self {
        Self {
            success_callback: None,
            failure_callback: None,
            progress_callback: None,
            data: Map::new(),
        }
    }

    pub fn on_failure<F>(mut self, callback: F) -> Self
    where
        F: Fn(FailureKind, Value, &RequestContext<S>) + Send + Sync + 'static,
    {
        self.failure_callback = Some(Box::new(callback));
        self
    }

    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(u64, Option<u64>, &RequestContext<S>) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    /// Merge caller data into the context.
    ///
    /// Keys named after a callback slot are rejected: the callbacks are
    /// never shadowed by data.
    pub fn with_data(mut self, data: Map<String, Value>) -> Result<Self, Error> {
        if let Some(key) = data
            .keys()
            .find(|key| RESERVED_CONTEXT_KEYS.contains(&key.as_str()))
        {
            return Err(Error::ReservedContextKey(key.clone()));
        }
        self.data.extend(data);
        Ok(self)
    }
}

impl<S> RequestContext<S> {
    pub fn success_callback(&self) -> Option<&S> {
        self.success_callback.as_ref()
    }

    pub fn has_success_callback(&self) -> bool {
        self.success_callback.is_some()
    }

    pub fn has_failure_callback(&self) -> bool {
        self.failure_callback.is_some()
    }

    pub fn has_progress_callback(&self) -> bool {
        self.progress_callback.is_some()
    }

    /// Caller data merged in with [`with_data`](Self::with_data).
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub(crate) fn notify_failure(&self, kind: FailureKind, raw: Value) {
        if let Some(callback) = &self.failure_callback {
            callback(kind, raw, self);
        }
    }

    pub(crate) fn notify_progress(&self, current: u64, total: Option<u64>) {
        if let Some(callback) = &self.progress_callback {
            callback(current, total, self);
        }
    }
}

impl RequestContext<RawSuccess> {
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(Value, &RequestContext<RawSuccess>) + Send + Sync + 'static,
    {
        self.success_callback = Some(RawSuccess(Box::new(callback)));
        self
    }

    /// Hand `raw` and this context to the success callback, if one is set.
    pub fn notify_success(&self, raw: Value) {
        if let Some(RawSuccess(callback)) = &self.success_callback {
            callback(raw, self);
        }
    }
}

impl<T: 'static> RequestContext<Deliver<T>> {
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.success_callback = Some(Deliver(Box::new(callback)));
        self
    }

    /// Hand `value` to the success callback, if one is set.
    pub fn deliver(&self, value: T) {
        if let Some(Deliver(callback)) = &self.success_callback {
            callback(value);
        }
    }
}

impl<S: 'static> Default for RequestContext<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for RequestContext<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("success_callback", &self.success_callback.is_some())
            .field("failure_callback", &self.failure_callback.is_some())
            .field("progress_callback", &self.progress_callback.is_some())
            .field("data", &self.data)
            .finish()
    }
}

// ── Result transformers ──────────────────────────────────────────────

/// What happens between "request succeeded" and "caller's success
/// callback fires" for a custom-success request.
///
/// Implemented for any matching closure or `fn`.
pub trait ResultTransformer<S>: Send + 'static {
    fn transform(
        &self,
        handle: &RequestHandle,
        raw: Value,
        ctx: &RequestContext<S>,
    ) -> Result<(), Error>;
}

impl<S, F> ResultTransformer<S> for F
where
    F: Fn(&RequestHandle, Value, &RequestContext<S>) -> Result<(), Error> + Send + 'static,
{
    fn transform(
        &self,
        handle: &RequestHandle,
        raw: Value,
        ctx: &RequestContext<S>,
    ) -> Result<(), Error> {
        self(handle, raw, ctx)
    }
}

// ── Hook wiring ──────────────────────────────────────────────────────

/// Failure, error, redirect and progress hooks shared by the default and
/// custom-success builders. Every slot is registered; unset callbacks make
/// the corresponding event a no-op.
pub(crate) fn context_hooks<S: Send + 'static>() -> Hooks<RequestContext<S>> {
    Hooks::new()
        .on_failure(|_: &RequestHandle, raw: Value, ctx: Option<&RequestContext<S>>| {
            if let Some(ctx) = ctx {
                ctx.notify_failure(FailureKind::Failure, raw);
            }
        })
        .on_error(|_: &RequestHandle, raw: Value, ctx: Option<&RequestContext<S>>| {
            if let Some(ctx) = ctx {
                ctx.notify_failure(FailureKind::Error, raw);
            }
        })
        .on_redirect(|_: &RequestHandle, raw: Value, ctx: Option<&RequestContext<S>>| {
            if let Some(ctx) = ctx {
                ctx.notify_failure(FailureKind::Redirect, raw);
            }
        })
        .on_progress(
            |_: &RequestHandle, current: u64, total: Option<u64>, ctx: Option<&RequestContext<S>>| {
                if let Some(ctx) = ctx {
                    ctx.notify_progress(current, total);
                }
            },
        )
}
