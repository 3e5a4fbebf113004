// podium-api: Async callback-based Rust client for the Podium telemetry API

pub mod account;
pub mod auth;
pub mod client;
pub mod context;
pub mod error;
pub mod header;
pub mod oauth;
pub mod request;
pub mod transport;
pub mod types;
pub mod users;

pub use account::AccountCallbacks;
pub use auth::{
    ApplicationCredential, ApplicationRegistry, application_registry, register_application,
    unregister_application,
};
pub use client::{DEFAULT_BASE_URL, PodiumClient};
pub use context::{
    DefaultContext, Deliver, FailureCallback, ProgressCallback, RESERVED_CONTEXT_KEYS, RawSuccess,
    RequestContext, ResultTransformer,
};
pub use error::Error;
pub use header::{Header, json_header, json_header_from, json_header_token};
pub use oauth::TokenCallbacks;
pub use request::{
    FailureKind, FormBody, HookSlots, Hooks, Outcome, RequestHandle, RequestSpec, encode_form,
};
pub use transport::{ReqwestTransport, TlsMode, Transport, TransportConfig};
pub use types::{PodiumAccount, PodiumToken, PodiumUser};
pub use users::UserCallbacks;
