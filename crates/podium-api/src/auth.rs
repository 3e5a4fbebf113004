// Application credential registry
//
// Podium applications authenticate with an id/secret pair that is
// registered once per process. Reads happen on every header build, writes
// only on register/unregister, so the slot is an `ArcSwapOption`.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

/// A registered Podium application: client id plus client secret.
#[derive(Debug, Clone)]
pub struct ApplicationCredential {
    id: String,
    secret: SecretString,
}

impl ApplicationCredential {
    pub fn new(id: impl Into<String>, secret: SecretString) -> Self {
        Self {
            id: id.into(),
            secret,
        }
    }

    /// The application (client) id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The application secret.
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    /// `Basic {id}:{secret}`, the value Podium expects for application auth.
    pub(crate) fn authorization(&self) -> String {
        format!("Basic {}:{}", self.id, self.secret.expose_secret())
    }
}

/// Holder for at most one [`ApplicationCredential`].
///
/// The process-wide instance backs [`register_application`] and
/// [`json_header`](crate::json_header). Standalone registries are useful
/// when several applications live in one process, and in tests.
#[derive(Debug)]
pub struct ApplicationRegistry {
    slot: ArcSwapOption<ApplicationCredential>,
}

impl ApplicationRegistry {
    pub const fn new() -> Self {
        Self {
            slot: ArcSwapOption::const_empty(),
        }
    }

    /// Install `credential`, replacing any previous registration.
    pub fn register(&self, credential: ApplicationCredential) {
        debug!(app_id = credential.id(), "registering podium application");
        self.slot.store(Some(Arc::new(credential)));
    }

    /// Drop the current registration, if any.
    pub fn unregister(&self) {
        if self.slot.swap(None).is_some() {
            debug!("unregistered podium application");
        }
    }

    /// Snapshot of the current registration.
    pub fn current(&self) -> Option<Arc<ApplicationCredential>> {
        self.slot.load_full()
    }

    pub fn is_registered(&self) -> bool {
        self.slot.load().is_some()
    }
}

impl Default for ApplicationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static APPLICATION: ApplicationRegistry = ApplicationRegistry::new();

/// The process-wide registry.
pub fn application_registry() -> &'static ApplicationRegistry {
    &APPLICATION
}

/// Register the application credential used by [`json_header`](crate::json_header).
pub fn register_application(id: impl Into<String>, secret: impl Into<String>) {
    APPLICATION.register(ApplicationCredential::new(
        id,
        SecretString::from(secret.into()),
    ));
}

/// Clear the process-wide application credential.
pub fn unregister_application() {
    APPLICATION.unregister();
}
