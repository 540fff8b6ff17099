use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::storage::KeyValueStore;

pub const TOKEN_KEY: &str = "token";
pub const EMAIL_KEY: &str = "email";
pub const ROLE_KEY: &str = "role";

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub role: String,
    pub token: String,
}

/// Holds who is logged in and mirrors it to durable storage.
///
/// Storage failures are logged and otherwise ignored: the in-memory state
/// always reflects the last `login`/`logout`.
pub struct SessionStore {
    storage: Box<dyn KeyValueStore>,
    identity: Option<Identity>,
}

impl SessionStore {
    /// An anonymous session backed by `storage`. Call `initialize` to load.
    pub fn new(storage: Box<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            identity: None,
        }
    }

    /// Load the identity from storage.
    ///
    /// All three entries must be present and non-empty; anything less is
    /// anonymous. Returns whether an identity was restored.
    pub fn initialize(&mut self) -> bool {
        let token = self.read(TOKEN_KEY);
        let email = self.read(EMAIL_KEY);
        let role = self.read(ROLE_KEY);

        self.identity = match (token, email, role) {
            (Some(token), Some(email), Some(role)) => Some(Identity { email, role, token }),
            _ => None,
        };
        debug!(authenticated = self.identity.is_some(), "Session initialized");
        self.identity.is_some()
    }

    pub fn login(&mut self, identity: Identity) {
        self.write(TOKEN_KEY, &identity.token);
        self.write(EMAIL_KEY, &identity.email);
        self.write(ROLE_KEY, &identity.role);
        info!(email = %identity.email, role = %identity.role, "Logged in");
        self.identity = Some(identity);
    }

    pub fn logout(&mut self) {
        if let Some(ref identity) = self.identity {
            info!(email = %identity.email, "Logged out");
        }
        self.identity = None;
        for key in [TOKEN_KEY, EMAIL_KEY, ROLE_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "Failed to clear session entry");
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Get the bearer token if logged in
    pub fn token(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.token.as_str())
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    pub fn into_storage(self) -> Box<dyn KeyValueStore> {
        self.storage
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, error = %e, "Failed to read session entry");
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            warn!(key, error = %e, "Failed to persist session entry");
        }
    }
}
