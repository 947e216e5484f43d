//! Request credentials
//!
//! The identity provider hands out a bearer token and user id. One owner
//! refreshes them through a [`CredentialStore`]; every client holds the same
//! `Arc` and reads a snapshot per request, so credentials never have to be
//! threaded through individual calls.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

/// Bearer token and user id attached to outgoing requests
#[derive(Clone, Default)]
pub struct Credentials {
    token: Option<SecretString>,
    user_id: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("user_id", &self.user_id)
            .finish()
    }
}

impl Credentials {
    #[must_use]
    pub fn new(token: Option<SecretString>, user_id: Option<String>) -> Self {
        Self { token, user_id }
    }

    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(SecretString::from(token.into())),
            user_id: None,
        }
    }

    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Token text, if any. Blank tokens count as absent.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|t| !t.is_empty())
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|u| !u.is_empty())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

/// Single owner of the current credentials
#[derive(Debug, Default)]
pub struct CredentialStore {
    inner: RwLock<Credentials>,
}

/// Credential store shared between clients
pub type SharedCredentials = Arc<CredentialStore>;

impl CredentialStore {
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            inner: RwLock::new(credentials),
        }
    }

    /// Empty store wrapped for sharing
    #[must_use]
    pub fn shared() -> SharedCredentials {
        Arc::new(Self::default())
    }

    /// Copy of the current credentials
    #[must_use]
    pub fn snapshot(&self) -> Credentials {
        self.inner.read().clone()
    }

    pub fn set(&self, credentials: Credentials) {
        *self.inner.write() = credentials;
    }

    pub fn set_token(&self, token: impl Into<String>) {
        self.inner.write().token = Some(SecretString::from(token.into()));
    }

    pub fn set_user_id(&self, user_id: impl Into<String>) {
        self.inner.write().user_id = Some(user_id.into());
    }

    /// Forget token and user id, e.g. after the backend answers 401
    pub fn clear(&self) {
        *self.inner.write() = Credentials::default();
        debug!("Credentials cleared");
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().is_authenticated()
    }
}
