use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::RwLock;

use crate::errors::CommerceError;

/// Opaque user identity issued by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identity collaborator: a synchronous snapshot of the signed-in user.
///
/// The provider itself (sign-in, token refresh) lives outside this crate;
/// services only ever ask "who is the user right now".
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<UserId>;
}

/// Returns the current user or `NotAuthenticated`.
pub fn require_user(identity: &dyn IdentityProvider) -> Result<UserId, CommerceError> {
    identity.current_user().ok_or(CommerceError::NotAuthenticated)
}

/// Session-scoped identity holder.
///
/// Mirrors the auth snapshot a client session keeps: set on sign-in,
/// cleared on sign-out.
#[derive(Debug, Default)]
pub struct SessionIdentity {
    user: RwLock<Option<UserId>>,
}

impl SessionIdentity {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(user: impl Into<UserId>) -> Self {
        Self {
            user: RwLock::new(Some(user.into())),
        }
    }

    pub fn sign_in(&self, user: impl Into<UserId>) {
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = Some(user.into());
    }

    pub fn sign_out(&self) {
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_user(&self) -> Option<UserId> {
        self.user.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
