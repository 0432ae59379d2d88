//! Authentication signal consumed by the task session.
//!
//! The session only needs to know who the current user is. Token exchange
//! and credential storage live outside this crate; anything that can answer
//! [`AuthProvider::current_user_id`] can drive a session.

use parking_lot::RwLock;

/// Source of the current user identity.
pub trait AuthProvider: Send + Sync {
    /// Identifier of the signed-in user, or `None` when signed out.
    fn current_user_id(&self) -> Option<String>;

    /// Whether a user is signed in.
    fn is_authenticated(&self) -> bool {
        self.current_user_id().is_some()
    }
}

/// Locally held identity that can be switched at runtime.
#[derive(Debug, Default)]
pub struct LocalAuth {
    user_id: RwLock<Option<String>>,
}

impl LocalAuth {
    /// Creates a provider with no signed-in user.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Creates a provider already signed in as `user_id`.
    ///
    /// Blank ids are treated as signed out.
    #[must_use]
    pub fn signed_in(user_id: &str) -> Self {
        let auth = Self::default();
        auth.sign_in(user_id);
        auth
    }

    /// Signs in as `user_id`, replacing any previous user.
    ///
    /// Blank ids sign the current user out.
    pub fn sign_in(&self, user_id: &str) {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            self.sign_out();
            return;
        }
        tracing::info!(user_id, "signed in");
        *self.user_id.write() = Some(user_id.to_string());
    }

    /// Signs the current user out.
    pub fn sign_out(&self) {
        if self.user_id.write().take().is_some() {
            tracing::info!("signed out");
        }
    }
}

impl AuthProvider for LocalAuth {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.read().clone()
    }
}

impl<T: AuthProvider + ?Sized> AuthProvider for std::sync::Arc<T> {
    fn current_user_id(&self) -> Option<String> {
        (**self).current_user_id()
    }

    fn is_authenticated(&self) -> bool {
        (**self).is_authenticated()
    }
}
