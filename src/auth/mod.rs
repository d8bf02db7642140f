//! Caller identity shared between the gateway and the reconciliation service.
//!
//! The session is set explicitly on login and cleared on logout. Every clone of
//! [`AuthContext`] observes the same session.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::domain::CurrentUser;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: CurrentUser,
    pub token: Option<String>,
}

#[derive(Clone)]
pub struct AuthContext {
    session: Arc<watch::Sender<Option<Session>>>,
}

impl AuthContext {
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            session: Arc::new(session),
        }
    }

    pub fn login(&self, user: CurrentUser, token: Option<String>) {
        info!(user_id = user.id, is_admin = user.is_admin, "Session started");
        self.session.send_replace(Some(Session { user, token }));
    }

    pub fn logout(&self) {
        if self.session.send_replace(None).is_some() {
            info!("Session cleared");
        }
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.session.borrow().as_ref().map(|s| s.user.clone())
    }

    pub fn bearer_token(&self) -> Option<String> {
        self.session.borrow().as_ref().and_then(|s| s.token.clone())
    }

    /// Receiver that wakes whenever the session changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}
