//! Sign-up, sign-in and sign-out, each followed by the matching sync flow.

use std::sync::Arc;

use thiserror::Error;

use super::sync::{LoginSync, RegistrationSync, SyncEngine, SyncError};
use crate::auth::{AuthError, AuthSessionManager, LoginRequest, RegisterRequest, SessionCheck};
use crate::entities::AuthUser;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Signed in, but the follow-up sync failed
    #[error(transparent)]
    Sync(#[from] SyncError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Registered {
    pub user: AuthUser,
    pub sync: RegistrationSync,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggedIn {
    pub user: AuthUser,
    pub sync: LoginSync,
}

#[derive(Debug)]
pub struct AccountService {
    session: Arc<AuthSessionManager>,
    sync: Arc<SyncEngine>,
}

impl AccountService {
    pub fn new(session: Arc<AuthSessionManager>, sync: Arc<SyncEngine>) -> Self {
        Self { session, sync }
    }

    pub fn session(&self) -> &AuthSessionManager {
        &self.session
    }

    /// Create the account, then upload this device's data as its seed
    pub async fn register(&self, request: RegisterRequest) -> Result<Registered, AccountError> {
        let user = self.session.register(request).await?;
        let sync = self.sync.registration_flow().await?;
        Ok(Registered { user, sync })
    }

    /// Sign in, then replace local profile and meals with the server's
    pub async fn login(&self, request: LoginRequest) -> Result<LoggedIn, AccountError> {
        let user = self.session.login(request).await?;
        let sync = self.sync.login_flow().await?;
        Ok(LoggedIn { user, sync })
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    pub async fn check_session(&self) -> SessionCheck {
        self.session.check_session().await
    }
}
