use std::fmt;
use std::sync::Arc;

use nutri_track_data::models::StorageKey;
use nutri_track_data::repository::{DomainStore, KeyValueStore};
use parking_lot::RwLock;
use thiserror::Error;
use tracing::warn;

use super::logging::{log_auth_event, AuthEvent, AuthEventType};
use super::{LoginRequest, RegisterRequest};
use crate::entities::conversions::convert_to_domain_user;
use crate::entities::{AuthSession, AuthUser};
use crate::remote::{AuthRemote, AuthResponse, RemoteError};
use crate::validation::validate_request;

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// The server refused the request and said why
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Remote(RemoteError),
}

impl From<RemoteError> for AuthError {
    fn from(error: RemoteError) -> Self {
        match error {
            RemoteError::Unauthorized(message) | RemoteError::Server { message, .. } => {
                AuthError::Rejected(message)
            }
            other => AuthError::Remote(other),
        }
    }
}

/// Result of validating the stored credential
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCheck {
    /// No credential stored
    Anonymous,
    Valid(AuthUser),
    /// The server rejected the credential; the session was cleared
    Expired,
    /// The server could not be asked; the session was kept
    Unverified(RemoteError),
}

/// Holds the bearer credential and identity of the signed-in user
pub struct AuthSessionManager {
    remote: Arc<dyn AuthRemote>,
    storage: DomainStore<AuthSession>,
    state: RwLock<AuthSession>,
}

impl fmt::Debug for AuthSessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSessionManager")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl AuthSessionManager {
    /// Restore the persisted session
    pub fn load(remote: Arc<dyn AuthRemote>, backend: Arc<dyn KeyValueStore>) -> Self {
        let storage = DomainStore::new(backend, StorageKey::AuthSession);
        let state = RwLock::new(storage.load());
        Self {
            remote,
            storage,
            state,
        }
    }

    pub fn snapshot(&self) -> AuthSession {
        self.state.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated()
    }

    pub fn token(&self) -> Option<String> {
        self.state.read().token.clone()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.state.read().user.clone()
    }

    pub fn is_returning_user(&self) -> bool {
        self.state.read().is_returning_user
    }

    /// Create an account and sign in with it
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthUser, AuthError> {
        validate_request(&request).map_err(AuthError::Validation)?;

        match self.remote.register(&request).await {
            Ok(response) => {
                let user = self.establish(response, false);
                log_auth_event(AuthEvent::new(AuthEventType::Registration, Some(&user.email), true));
                Ok(user)
            }
            Err(e) => {
                log_auth_event(
                    AuthEvent::new(AuthEventType::Registration, Some(&request.email), false)
                        .with_details(e.to_string()),
                );
                Err(e.into())
            }
        }
    }

    /// Sign in and remember that this device has seen an account before
    pub async fn login(&self, request: LoginRequest) -> Result<AuthUser, AuthError> {
        validate_request(&request).map_err(AuthError::Validation)?;

        match self.remote.login(&request).await {
            Ok(response) => {
                let user = self.establish(response, true);
                log_auth_event(AuthEvent::new(AuthEventType::Login, Some(&user.email), true));
                Ok(user)
            }
            Err(e) => {
                log_auth_event(
                    AuthEvent::new(AuthEventType::FailedLogin, Some(&request.email), false)
                        .with_details(e.to_string()),
                );
                Err(e.into())
            }
        }
    }

    /// Forget the credential. Local data domains are left alone.
    pub fn logout(&self) {
        let user = {
            let mut state = self.state.write();
            let user = state.user.take();
            state.token = None;
            self.storage.save(&state);
            user
        };
        log_auth_event(AuthEvent::new(
            AuthEventType::Logout,
            user.as_ref().map(|u| u.email.as_str()),
            true,
        ));
    }

    /// Ask the server whether the stored credential is still good
    pub async fn check_session(&self) -> SessionCheck {
        let Some(token) = self.token() else {
            return SessionCheck::Anonymous;
        };

        match self.remote.current_user(&token).await {
            Ok(remote_user) => {
                let user = convert_to_domain_user(remote_user);
                let mut state = self.state.write();
                if state.token.as_deref() == Some(token.as_str()) {
                    state.user = Some(user.clone());
                    self.storage.save(&state);
                }
                log_auth_event(AuthEvent::new(AuthEventType::SessionValidated, Some(&user.email), true));
                SessionCheck::Valid(user)
            }
            Err(e) if e.is_unauthorized() => {
                {
                    let mut state = self.state.write();
                    // A newer login may have replaced the token while we waited
                    if state.token.as_deref() == Some(token.as_str()) {
                        state.token = None;
                        state.user = None;
                        self.storage.save(&state);
                    }
                }
                log_auth_event(
                    AuthEvent::new(AuthEventType::SessionExpired, None, false).with_details(e.to_string()),
                );
                SessionCheck::Expired
            }
            Err(e) => {
                warn!("Could not validate session, keeping it: {}", e);
                SessionCheck::Unverified(e)
            }
        }
    }

    fn establish(&self, response: AuthResponse, mark_returning: bool) -> AuthUser {
        let user = convert_to_domain_user(response.user);
        let mut state = self.state.write();
        state.token = Some(response.access_token);
        state.user = Some(user.clone());
        if mark_returning {
            state.is_returning_user = true;
        }
        self.storage.save(&state);
        user
    }
}
