use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use nutri_track_domain::auth::SessionCheck;
use nutri_track_domain::entities::{AuthSession, AuthUser};
use nutri_track_domain::services::{LoggedIn, LoginSync, Registered, RegistrationSync};

/// Result of creating an account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user: AuthUser,
    /// Whether a local profile was uploaded as the account's first copy
    pub profile_uploaded: bool,
    /// Local meals uploaded as the account's first copy
    pub meals_uploaded: usize,
}

impl From<Registered> for RegisterResponse {
    fn from(registered: Registered) -> Self {
        let (profile_uploaded, meals_uploaded) = match registered.sync {
            RegistrationSync::Uploaded { profile, meals } => (profile, meals),
            RegistrationSync::NothingLocal => (false, 0),
        };
        Self {
            user: registered.user,
            profile_uploaded,
            meals_uploaded,
        }
    }
}

/// Result of signing in
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: AuthUser,
    /// False for an account with nothing stored on the server yet
    pub restored: bool,
    pub meals_restored: usize,
}

impl From<LoggedIn> for LoginResponse {
    fn from(logged_in: LoggedIn) -> Self {
        let (restored, meals_restored) = match logged_in.sync {
            LoginSync::Restored { meals } => (true, meals),
            LoginSync::NoRemoteData => (false, 0),
        };
        Self {
            user: logged_in.user,
            restored,
            meals_restored,
        }
    }
}

/// Current session, without the credential itself
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,
    pub is_returning_user: bool,
}

impl From<AuthSession> for SessionResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            authenticated: session.is_authenticated(),
            user: session.user,
            is_returning_user: session.is_returning_user,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Anonymous,
    Valid,
    Expired,
    Unverified,
}

/// Outcome of validating the stored credential with the server
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionCheckResponse {
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,
    /// Why the session could not be verified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<SessionCheck> for SessionCheckResponse {
    fn from(check: SessionCheck) -> Self {
        let (state, user, message) = match check {
            SessionCheck::Anonymous => (SessionState::Anonymous, None, None),
            SessionCheck::Valid(user) => (SessionState::Valid, Some(user), None),
            SessionCheck::Expired => (SessionState::Expired, None, None),
            SessionCheck::Unverified(error) => (SessionState::Unverified, None, Some(error.to_string())),
        };
        Self { state, user, message }
    }
}
