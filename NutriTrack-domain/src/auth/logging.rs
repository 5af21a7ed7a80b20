use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Types of authentication events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventType {
    Registration,
    Login,
    FailedLogin,
    Logout,
    /// Stored credential accepted by the server
    SessionValidated,
    /// Stored credential rejected and discarded
    SessionExpired,
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEventType::Registration => write!(f, "REGISTRATION"),
            AuthEventType::Login => write!(f, "LOGIN"),
            AuthEventType::FailedLogin => write!(f, "FAILED_LOGIN"),
            AuthEventType::Logout => write!(f, "LOGOUT"),
            AuthEventType::SessionValidated => write!(f, "SESSION_VALIDATED"),
            AuthEventType::SessionExpired => write!(f, "SESSION_EXPIRED"),
        }
    }
}

/// Authentication event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub event_type: AuthEventType,
    /// Email or numeric id, whichever is known
    pub user: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub details: Option<String>,
}

impl AuthEvent {
    pub fn new(event_type: AuthEventType, user: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            user: user.map(String::from),
            timestamp: Utc::now(),
            success,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Log an authentication event. Credentials never pass through here.
pub fn log_auth_event(event: AuthEvent) {
    let user = event.user.as_deref().unwrap_or("anonymous");
    let details = event.details.as_deref().unwrap_or("");

    if event.success {
        info!(
            "AUTH-LOG [{}] [{}] [SUCCESS] [{}] {}",
            event.event_type,
            user,
            event.timestamp.to_rfc3339(),
            details
        );
    } else {
        warn!(
            "AUTH-LOG [{}] [{}] [FAILURE] [{}] {}",
            event.event_type,
            user,
            event.timestamp.to_rfc3339(),
            details
        );
    }
}
