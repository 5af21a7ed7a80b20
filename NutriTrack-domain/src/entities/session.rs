use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Account identity returned by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Persisted session. No token means local-only mode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthSession {
    pub token: Option<String>,
    pub user: Option<AuthUser>,
    pub is_returning_user: bool,
}

impl AuthSession {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Outcome of the last sync attempt, persisted with the user blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Never synced, or nothing on the server yet
    #[default]
    #[serde(rename = "none")]
    NotSynced,
    Syncing,
    Synced,
    Error,
}
