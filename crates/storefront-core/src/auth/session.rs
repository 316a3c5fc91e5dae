use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiError;
use crate::models::UserProfile;

use super::StorageError;

/// Key under which the session is persisted
pub const STORE_NAME: &str = "auth-storage";

/// Version written into the persisted envelope
const PERSIST_VERSION: u32 = 0;

/// Shown when a failed login carries no message of its own
pub const AUTH_FALLBACK_MESSAGE: &str = "Erro de autenticação.";

/// Authentication state of the process.
///
/// `user` and `token` are always both set or both empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub user: Option<UserProfile>,
    pub token: Option<String>,
    #[serde(default)]
    pub is_loading: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Serialize as `{"state": {...}, "version": 0}`.
    pub fn to_persisted(&self) -> Result<String, StorageError> {
        let envelope = PersistedEnvelope {
            state: self.clone(),
            version: PERSIST_VERSION,
        };
        serde_json::to_string(&envelope).map_err(StorageError::Serialize)
    }

    /// Parse a persisted value back into a state.
    ///
    /// A process that restarts has no request in flight, so `is_loading` is
    /// reset. A record holding only half of the user/token pair is dropped.
    pub fn from_persisted(raw: &str) -> Result<Self, StorageError> {
        let envelope: PersistedEnvelope =
            serde_json::from_str(raw).map_err(|source| StorageError::Corrupt {
                key: STORE_NAME.to_string(),
                source,
            })?;

        let mut state = envelope.state;
        state.is_loading = false;
        if state.user.is_some() != state.token.is_some() {
            state.user = None;
            state.token = None;
        }
        Ok(state)
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedEnvelope {
    state: SessionState,
    #[serde(default)]
    version: u32,
}

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub profile: UserProfile,
    pub token: String,
}

impl AuthenticatedUser {
    /// Extract the profile and token from a login response body.
    ///
    /// The body must carry a truthy `id` and a non-empty token, sent either
    /// as `token` or as `accessToken`.
    pub fn from_response(mut body: Value) -> Result<Self, ApiError> {
        let object = body
            .as_object_mut()
            .ok_or_else(|| ApiError::InvalidResponse("login response is not an object".to_string()))?;

        let token = ["token", "accessToken"]
            .iter()
            .find_map(|key| object.remove(*key))
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("login response has no token".to_string()))?;

        let profile: UserProfile = serde_json::from_value(body)
            .map_err(|e| ApiError::InvalidResponse(format!("login profile: {}", e)))?;

        if profile.id == 0 {
            return Err(ApiError::InvalidResponse(
                "login response has no user id".to_string(),
            ));
        }

        Ok(Self { profile, token })
    }
}
