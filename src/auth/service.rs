use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::auth::{password, token};
use crate::db::{Role, SessionRecord, Storage, UserRecord};
use crate::error::HubError;

/// Reserved account created at startup; it can never be deleted.
pub const ADMIN_USERNAME: &str = "admin";

// Verified against when the username is unknown, so both login failure paths
// run the same hash work and return the same error.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| password::hash_password("not-a-real-password").unwrap_or_default());

/// What a caller is allowed to learn about a user.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub username: String,
    pub role: Role,
    pub name: String,
}

/// Read-only projection of a live session, attached to requests by the
/// authorization middleware. Role and name are snapshots taken at login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub username: String,
    pub role: Role,
    pub name: String,
    pub login_time: DateTime<Utc>,
}

impl From<SessionRecord> for SessionView {
    fn from(s: SessionRecord) -> Self {
        Self {
            username: s.username,
            role: s.role,
            name: s.display_name,
            login_time: s.login_time,
        }
    }
}

/// Verifies credentials and manages the session lifecycle.
#[derive(Clone)]
pub struct Authenticator {
    storage: Storage,
}

impl Authenticator {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Verify a username/password pair and mint a session on success.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to the
    /// caller: same error kind, same message, same status.
    pub async fn login(
        &self,
        username: &str,
        password_plain: &str,
    ) -> Result<(String, PublicUser), HubError> {
        let Some(user) = self.storage.find_user_by_username(username).await? else {
            password::verify_password(&DUMMY_HASH, password_plain);
            return Err(HubError::InvalidCredentials);
        };
        if !password::verify_password(&user.password_hash, password_plain) {
            return Err(HubError::InvalidCredentials);
        }

        let session = SessionRecord {
            session_id: token::generate_session_token(),
            username: user.username.clone(),
            role: user.role,
            display_name: user.display_name.clone(),
            login_time: Utc::now(),
        };
        self.storage.insert_session(&session).await?;

        info!(username = %user.username, role = %user.role.as_str(), "login");
        Ok((
            session.session_id,
            PublicUser {
                username: user.username,
                role: user.role,
                name: user.display_name,
            },
        ))
    }

    /// Delete the session if present. Logging out an unknown token is a
    /// success, not an error.
    pub async fn logout(&self, session_id: &str) -> Result<(), HubError> {
        self.storage.delete_session_by_id(session_id).await
    }

    /// Ensure the reserved `admin` account exists, creating it with
    /// `initial_password` on first startup.
    pub async fn bootstrap_admin(&self, initial_password: &str) -> Result<(), HubError> {
        if self
            .storage
            .find_user_by_username(ADMIN_USERNAME)
            .await?
            .is_some()
        {
            return Ok(());
        }
        let admin = UserRecord {
            username: ADMIN_USERNAME.to_string(),
            password_hash: password::hash_password(initial_password)?,
            role: Role::Admin,
            display_name: "Administrator".to_string(),
            created_at: Utc::now(),
        };
        self.storage.insert_user(&admin).await?;
        if initial_password == "admin" {
            warn!("created admin account with the default password; set HANDOVER_ADMIN_PASSWORD");
        } else {
            info!("created admin account");
        }
        Ok(())
    }
}

/// Resolves bearer tokens to session records for the middleware.
#[derive(Clone)]
pub struct SessionValidator {
    storage: Storage,
}

impl SessionValidator {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Resolve a token to its session. Never mutates the session row, so
    /// `login_time` stays fixed (no sliding expiration).
    pub async fn validate(&self, session_id: Option<&str>) -> Result<SessionView, HubError> {
        let id = session_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(HubError::NoSession)?;
        let session = self
            .storage
            .find_session_by_id(id)
            .await?
            .ok_or(HubError::InvalidSession)?;
        Ok(session.into())
    }
}
