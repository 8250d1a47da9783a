use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{ADMIN_USERNAME, password};
use crate::db::{Role, UserRecord};
use crate::error::HubError;
use crate::handlers::Ack;
use crate::middleware::RequireAdmin;
use crate::router::HubState;

/// User as exposed over the API: everything except the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub username: String,
    pub role: Role,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserInfo {
    fn from(u: UserRecord) -> Self {
        Self {
            username: u.username,
            role: u.role,
            name: u.display_name,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
}

/// GET /api/users (admin)
pub async fn list_users(
    RequireAdmin(_): RequireAdmin,
    State(state): State<HubState>,
) -> Result<Json<Vec<UserInfo>>, HubError> {
    let users = state.storage.list_users().await?;
    Ok(Json(users.into_iter().map(UserInfo::from).collect()))
}

/// POST /api/users (admin)
pub async fn create_user(
    RequireAdmin(caller): RequireAdmin,
    State(state): State<HubState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserInfo>), HubError> {
    let username = required_field(req.username)?;
    let password_plain = required_field(req.password)?;
    let name = required_field(req.name)?;

    let user = UserRecord {
        username,
        password_hash: password::hash_password(&password_plain)?,
        role: req.role.unwrap_or(Role::User),
        display_name: name,
        created_at: Utc::now(),
    };
    state.storage.insert_user(&user).await?;

    info!(username = %user.username, role = %user.role.as_str(), created_by = %caller.username, "user created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// DELETE /api/users/{username} (admin)
///
/// Removes the user and all of their sessions in one transaction. The
/// reserved `admin` account is refused outright.
pub async fn delete_user(
    RequireAdmin(caller): RequireAdmin,
    State(state): State<HubState>,
    Path(username): Path<String>,
) -> Result<Json<Ack>, HubError> {
    if username == ADMIN_USERNAME {
        return Err(HubError::ProtectedUser);
    }
    let removed = state.storage.delete_user_with_sessions(&username).await?;
    if removed == 0 {
        return Err(HubError::NotFound);
    }
    info!(username = %username, deleted_by = %caller.username, "user deleted");
    Ok(Json(Ack::ok()))
}

fn required_field(value: Option<String>) -> Result<String, HubError> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(HubError::MissingFields)
}
