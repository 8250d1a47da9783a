use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};

use crate::auth::{PublicUser, SessionView};
use crate::error::HubError;
use crate::handlers::Ack;
use crate::middleware::{RequireSession, extract_token};
use crate::router::HubState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

/// POST /api/login
pub async fn login(
    State(state): State<HubState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HubError> {
    let (token, user) = state
        .authenticator
        .login(req.username.trim(), &req.password)
        .await?;
    Ok(Json(LoginResponse { token, user }))
}

/// POST /api/logout — idempotent; succeeds whether or not the token named a
/// live session, or was carried at all.
pub async fn logout(
    State(state): State<HubState>,
    headers: HeaderMap,
) -> Result<Json<Ack>, HubError> {
    if let Some(token) = extract_token(&headers)
        && !token.is_empty()
    {
        state.authenticator.logout(token).await?;
    }
    Ok(Json(Ack::ok()))
}

/// GET /api/session — the caller's own session projection.
pub async fn current_session(RequireSession(view): RequireSession) -> Json<SessionView> {
    Json(view)
}
