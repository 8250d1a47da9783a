use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};

use crate::auth::SessionView;
use crate::error::HubError;
use crate::router::HubState;

/// Pull the session token out of its request carrier.
/// Accepts either:
/// - Header: `Authorization: Bearer <token>`
/// - Header: `x-auth-token: <token>`
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        let auth = auth.trim();
        if let Some(token) = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
        {
            return Some(token.trim());
        }
    }

    headers
        .get("x-auth-token")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
}

/// Requires any valid session; hands the resolved identity to the handler.
/// Rejections: `NoSession` when no token was carried, `InvalidSession` when
/// the token matches no live session (both 401).
#[derive(Debug, Clone)]
pub struct RequireSession(pub SessionView);

impl FromRequestParts<HubState> for RequireSession {
    type Rejection = HubError;

    async fn from_request_parts(parts: &mut Parts, state: &HubState) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers);
        let view = state.validator.validate(token).await?;
        Ok(Self(view))
    }
}

/// Requires a valid session whose snapshotted role is admin; otherwise
/// rejects with `Forbidden` (403), distinct from the 401 family.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub SessionView);

impl FromRequestParts<HubState> for RequireAdmin {
    type Rejection = HubError;

    async fn from_request_parts(parts: &mut Parts, state: &HubState) -> Result<Self, Self::Rejection> {
        let RequireSession(view) = RequireSession::from_request_parts(parts, state).await?;
        if !view.role.is_admin() {
            return Err(HubError::Forbidden);
        }
        Ok(Self(view))
    }
}
