use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde_json::Value;

use crate::db::HandoverSummary;
use crate::error::HubError;
use crate::handlers::Ack;
use crate::middleware::RequireSession;
use crate::router::HubState;

/// GET /api/handovers/{id}
pub async fn get_handover(
    RequireSession(_): RequireSession,
    State(state): State<HubState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, HubError> {
    let record = state
        .storage
        .find_handover_by_id(&id)
        .await?
        .ok_or(HubError::NotFound)?;
    let payload: Value = serde_json::from_str(&record.payload)?;
    Ok(Json(payload))
}

/// PUT /api/handovers/{id}
///
/// Whole-document upsert; the payload is opaque JSON and the last writer
/// wins unconditionally.
pub async fn put_handover(
    RequireSession(_): RequireSession,
    State(state): State<HubState>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Ack>, HubError> {
    let serialized = serde_json::to_string(&payload)?;
    state
        .storage
        .upsert_handover(&id, &serialized, Utc::now())
        .await?;
    Ok(Json(Ack::ok()))
}

/// GET /api/handovers — `{id, lastUpdated}` pairs, most recently updated
/// first.
pub async fn list_handovers(
    RequireSession(_): RequireSession,
    State(state): State<HubState>,
) -> Result<Json<Vec<HandoverSummary>>, HubError> {
    let summaries = state.storage.list_handover_summaries().await?;
    Ok(Json(summaries))
}
