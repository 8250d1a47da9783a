use std::path::Path;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::auth::{Authenticator, SessionValidator};
use crate::db::Storage;
use crate::handlers::{auth, handovers, users};

/// Shared application state. The store handle is injected here and cloned
/// into each component; nothing reaches for process-global state.
#[derive(Clone)]
pub struct HubState {
    pub storage: Storage,
    pub authenticator: Authenticator,
    pub validator: SessionValidator,
}

impl HubState {
    pub fn new(storage: Storage) -> Self {
        Self {
            authenticator: Authenticator::new(storage.clone()),
            validator: SessionValidator::new(storage.clone()),
            storage,
        }
    }
}

pub fn hub_router(state: HubState) -> Router {
    hub_router_with_static(state, None)
}

/// Build the full application router; when `static_dir` is set, unmatched
/// paths fall back to serving frontend assets from it.
pub fn hub_router_with_static(state: HubState, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::current_session))
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/{username}", delete(users::delete_user))
        .route("/handovers", get(handovers::list_handovers))
        .route(
            "/handovers/{id}",
            get(handovers::get_handover).put(handovers::put_handover),
        )
        .with_state(state);

    let app = Router::new().nest("/api", api);
    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };
    app.layer(TraceLayer::new_for_http())
}
