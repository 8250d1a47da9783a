pub mod auth;
pub mod handovers;
pub mod users;

use serde::Serialize;

/// Body for operations whose only outcome is "it happened".
#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}
