//! Authentication core: credential verification and session lifecycle.

pub mod password;
pub mod service;
pub mod token;

pub use service::{ADMIN_USERNAME, Authenticator, PublicUser, SessionValidator, SessionView};
