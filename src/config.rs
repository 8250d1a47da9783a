use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

/// Runtime configuration, sourced from `HANDOVER_*` environment variables
/// layered over the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub listen: String,
    pub database_url: String,
    pub loglevel: String,
    /// Initial password for the bootstrapped `admin` account.
    pub admin_password: String,
    /// Optional directory of frontend assets served at `/`.
    pub static_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8000".to_string(),
            database_url: "sqlite:handover.sqlite".to_string(),
            loglevel: "info".to_string(),
            admin_password: "admin".to_string(),
            static_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("HANDOVER_"))
            .extract()
    }
}
