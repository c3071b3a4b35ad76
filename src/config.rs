use std::{env, path::PathBuf, time::Duration};
use tracing::warn;

const DEFAULT_JWT_SECRET: &str = "dev_jwt_secret_change_me";
const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 30 * 60;

/// Runtime configuration, resolved once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub visitor_data_path: PathBuf,
    pub users_db_path: PathBuf,
    pub legacy_users_path: PathBuf,
    pub jwt_secret: String,
    pub session_timeout: Duration,
    pub cookie_secure: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                warn!("JWT_SECRET not set, using the insecure development default");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        let session_timeout = env::var("SESSION_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_SESSION_TIMEOUT_SECS));

        let cookie_secure = env::var("APP_ENV")
            .map(|value| value == "production")
            .unwrap_or(false);

        Self {
            port,
            visitor_data_path: crate::storage::resolve_data_path(),
            users_db_path: env::var("USERS_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/users.db")),
            legacy_users_path: env::var("LEGACY_USERS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("users.json")),
            jwt_secret,
            session_timeout,
            cookie_secure,
        }
    }
}
