use std::path::Path;

use tracing::{info, warn};

const DEFAULT_SESSION_HOURS: i64 = 12;
const DEFAULT_SESSION_CLEANUP_SECS: u64 = 3600;

pub fn load_environment() -> Result<(), Box<dyn std::error::Error>> {
    let is_production =
        dotenvy::var("ROCKET_PROFILE").unwrap_or("development".to_string()) == "production";

    let env_files = if is_production {
        vec!["config/common.env", "config/prod.env", ".secrets.env"]
    } else {
        vec!["config/common.env", "config/dev.env", ".secrets.env"]
    };

    for env_file in env_files {
        load_env_file(env_file)?;
    }

    Ok(())
}

fn load_env_file(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !Path::new(path).exists() {
        warn!("Warning: Environment file {} not found, skipping", path);
        return Ok(());
    }

    dotenvy::from_filename_override(path)?;
    info!("Loaded environment from: {}", path);
    Ok(())
}

/// Runtime settings read from the process environment after the env files
/// have been layered in.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_url: String,
    pub session_hours: i64,
    pub session_cleanup_secs: u64,
    pub service_env: String,
    pub honeycomb_api_key: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            database_url: dotenvy::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://club-console.db?mode=rwc".to_string()),
            session_hours: parse_or("SESSION_HOURS", DEFAULT_SESSION_HOURS),
            session_cleanup_secs: parse_or("SESSION_CLEANUP_SECS", DEFAULT_SESSION_CLEANUP_SECS),
            service_env: dotenvy::var("OTEL_SERVICE_ENV").unwrap_or("development".to_string()),
            honeycomb_api_key: dotenvy::var("HONEYCOMB_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            session_hours: DEFAULT_SESSION_HOURS,
            session_cleanup_secs: DEFAULT_SESSION_CLEANUP_SECS,
            service_env: "test".to_string(),
            honeycomb_api_key: None,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match dotenvy::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(key = %key, value = %raw, "Unparseable setting, using default");
                default
            }
        },
        Err(_) => default,
    }
}
