// src/config.rs

use std::path::PathBuf;
use std::time::Duration;

/// Server configuration, read from environment variables with sensible
/// defaults for local use.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port (`CYBERGUARDX_PORT`).
    pub http_port: u16,
    /// Path to the phishing model artifact (`CYBERGUARDX_MODEL_PATH`).
    pub model_path: PathBuf,
    /// Path to the offline breach dataset (`CYBERGUARDX_BREACH_DATA`).
    pub breach_data_path: PathBuf,
    /// Upper bound for each scan sub-check, in seconds
    /// (`CYBERGUARDX_SCAN_TIMEOUT_SECS`).
    pub check_timeout_secs: u64,
    /// How long terminal progress entries are retained, in seconds
    /// (`CYBERGUARDX_PROGRESS_RETENTION_SECS`).
    pub progress_retention_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8000,
            model_path: PathBuf::from("models/phishing_model.json"),
            breach_data_path: PathBuf::from("data/breach_samples.json"),
            check_timeout_secs: 10,
            progress_retention_secs: 3600,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            http_port: env_parsed("CYBERGUARDX_PORT", defaults.http_port),
            model_path: std::env::var("CYBERGUARDX_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            breach_data_path: std::env::var("CYBERGUARDX_BREACH_DATA")
                .map(PathBuf::from)
                .unwrap_or(defaults.breach_data_path),
            check_timeout_secs: env_parsed(
                "CYBERGUARDX_SCAN_TIMEOUT_SECS",
                defaults.check_timeout_secs,
            ),
            progress_retention_secs: env_parsed(
                "CYBERGUARDX_PROGRESS_RETENTION_SECS",
                defaults.progress_retention_secs,
            ),
        }
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs)
    }

    pub fn progress_retention(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.progress_retention_secs as i64)
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
