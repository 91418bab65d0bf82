//! Service configuration from environment variables

use std::path::PathBuf;

const DEFAULT_CATALOG_PATH: &str = "base_chatbot.db";
const DEFAULT_PORT: u16 = 5000;

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Catalog database with materials, suppliers and prices
    pub catalog_path: PathBuf,
    /// Session store database, created on first start
    pub session_db_path: PathBuf,
    pub port: u16,
    /// Shared key required in `X-API-KEY`; blank disables the check
    pub api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let catalog_path = var("MELIBUY_CATALOG_PATH")
            .filter(|p| !p.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH), PathBuf::from);

        let session_db_path = var("MELIBUY_SESSION_DB_PATH")
            .filter(|p| !p.trim().is_empty())
            .map_or_else(
                || {
                    let home = var("HOME").unwrap_or_else(|| "/tmp".to_string());
                    PathBuf::from(home).join(".melibuy").join("sessions.db")
                },
                PathBuf::from,
            );

        let port = var("MELIBUY_PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let api_key = var("MELIBUY_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Self {
            catalog_path,
            session_db_path,
            port,
            api_key,
        }
    }
}
