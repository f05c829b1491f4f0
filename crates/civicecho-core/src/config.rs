//! ============================================================================
//! Client Configuration
//! ============================================================================
//! Read from the environment. `.env` loading happens in the binary entry
//! point so the library stays free of startup side effects.
//! ============================================================================

/// Backend the portal talks to when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Base URL of the portal backend (CIVICECHO_API_URL).
    pub api_url: String,
    /// Optional override for the local store path (CIVICECHO_DB_PATH).
    pub db_path: Option<String>,
}

impl PortalConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("CIVICECHO_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            db_path: std::env::var("CIVICECHO_DB_PATH").ok(),
        }
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            db_path: None,
        }
    }
}
