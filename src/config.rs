// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Terminal frontend URL, for CORS
    pub frontend_url: String,
    /// Work-site id used for staff API uploads when the user has no default
    pub fallback_school_id: i64,
    /// Staff management API base URL; sync is disabled when unset
    pub staff_api_base_url: Option<String>,
    /// Staff management API bearer token; sync is disabled when unset
    pub staff_api_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT"))?,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            fallback_school_id: env::var("DEFAULT_SCHOOL_ID")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("DEFAULT_SCHOOL_ID"))?,
            staff_api_base_url: env::var("STAFF_API_BASE_URL")
                .ok()
                .map(|v| v.trim_end_matches('/').to_string()),
            staff_api_token: env::var("STAFF_API_TOKEN")
                .ok()
                .map(|v| v.trim().to_string()),
        })
    }

    /// Staff API endpoint and token, when both are configured.
    pub fn staff_api(&self) -> Option<(&str, &str)> {
        self.staff_api_base_url
            .as_deref()
            .zip(self.staff_api_token.as_deref())
    }

    /// Default config for tests.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            gcp_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            fallback_school_id: 1,
            staff_api_base_url: None,
            staff_api_token: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test because env vars are process-global and tests run in
    // parallel.
    #[test]
    fn test_config_from_env() {
        env::remove_var("PORT");
        env::set_var("DEFAULT_SCHOOL_ID", "7");
        env::set_var("STAFF_API_BASE_URL", "https://staff.example.com/api/v1/");
        env::set_var("STAFF_API_TOKEN", "token");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.port, 8080);
        assert_eq!(config.fallback_school_id, 7);
        // Trailing slash trimmed so path joins stay clean
        assert_eq!(
            config.staff_api(),
            Some(("https://staff.example.com/api/v1", "token"))
        );
    }
}
