//! Coordinator configuration, read once from the environment at startup.

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_NAME: &str = "lucky.db";
pub const DEFAULT_WALLET_FILE: &str = "wallet.json";

/// Destructive resets are only honored on this store file.
pub const SAMPLE_DB_NAME: &str = "lucky-sample.db";

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub host: String,
    pub port: u16,
    pub db_name: String,
    /// Shared secret for mutating endpoints. `None` (unset or empty) means
    /// every mutating call is rejected.
    pub api_token: Option<String>,
    pub wallet_file: String,
}

impl CoordinatorConfig {
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            db_name: std::env::var("DB_NAME").unwrap_or_else(|_| DEFAULT_DB_NAME.to_string()),
            api_token: std::env::var("API_TOKEN")
                .ok()
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty()),
            wallet_file: std::env::var("WALLET_FILE")
                .unwrap_or_else(|_| DEFAULT_WALLET_FILE.to_string()),
        }
    }

    pub fn reset_allowed(&self) -> bool {
        self.db_name == SAMPLE_DB_NAME
    }

    pub fn token_configured(&self) -> bool {
        self.api_token.is_some()
    }
}
