use anyhow::Context;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub mongodb_db: String,
}

impl Config {
    /// Read configuration from the environment (a local `.env` file is
    /// loaded first when present).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .map(|p| p.parse::<u16>())
            .transpose()
            .context("PORT must be a number")?
            .unwrap_or(5000);
        let mongodb_uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://127.0.0.1:27017".to_string());
        let mongodb_db =
            std::env::var("MONGODB_DB").unwrap_or_else(|_| "bookstore".to_string());

        Ok(Self {
            bind_addr,
            port,
            mongodb_uri,
            mongodb_db,
        })
    }
}
