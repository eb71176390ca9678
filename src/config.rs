use anyhow::Result;
use clap::Parser;

/// Default token endpoint of the CS identity service.
const DEFAULT_TOKEN_URL: &str = "https://id.cs-scheduling.com/connect/token";

/// Public client id issued for browser-facing integrations.
const DEFAULT_CLIENT_ID: &str = "cs-web-client";

/// Default base URL of the CS scheduling API.
const DEFAULT_BASE_URL: &str = "https://api.cs-scheduling.com";

/// CS Relay - CORS shield and token cache for the CS scheduling API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Server host address
    #[arg(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// OAuth token endpoint URL
    #[arg(long, env = "CS_TOKEN_URL", default_value = DEFAULT_TOKEN_URL)]
    pub token_url: String,

    /// OAuth client id
    #[arg(long, env = "CS_CLIENT_ID", default_value = DEFAULT_CLIENT_ID)]
    pub client_id: String,

    /// OAuth client secret
    #[arg(long, env = "CS_CLIENT_SECRET")]
    pub client_secret: Option<String>,

    /// Resource-owner username for the password grant
    #[arg(long, env = "CS_USERNAME")]
    pub username: Option<String>,

    /// Resource-owner password for the password grant
    #[arg(long, env = "CS_PASSWORD")]
    pub password: Option<String>,

    /// Scheduling API base URL
    #[arg(long, env = "CS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub host: String,
    pub port: u16,

    // Token acquisition
    pub token_url: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,

    // Upstream scheduling API
    pub base_url: String,

    // Logging
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let args = CliArgs::parse();

        Ok(Config {
            host: args.host,
            port: args.port,
            token_url: args.token_url,
            client_id: args.client_id,
            client_secret: args.client_secret,
            username: args.username,
            password: args.password,
            base_url: args.base_url,
            log_level: args.log_level,
        })
    }

    /// Validate configuration, reporting every missing credential at once.
    ///
    /// Missing credentials surface here, at startup, instead of on the first
    /// token fetch.
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_credentials();
        if !missing.is_empty() {
            anyhow::bail!(
                "missing required configuration: {} (set the variable or pass the matching flag)",
                missing.join(", ")
            );
        }
        Ok(())
    }

    /// Names of required credential variables that are unset or empty.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_unset(&self.client_secret) {
            missing.push("CS_CLIENT_SECRET");
        }
        if is_unset(&self.username) {
            missing.push("CS_USERNAME");
        }
        if is_unset(&self.password) {
            missing.push("CS_PASSWORD");
        }
        missing
    }
}

fn is_unset(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}
