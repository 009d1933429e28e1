use anyhow::{bail, Context, Result};

/// Credentials for the admin account created at startup.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<u32>()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            bootstrap_admin: bootstrap_admin(
                std::env::var("BOOTSTRAP_ADMIN_EMAIL").ok(),
                std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok(),
            )?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn bootstrap_admin(
    email: Option<String>,
    password: Option<String>,
) -> Result<Option<BootstrapAdmin>> {
    match (email, password) {
        (None, None) => Ok(None),
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            Ok(Some(BootstrapAdmin { email, password }))
        }
        _ => bail!("BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together"),
    }
}
