use std::{env, fmt::Display, net::SocketAddr, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
#[error("invalid value for {key}: {reason}")]
pub struct ConfigError {
    key: &'static str,
    reason: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub max_workers: usize,
    pub database_path: String,
    pub schema_path: String,
    pub base_url: String,
    pub session_ttl_secs: i64,
    pub magic_link_ttl_secs: i64,
    /// Lowercased emails that become store admins on sign-in.
    pub admin_emails: Vec<String>,
    pub brevo_api_key: Option<String>,
    pub mail_sender_email: String,
    pub mail_sender_name: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: try_load("BIND_ADDR", "127.0.0.1:3000")?,
            max_workers: try_load("MAX_WORKERS", "8")?,
            database_path: try_load("DATABASE_PATH", "storefront.sqlite3")?,
            schema_path: try_load("SCHEMA_PATH", "sql/schema.sql")?,
            base_url: try_load::<String>("BASE_URL", "http://127.0.0.1:3000")?
                .trim_end_matches('/')
                .to_string(),
            session_ttl_secs: try_load("SESSION_TTL_SECS", "604800")?,
            magic_link_ttl_secs: try_load("MAGIC_LINK_TTL_SECS", "900")?,
            admin_emails: parse_email_list(&var("ADMIN_EMAILS").unwrap_or_default()),
            brevo_api_key: var("BREVO_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            mail_sender_email: try_load("MAIL_SENDER_EMAIL", "shop@example.com")?,
            mail_sender_name: try_load("MAIL_SENDER_NAME", "Storefront")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_workers: 8,
            database_path: "storefront.sqlite3".to_string(),
            schema_path: "sql/schema.sql".to_string(),
            base_url: "http://127.0.0.1:3000".to_string(),
            session_ttl_secs: 60 * 60 * 24 * 7,
            magic_link_ttl_secs: 15 * 60,
            admin_emails: Vec::new(),
            brevo_api_key: None,
            mail_sender_email: "shop@example.com".to_string(),
            mail_sender_name: "Storefront".to_string(),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        info!("Environment variable {key} not found");
    })
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError {
                key,
                reason: e.to_string(),
            }
        })
}

fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}
