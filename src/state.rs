use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::db::Database;
use crate::mailer::{BrevoMailer, LogMailer, Mailer};

/// Everything a request handler needs, shared by all astra workers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let mailer: Arc<dyn Mailer> = match &config.brevo_api_key {
            Some(key) => {
                info!("using Brevo for outgoing mail");
                Arc::new(BrevoMailer::new(
                    key.clone(),
                    config.mail_sender_email.clone(),
                    config.mail_sender_name.clone(),
                ))
            }
            None => {
                info!("BREVO_API_KEY not set, mail will only be logged");
                Arc::new(LogMailer::default())
            }
        };

        Self {
            db: Database::new(config.database_path.clone()),
            config,
            mailer,
        }
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    /// Absolute URL for a path, for links that leave the site (mail).
    pub fn absolute(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }
}
