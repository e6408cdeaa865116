// src/mailer.rs

use std::sync::Mutex;

use reqwest::blocking::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::ServerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

pub trait Mailer: Send + Sync {
    fn send(&self, mail: &OutgoingMail) -> Result<(), ServerError>;
}

/// Sends and logs failures instead of surfacing them to the request.
pub fn deliver(mailer: &dyn Mailer, mail: OutgoingMail) {
    if let Err(e) = mailer.send(&mail) {
        warn!(to = %mail.to, subject = %mail.subject, error = %e, "mail delivery failed");
    }
}

pub struct BrevoMailer {
    api_key: String,
    sender_email: String,
    sender_name: String,
    client: Client,
}

#[derive(Serialize)]
struct BrevoSender<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct BrevoRecipient<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoPayload<'a> {
    sender: BrevoSender<'a>,
    to: Vec<BrevoRecipient<'a>>,
    subject: &'a str,
    html_content: &'a str,
}

impl BrevoMailer {
    pub fn new(api_key: String, sender_email: String, sender_name: String) -> Self {
        Self {
            api_key,
            sender_email,
            sender_name,
            client: Client::new(),
        }
    }
}

impl Mailer for BrevoMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), ServerError> {
        let payload = BrevoPayload {
            sender: BrevoSender {
                name: &self.sender_name,
                email: &self.sender_email,
            },
            to: vec![BrevoRecipient { email: &mail.to }],
            subject: &mail.subject,
            html_content: &mail.html,
        };

        // Brevo's v3 API endpoint for transactional emails
        let resp = self
            .client
            .post("https://api.brevo.com/v3/smtp/email")
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .map_err(|e| ServerError::MailError(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_else(|_| "(no body)".to_string());
            return Err(ServerError::MailError(format!(
                "Brevo API error: {status} - {text}"
            )));
        }

        info!(to = %mail.to, subject = %mail.subject, "mail sent");
        Ok(())
    }
}

/// Development mailer: logs every message and keeps it in an outbox.
#[derive(Default)]
pub struct LogMailer {
    outbox: Mutex<Vec<OutgoingMail>>,
}

impl LogMailer {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.outbox
            .lock()
            .map(|o| o.clone())
            .unwrap_or_default()
    }
}

impl Mailer for LogMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), ServerError> {
        info!(to = %mail.to, subject = %mail.subject, body = %mail.html, "mail (not sent, no API key)");
        self.outbox
            .lock()
            .map_err(|_| ServerError::InternalError)?
            .push(mail.clone());
        Ok(())
    }
}

fn escape(text: &str) -> String {
    maud::html! { (text) }.into_string()
}

pub fn magic_link_mail(to: &str, store_name: &str, absolute_link: &str) -> OutgoingMail {
    let html = format!(
        r#"
        <html>
            <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
                <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
                    <h2>Sign in to {store}</h2>
                    <p>Click the link below to sign in. It works once and expires shortly.</p>
                    <p><a href="{link}">{link}</a></p>
                    <p style="font-size: 0.8em; color: #999;">
                        If you didn't request this login link, you can safely ignore this email.
                    </p>
                </div>
            </body>
        </html>
        "#,
        store = escape(store_name),
        link = absolute_link,
    );
    OutgoingMail {
        to: to.to_string(),
        subject: format!("Your sign-in link for {store_name}"),
        html,
    }
}

pub fn order_mail(
    to: &str,
    store_name: &str,
    order_id: i64,
    headline: &str,
    absolute_link: &str,
) -> OutgoingMail {
    let html = format!(
        r#"
        <html>
            <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
                <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
                    <h2>Order #{order_id}</h2>
                    <p>{headline}</p>
                    <p><a href="{link}">View your order</a></p>
                </div>
            </body>
        </html>
        "#,
        headline = escape(headline),
        link = absolute_link,
    );
    OutgoingMail {
        to: to.to_string(),
        subject: format!("{store_name}: order #{order_id} update"),
        html,
    }
}
