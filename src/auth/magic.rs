// src/auth/magic.rs
use rusqlite::Connection;
use tracing::info;

use crate::auth::token::{hash_token, new_token};
use crate::db::magic_links;
use crate::db::stores::Store;
use crate::db::users;
use crate::errors::ServerError;

#[derive(Debug, Clone)]
pub struct MagicLinkConfig {
    /// TTL for magic links in seconds.
    pub ttl_secs: i64,
    /// Emails promoted to store admin when they sign in.
    pub admin_emails: Vec<String>,
}

impl Default for MagicLinkConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 15 * 60,
            admin_emails: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IssuedMagicLink {
    pub email: String,
    pub user_id: i64,
    /// Raw token (never store this in DB).
    pub token: String,
    pub expires_at: i64,
    /// Relative URL like "/s/demo/auth/magic?token=..."
    pub link: String,
}

#[derive(Debug, Clone)]
pub struct RedeemedMagicLink {
    pub user_id: i64,
    pub email: String,
}

pub struct MagicLinkService {
    cfg: MagicLinkConfig,
}

impl MagicLinkService {
    pub fn new(cfg: MagicLinkConfig) -> Self {
        Self { cfg }
    }

    /// Trim + lowercase, minimal sanity check.
    pub fn normalize_email(email: &str) -> Result<String, ServerError> {
        let e = email.trim().to_lowercase();
        let valid = match e.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !e.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if !valid {
            return Err(ServerError::BadRequest("invalid email".into()));
        }
        Ok(e)
    }

    /// Request a magic link (signup + login unified):
    /// - normalize email
    /// - get_or_create_user in this store, refusing blocked accounts
    /// - promote configured admin emails
    /// - insert magic link (store hash only)
    pub fn request_link(
        &self,
        conn: &Connection,
        store: &Store,
        email: &str,
        now: i64,
    ) -> Result<IssuedMagicLink, ServerError> {
        let email = Self::normalize_email(email)?;
        let user_id = users::get_or_create_user(conn, store.id, &email, now)?;

        let user = users::find_user(conn, store.id, user_id)?.ok_or(ServerError::InternalError)?;
        if user.is_blocked {
            return Err(ServerError::Forbidden("this account has been blocked".into()));
        }
        if !user.is_admin && self.cfg.admin_emails.iter().any(|a| a == &email) {
            users::set_admin(conn, store.id, user_id, true)?;
            info!(store = %store.slug, %email, "granted admin from configuration");
        }

        let token = new_token();
        let expires_at = now + self.cfg.ttl_secs;
        magic_links::insert_magic_link(conn, user_id, &hash_token(&token), now, expires_at)?;

        Ok(IssuedMagicLink {
            email,
            user_id,
            link: format!("/s/{}/auth/magic?token={}", store.slug, token),
            token,
            expires_at,
        })
    }

    /// Redeem a magic link:
    /// - hash token
    /// - consume the link; only links of `store` users qualify
    /// - the owner must not be blocked
    pub fn redeem(
        &self,
        conn: &Connection,
        store: &Store,
        token: &str,
        now: i64,
    ) -> Result<RedeemedMagicLink, ServerError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ServerError::BadRequest("missing token".into()));
        }

        let Some(user_id) = magic_links::consume_magic_link(conn, store.id, &hash_token(token), now)? else {
            return Err(ServerError::Unauthorized("invalid or expired link".into()));
        };

        let user = users::find_user(conn, store.id, user_id)?
            .ok_or_else(|| ServerError::Unauthorized("invalid or expired link".into()))?;
        if user.is_blocked {
            return Err(ServerError::Forbidden("this account has been blocked".into()));
        }

        users::touch_last_login(conn, user_id, now)?;

        Ok(RedeemedMagicLink {
            user_id,
            email: user.email,
        })
    }
}
