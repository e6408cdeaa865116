// src/auth/guard.rs
//
// Resolves the signed-in user of a request, from the session cookie or a bearer token.

use astra::Request;
use rusqlite::Connection;

use crate::auth::sessions::load_user_from_session;
use crate::auth::token::{bearer_token, cookie_value, SESSION_COOKIE};
use crate::db::stores::Store;
use crate::db::users::User;
use crate::errors::ServerError;

pub fn session_token(req: &Request) -> Option<String> {
    let headers = req.headers();
    if let Some(token) = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
    {
        return Some(token.to_string());
    }
    headers
        .get_all("cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|h| cookie_value(h, SESSION_COOKIE))
        .map(str::to_string)
}

/// The request's user, if the session is live, belongs to `store` and is not blocked.
pub fn current_user(
    req: &Request,
    conn: &Connection,
    store: &Store,
    now: i64,
) -> Result<Option<User>, ServerError> {
    let Some(token) = session_token(req) else {
        return Ok(None);
    };
    let user = load_user_from_session(conn, &token, now)?;
    Ok(user.filter(|u| u.store_id == store.id && !u.is_blocked))
}

pub fn require_user(user: Option<User>) -> Result<User, ServerError> {
    user.ok_or_else(|| ServerError::Unauthorized("please sign in".into()))
}

pub fn require_admin(user: Option<User>) -> Result<User, ServerError> {
    let user = require_user(user)?;
    if !user.is_admin {
        return Err(ServerError::Forbidden("admin access required".into()));
    }
    Ok(user)
}
