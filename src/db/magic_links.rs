// src/db/magic_links.rs
use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::ServerError;

/// Stores the SHA-256 of a sign-in token. The raw token only ever travels by mail.
pub fn insert_magic_link(
    conn: &Connection,
    user_id: i64,
    token_hash: &[u8],
    created_at: i64,
    expires_at: i64,
) -> Result<(), ServerError> {
    conn.execute(
        "insert into magic_links (user_id, token_hash, created_at, expires_at) values (?, ?, ?, ?)",
        params![user_id, token_hash, created_at, expires_at],
    )
    .map_err(|e| ServerError::DbError(format!("insert magic link failed: {e}")))?;
    Ok(())
}

/// Marks an unused, unexpired link owned by a user of `store_id` as used and
/// returns that user. A single conditional update, so two concurrent
/// redemptions cannot both win. Links of other stores are left untouched.
pub fn consume_magic_link(
    conn: &Connection,
    store_id: i64,
    token_hash: &[u8],
    now: i64,
) -> Result<Option<i64>, ServerError> {
    conn.query_row(
        "update magic_links set used_at = ?1
         where token_hash = ?2
           and used_at is null
           and expires_at > ?1
           and user_id in (select id from users where store_id = ?3)
         returning user_id",
        params![now, token_hash, store_id],
        |r| r.get(0),
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("consume magic link failed: {e}")))
}

/// Drops links that can no longer be redeemed.
pub fn purge_stale_links(conn: &Connection, now: i64) -> Result<usize, ServerError> {
    conn.execute(
        "delete from magic_links where used_at is not null or expires_at <= ?",
        params![now],
    )
    .map_err(|e| ServerError::DbError(format!("purge magic links failed: {e}")))
}
