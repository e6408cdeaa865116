// src/db/users.rs
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::errors::ServerError;

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub store_id: i64,
    pub email: String,
    pub name: Option<String>,
    pub is_admin: bool,
    pub is_blocked: bool,
}

#[derive(Debug, Clone)]
pub struct UserWithStats {
    pub id: i64,
    pub email: String,
    pub is_admin: bool,
    pub is_blocked: bool,
    pub order_count: i64,
    pub created_at: i64,
    pub last_login_at: Option<i64>,
}

const USER_COLS: &str = "id, store_id, email, name, is_admin, is_blocked";

fn map_user(r: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: r.get(0)?,
        store_id: r.get(1)?,
        email: r.get(2)?,
        name: r.get(3)?,
        is_admin: r.get(4)?,
        is_blocked: r.get(5)?,
    })
}

/// Insert a user if they don't exist in this store, then return the user id.
/// Email should already be normalized by caller (trim/lowercase).
pub fn get_or_create_user(
    conn: &Connection,
    store_id: i64,
    email: &str,
    now: i64,
) -> Result<i64, ServerError> {
    conn.execute(
        "insert or ignore into users (store_id, email, created_at) values (?, ?, ?)",
        params![store_id, email, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert user failed: {e}")))?;

    conn.query_row(
        "select id from users where store_id = ? and email = ?",
        params![store_id, email],
        |row| row.get(0),
    )
    .map_err(|e| ServerError::DbError(format!("select user id failed: {e}")))
}

pub fn find_user(conn: &Connection, store_id: i64, user_id: i64) -> Result<Option<User>, ServerError> {
    conn.query_row(
        &format!("select {USER_COLS} from users where id = ? and store_id = ?"),
        params![user_id, store_id],
        map_user,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select user failed: {e}")))
}

pub fn find_user_by_email(
    conn: &Connection,
    store_id: i64,
    email: &str,
) -> Result<Option<User>, ServerError> {
    conn.query_row(
        &format!("select {USER_COLS} from users where store_id = ? and email = ?"),
        params![store_id, email],
        map_user,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select user by email failed: {e}")))
}

/// Unscoped lookup used by session resolution; callers check the store.
pub fn find_user_by_id(conn: &Connection, user_id: i64) -> Result<Option<User>, ServerError> {
    conn.query_row(
        &format!("select {USER_COLS} from users where id = ?"),
        params![user_id],
        map_user,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select user failed: {e}")))
}

pub fn set_admin(conn: &Connection, store_id: i64, user_id: i64, admin: bool) -> Result<(), ServerError> {
    let n = conn
        .execute(
            "update users set is_admin = ? where id = ? and store_id = ?",
            params![admin, user_id, store_id],
        )
        .map_err(|e| ServerError::DbError(format!("update is_admin failed: {e}")))?;
    if n == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}

pub fn set_blocked(
    conn: &Connection,
    store_id: i64,
    user_id: i64,
    blocked: bool,
) -> Result<(), ServerError> {
    let n = conn
        .execute(
            "update users set is_blocked = ? where id = ? and store_id = ?",
            params![blocked, user_id, store_id],
        )
        .map_err(|e| ServerError::DbError(format!("update is_blocked failed: {e}")))?;
    if n == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}

pub fn touch_last_login(conn: &Connection, user_id: i64, now: i64) -> Result<(), ServerError> {
    conn.execute(
        "update users set last_login_at = ? where id = ?",
        params![now, user_id],
    )
    .map_err(|e| ServerError::DbError(format!("update last_login_at failed: {e}")))?;
    Ok(())
}

pub fn list_users_with_stats(
    conn: &Connection,
    store_id: i64,
) -> Result<Vec<UserWithStats>, ServerError> {
    let mut stmt = conn
        .prepare(
            r#"
            select u.id, u.email, u.is_admin, u.is_blocked,
                   (select count(*) from orders o where o.user_id = u.id) as order_count,
                   u.created_at, u.last_login_at
            from users u
            where u.store_id = ?
            order by u.created_at desc, u.id desc
            "#,
        )
        .map_err(|e| ServerError::DbError(format!("prepare list users failed: {e}")))?;

    let rows = stmt
        .query_map(params![store_id], |r| {
            Ok(UserWithStats {
                id: r.get(0)?,
                email: r.get(1)?,
                is_admin: r.get(2)?,
                is_blocked: r.get(3)?,
                order_count: r.get(4)?,
                created_at: r.get(5)?,
                last_login_at: r.get(6)?,
            })
        })
        .map_err(|e| ServerError::DbError(format!("list users failed: {e}")))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::DbError(format!("read user row failed: {e}")))
}
