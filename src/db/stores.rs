// src/db/stores.rs
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::errors::ServerError;

#[derive(Debug, Clone)]
pub struct Store {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub currency: String,
    pub auto_accept_orders: bool,
}

const STORE_COLS: &str = "id, slug, name, currency, auto_accept_orders";

fn map_store(r: &Row<'_>) -> rusqlite::Result<Store> {
    Ok(Store {
        id: r.get(0)?,
        slug: r.get(1)?,
        name: r.get(2)?,
        currency: r.get(3)?,
        auto_accept_orders: r.get(4)?,
    })
}

pub fn find_store_by_slug(conn: &Connection, slug: &str) -> Result<Option<Store>, ServerError> {
    conn.query_row(
        &format!("select {STORE_COLS} from stores where slug = ?"),
        params![slug],
        map_store,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select store failed: {e}")))
}

pub fn list_stores(conn: &Connection) -> Result<Vec<Store>, ServerError> {
    let mut stmt = conn
        .prepare(&format!("select {STORE_COLS} from stores order by name"))
        .map_err(|e| ServerError::DbError(format!("prepare list stores failed: {e}")))?;
    let rows = stmt
        .query_map([], map_store)
        .map_err(|e| ServerError::DbError(format!("list stores failed: {e}")))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::DbError(format!("read store row failed: {e}")))
}

pub fn create_store(
    conn: &Connection,
    slug: &str,
    name: &str,
    currency: &str,
    now: i64,
) -> Result<i64, ServerError> {
    conn.execute(
        "insert into stores (slug, name, currency, created_at) values (?, ?, ?, ?)",
        params![slug, name, currency, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert store failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

pub fn update_store_settings(
    conn: &Connection,
    store_id: i64,
    name: &str,
    auto_accept_orders: bool,
) -> Result<(), ServerError> {
    conn.execute(
        "update stores set name = ?, auto_accept_orders = ? where id = ?",
        params![name, auto_accept_orders, store_id],
    )
    .map_err(|e| ServerError::DbError(format!("update store failed: {e}")))?;
    Ok(())
}
