// src/db/cart.rs
use rusqlite::{params, Connection};

use crate::db::products::{find_product, Product};
use crate::domain::validate::MAX_CART_QTY;
use crate::domain::PricedLine;
use crate::errors::ServerError;

/// A cart row joined with its product.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub id: i64,
    pub quantity: i64,
    pub product: Product,
}

impl CartLine {
    /// Hidden and negotiable prices stay unpriced until quoted.
    pub fn priced_line(&self) -> PricedLine {
        PricedLine {
            product_id: Some(self.product.id),
            quantity: self.quantity,
            unit_price_cents: self.product.price_display().checkout_price(),
        }
    }
}

pub fn add_to_cart(
    conn: &Connection,
    store_id: i64,
    user_id: i64,
    product_id: i64,
    quantity: i64,
    now: i64,
) -> Result<(), ServerError> {
    if quantity < 1 {
        return Err(ServerError::bad_request("quantity must be at least 1"));
    }
    let product = find_product(conn, store_id, product_id)?.ok_or(ServerError::NotFound)?;
    if product.is_archived {
        return Err(ServerError::NotFound);
    }

    conn.execute(
        r#"
        insert into cart_items (user_id, product_id, quantity, added_at)
        values (?1, ?2, min(?3, ?4), ?5)
        on conflict(user_id, product_id)
        do update set quantity = min(quantity + excluded.quantity, ?4)
        "#,
        params![user_id, product_id, quantity, MAX_CART_QTY, now],
    )
    .map_err(|e| ServerError::DbError(format!("add to cart failed: {e}")))?;
    Ok(())
}

/// Sets the quantity of a line; 0 removes it.
pub fn update_cart_line(
    conn: &Connection,
    user_id: i64,
    line_id: i64,
    quantity: i64,
) -> Result<(), ServerError> {
    if quantity <= 0 {
        return remove_cart_line(conn, user_id, line_id);
    }
    let n = conn
        .execute(
            "update cart_items set quantity = ? where id = ? and user_id = ?",
            params![quantity.min(MAX_CART_QTY), line_id, user_id],
        )
        .map_err(|e| ServerError::DbError(format!("update cart line failed: {e}")))?;
    if n == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}

pub fn remove_cart_line(conn: &Connection, user_id: i64, line_id: i64) -> Result<(), ServerError> {
    let n = conn
        .execute(
            "delete from cart_items where id = ? and user_id = ?",
            params![line_id, user_id],
        )
        .map_err(|e| ServerError::DbError(format!("remove cart line failed: {e}")))?;
    if n == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}

pub fn clear_cart(conn: &Connection, user_id: i64) -> Result<(), ServerError> {
    conn.execute("delete from cart_items where user_id = ?", params![user_id])
        .map_err(|e| ServerError::DbError(format!("clear cart failed: {e}")))?;
    Ok(())
}

pub fn cart_lines(conn: &Connection, store_id: i64, user_id: i64) -> Result<Vec<CartLine>, ServerError> {
    let mut stmt = conn
        .prepare(
            "select ci.id, ci.quantity, ci.product_id
             from cart_items ci
             join products p on p.id = ci.product_id
             where ci.user_id = ? and p.store_id = ?
             order by ci.added_at, ci.id",
        )
        .map_err(|e| ServerError::DbError(format!("prepare cart lines failed: {e}")))?;

    let rows: Vec<(i64, i64, i64)> = stmt
        .query_map(params![user_id, store_id], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
        .map_err(|e| ServerError::DbError(format!("select cart lines failed: {e}")))?
        .collect::<Result<_, _>>()
        .map_err(|e| ServerError::DbError(format!("read cart line failed: {e}")))?;

    let mut lines = Vec::with_capacity(rows.len());
    for (id, quantity, product_id) in rows {
        if let Some(product) = find_product(conn, store_id, product_id)? {
            lines.push(CartLine {
                id,
                quantity,
                product,
            });
        }
    }
    Ok(lines)
}

pub fn cart_count(conn: &Connection, user_id: i64) -> Result<i64, ServerError> {
    conn.query_row(
        "select coalesce(sum(quantity), 0) from cart_items where user_id = ?",
        params![user_id],
        |r| r.get(0),
    )
    .map_err(|e| ServerError::DbError(format!("count cart failed: {e}")))
}
