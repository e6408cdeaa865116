// src/db/orders.rs
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::domain::{OrderStatus, OrderTotals, PricedLine};
use crate::errors::ServerError;

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: i64,
    pub store_id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub promo_code_id: Option<i64>,
    pub ship_name: String,
    pub ship_address: String,
    pub ship_city: String,
    pub ship_postal: String,
    pub ship_country: String,
    pub customer_note: Option<String>,
    pub admin_note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: i64,
    pub product_id: Option<i64>,
    pub name: String,
    pub quantity: i64,
    /// Catalog price at checkout; `None` when it was hidden.
    pub list_price_cents: Option<i64>,
    /// Price the customer pays; `None` until quoted.
    pub unit_price_cents: Option<i64>,
    pub is_special: bool,
}

impl OrderItem {
    pub fn priced_line(&self) -> PricedLine {
        PricedLine {
            product_id: self.product_id,
            quantity: self.quantity,
            unit_price_cents: self.unit_price_cents,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderEvent {
    pub from_status: Option<String>,
    pub to_status: String,
    pub actor: String,
    pub note: Option<String>,
    pub created_at: i64,
}

/// Order row joined with the customer's email for admin listings.
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub order: Order,
    pub customer_email: String,
    pub item_count: i64,
}

#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub store_id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub totals: OrderTotals,
    pub promo_code_id: Option<i64>,
    pub ship_name: &'a str,
    pub ship_address: &'a str,
    pub ship_city: &'a str,
    pub ship_postal: &'a str,
    pub ship_country: &'a str,
    pub customer_note: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem<'a> {
    pub product_id: i64,
    pub name: &'a str,
    pub quantity: i64,
    pub list_price_cents: Option<i64>,
    pub unit_price_cents: Option<i64>,
    pub is_special: bool,
}

const ORDER_COLS: &str = "o.id, o.store_id, o.user_id, o.status, o.subtotal_cents, o.discount_cents, \
     o.total_cents, o.promo_code_id, o.ship_name, o.ship_address, o.ship_city, o.ship_postal, \
     o.ship_country, o.customer_note, o.admin_note, o.created_at, o.updated_at";

fn map_order(r: &Row<'_>) -> rusqlite::Result<Order> {
    let status: String = r.get(3)?;
    let status = status.parse::<OrderStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(Order {
        id: r.get(0)?,
        store_id: r.get(1)?,
        user_id: r.get(2)?,
        status,
        subtotal_cents: r.get(4)?,
        discount_cents: r.get(5)?,
        total_cents: r.get(6)?,
        promo_code_id: r.get(7)?,
        ship_name: r.get(8)?,
        ship_address: r.get(9)?,
        ship_city: r.get(10)?,
        ship_postal: r.get(11)?,
        ship_country: r.get(12)?,
        customer_note: r.get(13)?,
        admin_note: r.get(14)?,
        created_at: r.get(15)?,
        updated_at: r.get(16)?,
    })
}

pub fn insert_order(conn: &Connection, order: &NewOrder<'_>, now: i64) -> Result<i64, ServerError> {
    conn.execute(
        r#"
        insert into orders
            (store_id, user_id, status, subtotal_cents, discount_cents, total_cents, promo_code_id,
             ship_name, ship_address, ship_city, ship_postal, ship_country, customer_note,
             created_at, updated_at)
        values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            order.store_id,
            order.user_id,
            order.status.as_str(),
            order.totals.subtotal_cents,
            order.totals.discount_cents,
            order.totals.total_cents,
            order.promo_code_id,
            order.ship_name,
            order.ship_address,
            order.ship_city,
            order.ship_postal,
            order.ship_country,
            order.customer_note,
            now,
            now
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert order failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_item(conn: &Connection, order_id: i64, item: &NewOrderItem<'_>) -> Result<(), ServerError> {
    conn.execute(
        r#"
        insert into order_items
            (order_id, product_id, name, quantity, list_price_cents, unit_price_cents, is_special)
        values (?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            order_id,
            item.product_id,
            item.name,
            item.quantity,
            item.list_price_cents,
            item.unit_price_cents,
            item.is_special
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert order item failed: {e}")))?;
    Ok(())
}

pub fn insert_event(
    conn: &Connection,
    order_id: i64,
    from: Option<OrderStatus>,
    to: OrderStatus,
    actor: &str,
    note: Option<&str>,
    now: i64,
) -> Result<(), ServerError> {
    conn.execute(
        "insert into order_events (order_id, from_status, to_status, actor, note, created_at)
         values (?, ?, ?, ?, ?, ?)",
        params![order_id, from.map(|s| s.as_str()), to.as_str(), actor, note, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert order event failed: {e}")))?;
    Ok(())
}

pub fn find_order(conn: &Connection, store_id: i64, order_id: i64) -> Result<Option<Order>, ServerError> {
    conn.query_row(
        &format!("select {ORDER_COLS} from orders o where o.id = ? and o.store_id = ?"),
        params![order_id, store_id],
        map_order,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select order failed: {e}")))
}

pub fn items_for_order(conn: &Connection, order_id: i64) -> Result<Vec<OrderItem>, ServerError> {
    let mut stmt = conn
        .prepare(
            "select id, product_id, name, quantity, list_price_cents, unit_price_cents, is_special
             from order_items where order_id = ? order by id",
        )
        .map_err(|e| ServerError::DbError(format!("prepare order items failed: {e}")))?;
    let rows = stmt
        .query_map(params![order_id], |r| {
            Ok(OrderItem {
                id: r.get(0)?,
                product_id: r.get(1)?,
                name: r.get(2)?,
                quantity: r.get(3)?,
                list_price_cents: r.get(4)?,
                unit_price_cents: r.get(5)?,
                is_special: r.get(6)?,
            })
        })
        .map_err(|e| ServerError::DbError(format!("select order items failed: {e}")))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::DbError(format!("read order item failed: {e}")))
}

pub fn events_for_order(conn: &Connection, order_id: i64) -> Result<Vec<OrderEvent>, ServerError> {
    let mut stmt = conn
        .prepare(
            "select from_status, to_status, actor, note, created_at
             from order_events where order_id = ? order by created_at, id",
        )
        .map_err(|e| ServerError::DbError(format!("prepare order events failed: {e}")))?;
    let rows = stmt
        .query_map(params![order_id], |r| {
            Ok(OrderEvent {
                from_status: r.get(0)?,
                to_status: r.get(1)?,
                actor: r.get(2)?,
                note: r.get(3)?,
                created_at: r.get(4)?,
            })
        })
        .map_err(|e| ServerError::DbError(format!("select order events failed: {e}")))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::DbError(format!("read order event failed: {e}")))
}

/// Orders of a store, newest first. `user_id` narrows to one customer.
pub fn list_orders(
    conn: &Connection,
    store_id: i64,
    status: Option<OrderStatus>,
    user_id: Option<i64>,
) -> Result<Vec<OrderSummary>, ServerError> {
    let mut stmt = conn
        .prepare(&format!(
            r#"
            select {ORDER_COLS}, u.email,
                   (select coalesce(sum(quantity), 0) from order_items i where i.order_id = o.id)
            from orders o
            join users u on u.id = o.user_id
            where o.store_id = ?1
              and (?2 is null or o.status = ?2)
              and (?3 is null or o.user_id = ?3)
            order by o.created_at desc, o.id desc
            "#
        ))
        .map_err(|e| ServerError::DbError(format!("prepare list orders failed: {e}")))?;

    let rows = stmt
        .query_map(
            params![store_id, status.map(|s| s.as_str()), user_id],
            |r| {
                Ok(OrderSummary {
                    order: map_order(r)?,
                    customer_email: r.get(17)?,
                    item_count: r.get(18)?,
                })
            },
        )
        .map_err(|e| ServerError::DbError(format!("list orders failed: {e}")))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::DbError(format!("read order row failed: {e}")))
}

/// Compare-and-set on the status so concurrent actions cannot both win.
pub fn update_status(
    conn: &Connection,
    order_id: i64,
    from: OrderStatus,
    to: OrderStatus,
    now: i64,
) -> Result<(), ServerError> {
    let n = conn
        .execute(
            "update orders set status = ?, updated_at = ? where id = ? and status = ?",
            params![to.as_str(), now, order_id, from.as_str()],
        )
        .map_err(|e| ServerError::DbError(format!("update order status failed: {e}")))?;
    if n != 1 {
        return Err(ServerError::Conflict("order was changed by someone else".into()));
    }
    Ok(())
}

pub fn set_item_price(
    conn: &Connection,
    order_id: i64,
    item_id: i64,
    unit_price_cents: i64,
) -> Result<(), ServerError> {
    let n = conn
        .execute(
            "update order_items set unit_price_cents = ? where id = ? and order_id = ?",
            params![unit_price_cents, item_id, order_id],
        )
        .map_err(|e| ServerError::DbError(format!("update item price failed: {e}")))?;
    if n == 0 {
        return Err(ServerError::bad_request(format!("unknown order item {item_id}")));
    }
    Ok(())
}

pub fn set_totals(
    conn: &Connection,
    order_id: i64,
    totals: &OrderTotals,
    now: i64,
) -> Result<(), ServerError> {
    conn.execute(
        "update orders set subtotal_cents = ?, discount_cents = ?, total_cents = ?, updated_at = ?
         where id = ?",
        params![
            totals.subtotal_cents,
            totals.discount_cents,
            totals.total_cents,
            now,
            order_id
        ],
    )
    .map_err(|e| ServerError::DbError(format!("update order totals failed: {e}")))?;
    Ok(())
}

pub fn set_promo(conn: &Connection, order_id: i64, promo_id: Option<i64>) -> Result<(), ServerError> {
    conn.execute(
        "update orders set promo_code_id = ? where id = ?",
        params![promo_id, order_id],
    )
    .map_err(|e| ServerError::DbError(format!("update order promo failed: {e}")))?;
    Ok(())
}

pub fn set_admin_note(conn: &Connection, order_id: i64, note: Option<&str>) -> Result<(), ServerError> {
    conn.execute(
        "update orders set admin_note = ? where id = ?",
        params![note, order_id],
    )
    .map_err(|e| ServerError::DbError(format!("update admin note failed: {e}")))?;
    Ok(())
}

pub fn status_counts(conn: &Connection, store_id: i64) -> Result<Vec<(OrderStatus, i64)>, ServerError> {
    let mut counts = Vec::with_capacity(OrderStatus::ALL.len());
    for status in OrderStatus::ALL {
        let n: i64 = conn
            .query_row(
                "select count(*) from orders where store_id = ? and status = ?",
                params![store_id, status.as_str()],
                |r| r.get(0),
            )
            .map_err(|e| ServerError::DbError(format!("count orders failed: {e}")))?;
        counts.push((status, n));
    }
    Ok(counts)
}

/// Sum of accepted and completed order totals created since `since`.
pub fn revenue_since(conn: &Connection, store_id: i64, since: i64) -> Result<i64, ServerError> {
    conn.query_row(
        "select coalesce(sum(total_cents), 0) from orders
         where store_id = ? and created_at >= ? and status in ('ACCEPTED', 'COMPLETED')",
        params![store_id, since],
        |r| r.get(0),
    )
    .map_err(|e| ServerError::DbError(format!("sum revenue failed: {e}")))
}

/// True when the user has an accepted or completed order containing the product.
pub fn has_purchased(conn: &Connection, user_id: i64, product_id: i64) -> Result<bool, ServerError> {
    let n: i64 = conn
        .query_row(
            "select count(*) from orders o join order_items i on i.order_id = o.id
             where o.user_id = ? and i.product_id = ? and o.status in ('ACCEPTED', 'COMPLETED')",
            params![user_id, product_id],
            |r| r.get(0),
        )
        .map_err(|e| ServerError::DbError(format!("check purchase failed: {e}")))?;
    Ok(n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::test_conn;
    use crate::db::users::get_or_create_user;

    // 2024-03-01 00:00:00 UTC
    const MARCH: i64 = 1_709_251_200;

    fn order(conn: &Connection, user_id: i64, status: OrderStatus, total: i64, at: i64) -> i64 {
        let totals = OrderTotals {
            subtotal_cents: total,
            total_cents: total,
            ..OrderTotals::default()
        };
        insert_order(
            conn,
            &NewOrder {
                store_id: 1,
                user_id,
                status,
                totals,
                promo_code_id: None,
                ship_name: "Jane",
                ship_address: "1 Main St",
                ship_city: "Springfield",
                ship_postal: "12345",
                ship_country: "US",
                customer_note: None,
            },
            at,
        )
        .unwrap()
    }

    fn count(counts: &[(OrderStatus, i64)], status: OrderStatus) -> i64 {
        counts.iter().find(|(s, _)| *s == status).map_or(0, |(_, n)| *n)
    }

    #[test]
    fn status_counts_cover_every_status() {
        let conn = test_conn();
        let user = get_or_create_user(&conn, 1, "a@b.com", 0).unwrap();
        order(&conn, user, OrderStatus::Pending, 100, MARCH);
        order(&conn, user, OrderStatus::AdminPending, 100, MARCH);
        order(&conn, user, OrderStatus::AdminPending, 100, MARCH);
        order(&conn, user, OrderStatus::Accepted, 100, MARCH);

        let counts = status_counts(&conn, 1).unwrap();
        assert_eq!(counts.len(), OrderStatus::ALL.len());
        assert_eq!(count(&counts, OrderStatus::Pending), 1);
        assert_eq!(count(&counts, OrderStatus::AdminPending), 2);
        assert_eq!(count(&counts, OrderStatus::Accepted), 1);
        assert_eq!(count(&counts, OrderStatus::Rejected), 0);
    }

    #[test]
    fn revenue_counts_settled_orders_from_the_boundary() {
        let conn = test_conn();
        let user = get_or_create_user(&conn, 1, "a@b.com", 0).unwrap();
        order(&conn, user, OrderStatus::Accepted, 1000, MARCH - 1);
        order(&conn, user, OrderStatus::Accepted, 2000, MARCH);
        order(&conn, user, OrderStatus::Completed, 300, MARCH + 86_400);
        order(&conn, user, OrderStatus::Pending, 40_000, MARCH + 1);
        order(&conn, user, OrderStatus::Cancelled, 50_000, MARCH + 1);
        order(&conn, user, OrderStatus::Rejected, 60_000, MARCH + 1);

        assert_eq!(revenue_since(&conn, 1, MARCH).unwrap(), 2300);
        assert_eq!(revenue_since(&conn, 1, MARCH - 1).unwrap(), 3300);
        assert_eq!(revenue_since(&conn, 2, MARCH).unwrap(), 0);
    }

    #[test]
    fn status_update_needs_the_expected_status() {
        let conn = test_conn();
        let user = get_or_create_user(&conn, 1, "a@b.com", 0).unwrap();
        let id = order(&conn, user, OrderStatus::Pending, 100, MARCH);

        let stale = update_status(&conn, id, OrderStatus::AdminPending, OrderStatus::Accepted, MARCH + 5);
        assert!(matches!(stale, Err(ServerError::Conflict(_))));
        assert_eq!(find_order(&conn, 1, id).unwrap().unwrap().status, OrderStatus::Pending);

        update_status(&conn, id, OrderStatus::Pending, OrderStatus::Accepted, MARCH + 5).unwrap();
        let updated = find_order(&conn, 1, id).unwrap().unwrap();
        assert_eq!(updated.status, OrderStatus::Accepted);
        assert_eq!(updated.updated_at, MARCH + 5);
    }

    #[test]
    fn list_filters_by_status_and_customer() {
        let conn = test_conn();
        let alice = get_or_create_user(&conn, 1, "alice@example.com", 0).unwrap();
        let bob = get_or_create_user(&conn, 1, "bob@example.com", 0).unwrap();
        let first = order(&conn, alice, OrderStatus::Pending, 100, MARCH);
        let second = order(&conn, alice, OrderStatus::Accepted, 100, MARCH + 10);
        let third = order(&conn, bob, OrderStatus::Pending, 100, MARCH + 20);

        let ids = |rows: Vec<OrderSummary>| rows.into_iter().map(|s| s.order.id).collect::<Vec<_>>();
        assert_eq!(ids(list_orders(&conn, 1, None, None).unwrap()), vec![third, second, first]);
        assert_eq!(
            ids(list_orders(&conn, 1, Some(OrderStatus::Pending), None).unwrap()),
            vec![third, first]
        );
        assert_eq!(ids(list_orders(&conn, 1, None, Some(alice)).unwrap()), vec![second, first]);
        assert_eq!(
            ids(list_orders(&conn, 1, Some(OrderStatus::Pending), Some(alice)).unwrap()),
            vec![first]
        );

        let rows = list_orders(&conn, 1, None, Some(bob)).unwrap();
        assert_eq!(rows[0].customer_email, "bob@example.com");
        assert_eq!(rows[0].item_count, 0);
    }
}
