// src/db/promos.rs
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::PromoRules;
use crate::errors::ServerError;

#[derive(Debug, Clone)]
pub struct PromoCode {
    pub id: i64,
    pub store_id: i64,
    pub code: String,
    pub flat_off_cents: Option<i64>,
    pub percent_off: Option<i64>,
    pub min_subtotal_cents: i64,
    pub max_uses: Option<i64>,
    pub uses: i64,
    pub once_per_user: bool,
    pub starts_at: Option<i64>,
    pub expires_at: Option<i64>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PromoInput {
    pub code: String,
    pub flat_off_cents: Option<i64>,
    pub percent_off: Option<i64>,
    pub min_subtotal_cents: i64,
    pub max_uses: Option<i64>,
    pub once_per_user: bool,
    pub starts_at: Option<i64>,
    pub expires_at: Option<i64>,
}

/// A code plus its allow-list and exclusions, as the pricing rules need it.
#[derive(Debug, Clone)]
pub struct PromoWithScope {
    pub promo: PromoCode,
    pub allowed_users: Vec<(i64, String)>,
    pub excluded_products: Vec<(i64, String)>,
}

impl PromoWithScope {
    pub fn rules(&self) -> PromoRules {
        let p = &self.promo;
        PromoRules {
            flat_off_cents: p.flat_off_cents,
            percent_off: p.percent_off,
            min_subtotal_cents: p.min_subtotal_cents,
            max_uses: p.max_uses,
            uses: p.uses,
            once_per_user: p.once_per_user,
            starts_at: p.starts_at,
            expires_at: p.expires_at,
            is_active: p.is_active,
            allowed_user_ids: self.allowed_users.iter().map(|(id, _)| *id).collect(),
            excluded_product_ids: self.excluded_products.iter().map(|(id, _)| *id).collect(),
        }
    }
}

const PROMO_COLS: &str = "id, store_id, code, flat_off_cents, percent_off, min_subtotal_cents, \
     max_uses, uses, once_per_user, starts_at, expires_at, is_active";

fn map_promo(r: &Row<'_>) -> rusqlite::Result<PromoCode> {
    Ok(PromoCode {
        id: r.get(0)?,
        store_id: r.get(1)?,
        code: r.get(2)?,
        flat_off_cents: r.get(3)?,
        percent_off: r.get(4)?,
        min_subtotal_cents: r.get(5)?,
        max_uses: r.get(6)?,
        uses: r.get(7)?,
        once_per_user: r.get(8)?,
        starts_at: r.get(9)?,
        expires_at: r.get(10)?,
        is_active: r.get(11)?,
    })
}

pub fn create_promo(
    conn: &Connection,
    store_id: i64,
    input: &PromoInput,
    now: i64,
) -> Result<i64, ServerError> {
    if input.flat_off_cents.is_none() && input.percent_off.is_none() {
        return Err(ServerError::bad_request(
            "a promo code needs a flat amount, a percentage, or both",
        ));
    }
    if input.percent_off.is_some_and(|p| !(1..=100).contains(&p)) {
        return Err(ServerError::bad_request("percentage must be between 1 and 100"));
    }
    if input.flat_off_cents.is_some_and(|c| c <= 0) {
        return Err(ServerError::bad_request("flat amount must be positive"));
    }
    if let (Some(s), Some(e)) = (input.starts_at, input.expires_at) {
        if e <= s {
            return Err(ServerError::bad_request("expiry must be after the start date"));
        }
    }
    if find_promo_by_code(conn, store_id, &input.code)?.is_some() {
        return Err(ServerError::Conflict(format!(
            "promo code {} already exists",
            input.code
        )));
    }

    conn.execute(
        r#"
        insert into promo_codes
            (store_id, code, flat_off_cents, percent_off, min_subtotal_cents, max_uses,
             once_per_user, starts_at, expires_at, created_at)
        values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            store_id,
            input.code,
            input.flat_off_cents,
            input.percent_off,
            input.min_subtotal_cents,
            input.max_uses,
            input.once_per_user,
            input.starts_at,
            input.expires_at,
            now
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert promo failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

pub fn list_promos(conn: &Connection, store_id: i64) -> Result<Vec<PromoCode>, ServerError> {
    let mut stmt = conn
        .prepare(&format!(
            "select {PROMO_COLS} from promo_codes where store_id = ? order by created_at desc, id desc"
        ))
        .map_err(|e| ServerError::DbError(format!("prepare list promos failed: {e}")))?;
    let rows = stmt
        .query_map(params![store_id], map_promo)
        .map_err(|e| ServerError::DbError(format!("list promos failed: {e}")))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::DbError(format!("read promo row failed: {e}")))
}

pub fn find_promo(conn: &Connection, store_id: i64, id: i64) -> Result<Option<PromoCode>, ServerError> {
    conn.query_row(
        &format!("select {PROMO_COLS} from promo_codes where id = ? and store_id = ?"),
        params![id, store_id],
        map_promo,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select promo failed: {e}")))
}

/// `code` must already be normalized (uppercase).
pub fn find_promo_by_code(
    conn: &Connection,
    store_id: i64,
    code: &str,
) -> Result<Option<PromoCode>, ServerError> {
    conn.query_row(
        &format!("select {PROMO_COLS} from promo_codes where store_id = ? and code = ?"),
        params![store_id, code],
        map_promo,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select promo by code failed: {e}")))
}

pub fn load_scope(conn: &Connection, promo: PromoCode) -> Result<PromoWithScope, ServerError> {
    let allowed_users = pairs(
        conn,
        "select u.id, u.email from promo_code_users pu join users u on u.id = pu.user_id
         where pu.promo_code_id = ? order by u.email",
        promo.id,
    )?;
    let excluded_products = pairs(
        conn,
        "select p.id, p.name from promo_code_exclusions pe join products p on p.id = pe.product_id
         where pe.promo_code_id = ? order by p.name",
        promo.id,
    )?;
    Ok(PromoWithScope {
        promo,
        allowed_users,
        excluded_products,
    })
}

fn pairs(conn: &Connection, sql: &str, id: i64) -> Result<Vec<(i64, String)>, ServerError> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| ServerError::DbError(format!("prepare promo scope failed: {e}")))?;
    let rows = stmt
        .query_map(params![id], |r| Ok((r.get(0)?, r.get(1)?)))
        .map_err(|e| ServerError::DbError(format!("select promo scope failed: {e}")))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::DbError(format!("read promo scope failed: {e}")))
}

pub fn set_promo_active(
    conn: &Connection,
    store_id: i64,
    id: i64,
    active: bool,
) -> Result<(), ServerError> {
    let n = conn
        .execute(
            "update promo_codes set is_active = ? where id = ? and store_id = ?",
            params![active, id, store_id],
        )
        .map_err(|e| ServerError::DbError(format!("update promo failed: {e}")))?;
    if n == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}

pub fn add_allowed_user(conn: &Connection, promo_id: i64, user_id: i64) -> Result<(), ServerError> {
    conn.execute(
        "insert or ignore into promo_code_users (promo_code_id, user_id) values (?, ?)",
        params![promo_id, user_id],
    )
    .map_err(|e| ServerError::DbError(format!("insert promo user failed: {e}")))?;
    Ok(())
}

pub fn remove_allowed_user(conn: &Connection, promo_id: i64, user_id: i64) -> Result<(), ServerError> {
    conn.execute(
        "delete from promo_code_users where promo_code_id = ? and user_id = ?",
        params![promo_id, user_id],
    )
    .map_err(|e| ServerError::DbError(format!("delete promo user failed: {e}")))?;
    Ok(())
}

pub fn add_exclusion(conn: &Connection, promo_id: i64, product_id: i64) -> Result<(), ServerError> {
    conn.execute(
        "insert or ignore into promo_code_exclusions (promo_code_id, product_id) values (?, ?)",
        params![promo_id, product_id],
    )
    .map_err(|e| ServerError::DbError(format!("insert promo exclusion failed: {e}")))?;
    Ok(())
}

pub fn remove_exclusion(conn: &Connection, promo_id: i64, product_id: i64) -> Result<(), ServerError> {
    conn.execute(
        "delete from promo_code_exclusions where promo_code_id = ? and product_id = ?",
        params![promo_id, product_id],
    )
    .map_err(|e| ServerError::DbError(format!("delete promo exclusion failed: {e}")))?;
    Ok(())
}

/// Reserves (`+1`) or releases (`-1`) a use. Uses never drop below zero.
pub fn change_uses(conn: &Connection, promo_id: i64, delta: i64) -> Result<(), ServerError> {
    conn.execute(
        "update promo_codes set uses = max(uses + ?, 0) where id = ?",
        params![delta, promo_id],
    )
    .map_err(|e| ServerError::DbError(format!("update promo uses failed: {e}")))?;
    Ok(())
}

/// Live orders of `user_id` carrying the code, ignoring `except_order`.
pub fn live_uses_by_user(
    conn: &Connection,
    promo_id: i64,
    user_id: i64,
    except_order: Option<i64>,
) -> Result<i64, ServerError> {
    conn.query_row(
        "select count(*) from orders
         where promo_code_id = ? and user_id = ? and id != ?
           and status not in ('CANCELLED', 'REJECTED')",
        params![promo_id, user_id, except_order.unwrap_or(-1)],
        |r| r.get(0),
    )
    .map_err(|e| ServerError::DbError(format!("count promo uses failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::test_conn;
    use crate::db::users::get_or_create_user;

    fn ten_percent() -> PromoInput {
        PromoInput {
            code: "TEN".into(),
            percent_off: Some(10),
            ..PromoInput::default()
        }
    }

    #[test]
    fn create_validates_shape() {
        let conn = test_conn();
        let empty = PromoInput {
            code: "NOTHING".into(),
            ..PromoInput::default()
        };
        assert!(matches!(
            create_promo(&conn, 1, &empty, 0),
            Err(ServerError::BadRequest(_))
        ));
        let over = PromoInput {
            percent_off: Some(101),
            ..ten_percent()
        };
        assert!(create_promo(&conn, 1, &over, 0).is_err());

        create_promo(&conn, 1, &ten_percent(), 0).unwrap();
        assert!(matches!(
            create_promo(&conn, 1, &ten_percent(), 0),
            Err(ServerError::Conflict(_))
        ));
    }

    #[test]
    fn scope_feeds_rules() {
        let conn = test_conn();
        let id = create_promo(&conn, 1, &ten_percent(), 0).unwrap();
        let user = get_or_create_user(&conn, 1, "vip@example.com", 0).unwrap();
        add_allowed_user(&conn, id, user).unwrap();
        add_allowed_user(&conn, id, user).unwrap();

        let promo = find_promo_by_code(&conn, 1, "TEN").unwrap().unwrap();
        let scoped = load_scope(&conn, promo).unwrap();
        assert_eq!(scoped.allowed_users, vec![(user, "vip@example.com".to_string())]);
        assert_eq!(scoped.rules().allowed_user_ids, vec![user]);

        remove_allowed_user(&conn, id, user).unwrap();
        let promo = find_promo(&conn, 1, id).unwrap().unwrap();
        assert!(load_scope(&conn, promo).unwrap().allowed_users.is_empty());
    }

    #[test]
    fn uses_never_go_negative() {
        let conn = test_conn();
        let id = create_promo(&conn, 1, &ten_percent(), 0).unwrap();
        change_uses(&conn, id, 1).unwrap();
        change_uses(&conn, id, -1).unwrap();
        change_uses(&conn, id, -1).unwrap();
        assert_eq!(find_promo(&conn, 1, id).unwrap().unwrap().uses, 0);
    }
}
