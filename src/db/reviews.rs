// src/db/reviews.rs
use std::fmt;
use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::errors::ServerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "PENDING",
            ReviewStatus::Approved => "APPROVED",
            ReviewStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(ReviewStatus::Pending),
            "APPROVED" => Ok(ReviewStatus::Approved),
            "REJECTED" => Ok(ReviewStatus::Rejected),
            other => Err(format!("unknown review status: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Review {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub user_id: i64,
    pub author_email: String,
    pub rating: i64,
    pub body: String,
    pub status: ReviewStatus,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingSummary {
    pub count: i64,
    pub average: Option<f64>,
}

const REVIEW_SELECT: &str = r#"
    select r.id, r.product_id, p.name, r.user_id, u.email, r.rating, r.body, r.status, r.created_at
    from reviews r
    join products p on p.id = r.product_id
    join users u on u.id = r.user_id
"#;

fn map_review(r: &Row<'_>) -> rusqlite::Result<Review> {
    let status: String = r.get(7)?;
    Ok(Review {
        id: r.get(0)?,
        product_id: r.get(1)?,
        product_name: r.get(2)?,
        user_id: r.get(3)?,
        author_email: r.get(4)?,
        rating: r.get(5)?,
        body: r.get(6)?,
        status: status.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, e.into())
        })?,
        created_at: r.get(8)?,
    })
}

/// Creates the user's review of a product, or edits it and sends it back to moderation.
pub fn upsert_review(
    conn: &Connection,
    product_id: i64,
    user_id: i64,
    rating: i64,
    body: &str,
    now: i64,
) -> Result<(), ServerError> {
    conn.execute(
        r#"
        insert into reviews (product_id, user_id, rating, body, status, created_at, updated_at)
        values (?1, ?2, ?3, ?4, 'PENDING', ?5, ?5)
        on conflict(product_id, user_id)
        do update set rating = excluded.rating, body = excluded.body,
                      status = 'PENDING', updated_at = excluded.updated_at
        "#,
        params![product_id, user_id, rating, body, now],
    )
    .map_err(|e| ServerError::DbError(format!("upsert review failed: {e}")))?;
    Ok(())
}

pub fn approved_for_product(conn: &Connection, product_id: i64) -> Result<Vec<Review>, ServerError> {
    let mut stmt = conn
        .prepare(&format!(
            "{REVIEW_SELECT} where r.product_id = ? and r.status = 'APPROVED' order by r.created_at desc"
        ))
        .map_err(|e| ServerError::DbError(format!("prepare reviews failed: {e}")))?;
    let rows = stmt
        .query_map(params![product_id], map_review)
        .map_err(|e| ServerError::DbError(format!("select reviews failed: {e}")))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::DbError(format!("read review failed: {e}")))
}

pub fn rating_summary(conn: &Connection, product_id: i64) -> Result<RatingSummary, ServerError> {
    conn.query_row(
        "select count(*), avg(rating) from reviews where product_id = ? and status = 'APPROVED'",
        params![product_id],
        |r| {
            Ok(RatingSummary {
                count: r.get(0)?,
                average: r.get(1)?,
            })
        },
    )
    .map_err(|e| ServerError::DbError(format!("rating summary failed: {e}")))
}

pub fn list_for_store(
    conn: &Connection,
    store_id: i64,
    status: ReviewStatus,
) -> Result<Vec<Review>, ServerError> {
    let mut stmt = conn
        .prepare(&format!(
            "{REVIEW_SELECT} where p.store_id = ? and r.status = ? order by r.updated_at desc, r.id desc"
        ))
        .map_err(|e| ServerError::DbError(format!("prepare store reviews failed: {e}")))?;
    let rows = stmt
        .query_map(params![store_id, status.as_str()], map_review)
        .map_err(|e| ServerError::DbError(format!("select store reviews failed: {e}")))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::DbError(format!("read review failed: {e}")))
}

pub fn find_review(conn: &Connection, store_id: i64, review_id: i64) -> Result<Option<Review>, ServerError> {
    conn.query_row(
        &format!("{REVIEW_SELECT} where r.id = ? and p.store_id = ?"),
        params![review_id, store_id],
        map_review,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select review failed: {e}")))
}

pub fn find_user_review(
    conn: &Connection,
    product_id: i64,
    user_id: i64,
) -> Result<Option<Review>, ServerError> {
    conn.query_row(
        &format!("{REVIEW_SELECT} where r.product_id = ? and r.user_id = ?"),
        params![product_id, user_id],
        map_review,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select user review failed: {e}")))
}

pub fn set_review_status(
    conn: &Connection,
    review_id: i64,
    status: ReviewStatus,
    now: i64,
) -> Result<(), ServerError> {
    conn.execute(
        "update reviews set status = ?, updated_at = ? where id = ?",
        params![status.as_str(), now, review_id],
    )
    .map_err(|e| ServerError::DbError(format!("update review status failed: {e}")))?;
    Ok(())
}

pub fn delete_review(conn: &Connection, review_id: i64) -> Result<(), ServerError> {
    conn.execute("delete from reviews where id = ?", params![review_id])
        .map_err(|e| ServerError::DbError(format!("delete review failed: {e}")))?;
    Ok(())
}

pub fn pending_count(conn: &Connection, store_id: i64) -> Result<i64, ServerError> {
    conn.query_row(
        "select count(*) from reviews r join products p on p.id = r.product_id
         where p.store_id = ? and r.status = 'PENDING'",
        params![store_id],
        |r| r.get(0),
    )
    .map_err(|e| ServerError::DbError(format!("count pending reviews failed: {e}")))
}
