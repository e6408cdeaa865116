// src/services/reviews.rs
use rusqlite::Connection;
use tracing::info;

use crate::db::orders::has_purchased;
use crate::db::products::find_product;
use crate::db::reviews::{delete_review, find_review, set_review_status, upsert_review, ReviewStatus};
use crate::db::users::User;
use crate::domain::validate::{optional_text, parse_rating, MAX_REVIEW_LEN};
use crate::errors::ServerError;

/// Creates or edits the user's review; either way it goes back to moderation.
pub fn submit_review(
    conn: &Connection,
    store_id: i64,
    user: &User,
    product_id: i64,
    rating: &str,
    body: &str,
    now: i64,
) -> Result<(), ServerError> {
    let product = find_product(conn, store_id, product_id)?
        .filter(|p| !p.is_archived)
        .ok_or(ServerError::NotFound)?;

    if !has_purchased(conn, user.id, product.id)? {
        return Err(ServerError::Forbidden(
            "only customers who bought this product can review it".into(),
        ));
    }

    let rating = parse_rating(rating)?;
    let body = optional_text("review", body, MAX_REVIEW_LEN)?.unwrap_or_default();
    upsert_review(conn, product.id, user.id, rating, &body, now)?;

    info!(product_id = product.id, user_id = user.id, rating, "review submitted");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moderation {
    Approve,
    Reject,
    Delete,
}

impl Moderation {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "approve" => Some(Moderation::Approve),
            "reject" => Some(Moderation::Reject),
            "delete" => Some(Moderation::Delete),
            _ => None,
        }
    }
}

pub fn moderate_review(
    conn: &Connection,
    store_id: i64,
    review_id: i64,
    action: Moderation,
    now: i64,
) -> Result<(), ServerError> {
    let review = find_review(conn, store_id, review_id)?.ok_or(ServerError::NotFound)?;
    match action {
        Moderation::Approve => set_review_status(conn, review.id, ReviewStatus::Approved, now)?,
        Moderation::Reject => set_review_status(conn, review.id, ReviewStatus::Rejected, now)?,
        Moderation::Delete => delete_review(conn, review.id)?,
    }
    info!(review_id, action = ?action, "review moderated");
    Ok(())
}
