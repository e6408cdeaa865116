// src/handlers/admin_moderation.rs
use astra::Request;
use tracing::info;

use crate::db::reviews::{list_for_store, ReviewStatus};
use crate::db::users::{find_user, list_users_with_stats, set_admin, set_blocked};
use crate::errors::ServerError;
use crate::forms::Form;
use crate::handlers::StoreCtx;
use crate::responses::{html_response, redirect, ResultResp};
use crate::services::reviews::{moderate_review, Moderation};
use crate::state::AppState;
use crate::templates::pages::{admin_reviews_page, admin_users_page};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Block,
    Unblock,
    GrantAdmin,
    RevokeAdmin,
}

impl UserAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "block" => Some(UserAction::Block),
            "unblock" => Some(UserAction::Unblock),
            "grant-admin" => Some(UserAction::GrantAdmin),
            "revoke-admin" => Some(UserAction::RevokeAdmin),
            _ => None,
        }
    }
}

pub fn reviews(req: &Request, state: &AppState, ctx: &StoreCtx) -> ResultResp {
    ctx.admin()?;
    let status = Form::from_query(req)
        .get_trimmed("status")
        .and_then(|s| s.parse().ok())
        .unwrap_or(ReviewStatus::Pending);
    let reviews = state
        .db
        .with_conn(|conn| list_for_store(conn, ctx.store.id, status))?;
    html_response(admin_reviews_page(&ctx.chrome(), &reviews, status))
}

pub fn moderate(state: &AppState, ctx: &StoreCtx, review_id: i64, action: Moderation) -> ResultResp {
    ctx.admin()?;
    state
        .db
        .with_conn(|conn| moderate_review(conn, ctx.store.id, review_id, action, ctx.now))?;
    redirect(&ctx.url("/admin/reviews"))
}

pub fn users(state: &AppState, ctx: &StoreCtx) -> ResultResp {
    let admin = ctx.admin()?;
    let users = state
        .db
        .with_conn(|conn| list_users_with_stats(conn, ctx.store.id))?;
    html_response(admin_users_page(&ctx.chrome(), &users, admin.id))
}

/// Admins cannot block or demote themselves, so a store never loses its last admin that way.
pub fn user_action(state: &AppState, ctx: &StoreCtx, user_id: i64, action: UserAction) -> ResultResp {
    let admin = ctx.admin()?;
    if user_id == admin.id && matches!(action, UserAction::Block | UserAction::RevokeAdmin) {
        return Err(ServerError::Forbidden("you cannot do that to your own account".into()));
    }

    state.db.with_conn(|conn| {
        find_user(conn, ctx.store.id, user_id)?.ok_or(ServerError::NotFound)?;
        match action {
            UserAction::Block => set_blocked(conn, ctx.store.id, user_id, true),
            UserAction::Unblock => set_blocked(conn, ctx.store.id, user_id, false),
            UserAction::GrantAdmin => set_admin(conn, ctx.store.id, user_id, true),
            UserAction::RevokeAdmin => set_admin(conn, ctx.store.id, user_id, false),
        }
    })?;

    info!(store = %ctx.store.slug, admin_id = admin.id, user_id, action = ?action, "user updated");
    redirect(&ctx.url("/admin/users"))
}
