// src/handlers/admin_promos.rs
use astra::Request;
use rusqlite::Connection;
use tracing::info;

use crate::auth::magic::MagicLinkService;
use crate::db::products::{find_product, list_all_products};
use crate::db::promos::{
    add_allowed_user, add_exclusion, create_promo, find_promo, list_promos, load_scope,
    remove_allowed_user, remove_exclusion, set_promo_active, PromoCode, PromoInput,
};
use crate::db::users::find_user_by_email;
use crate::domain::money::parse_price;
use crate::domain::validate::{normalize_promo_code, parse_id};
use crate::errors::ServerError;
use crate::forms::Form;
use crate::handlers::StoreCtx;
use crate::responses::{html_response, redirect, ResultResp};
use crate::state::AppState;
use crate::templates::pages::{admin_promo_page, admin_promos_page};
use crate::util::parse_date;

const DAY_SECS: i64 = 86_400;

fn optional_price(form: &Form, key: &str) -> Result<Option<i64>, ServerError> {
    form.get_trimmed(key)
        .map(|raw| parse_price(raw).map_err(ServerError::BadRequest))
        .transpose()
}

fn optional_date(form: &Form, key: &str) -> Result<Option<i64>, ServerError> {
    form.get_trimmed(key)
        .map(|raw| {
            parse_date(raw).ok_or_else(|| ServerError::bad_request(format!("{key} must be a date")))
        })
        .transpose()
}

/// Expiry dates are inclusive: the code works until the end of that day (UTC).
fn promo_input(form: &Form) -> Result<PromoInput, ServerError> {
    let max_uses = form.optional_i64("max_uses")?;
    if max_uses.is_some_and(|m| m < 1) {
        return Err(ServerError::bad_request("maximum uses must be at least 1"));
    }
    Ok(PromoInput {
        code: normalize_promo_code(form.str_or_empty("code"))?,
        flat_off_cents: optional_price(form, "flat_off")?,
        percent_off: form.optional_i64("percent_off")?,
        min_subtotal_cents: optional_price(form, "min_subtotal")?.unwrap_or(0),
        max_uses,
        once_per_user: form.checkbox("once_per_user"),
        starts_at: optional_date(form, "starts_at")?,
        expires_at: optional_date(form, "expires_at")?.map(|d| d + DAY_SECS),
    })
}

fn store_promo(conn: &Connection, ctx: &StoreCtx, promo_id: i64) -> Result<PromoCode, ServerError> {
    find_promo(conn, ctx.store.id, promo_id)?.ok_or(ServerError::NotFound)
}

fn back_to(ctx: &StoreCtx, promo_id: i64) -> ResultResp {
    redirect(&ctx.url(&format!("/admin/promos/{promo_id}")))
}

pub fn list(state: &AppState, ctx: &StoreCtx) -> ResultResp {
    ctx.admin()?;
    let promos = state.db.with_conn(|conn| list_promos(conn, ctx.store.id))?;
    html_response(admin_promos_page(&ctx.chrome(), &promos))
}

pub fn create(req: &mut Request, state: &AppState, ctx: &StoreCtx) -> ResultResp {
    ctx.admin()?;
    let input = promo_input(&Form::from_body(req)?)?;
    let id = state
        .db
        .with_conn(|conn| create_promo(conn, ctx.store.id, &input, ctx.now))?;
    info!(store = %ctx.store.slug, promo_id = id, code = %input.code, "promo code created");
    back_to(ctx, id)
}

pub fn detail(state: &AppState, ctx: &StoreCtx, promo_id: i64) -> ResultResp {
    ctx.admin()?;
    let (scope, products) = state.db.with_conn(|conn| {
        let promo = store_promo(conn, ctx, promo_id)?;
        Ok((load_scope(conn, promo)?, list_all_products(conn, ctx.store.id)?))
    })?;
    html_response(admin_promo_page(&ctx.chrome(), &scope, &products))
}

pub fn toggle(state: &AppState, ctx: &StoreCtx, promo_id: i64) -> ResultResp {
    ctx.admin()?;
    let active = state.db.with_conn(|conn| {
        let promo = store_promo(conn, ctx, promo_id)?;
        set_promo_active(conn, ctx.store.id, promo.id, !promo.is_active)?;
        Ok(!promo.is_active)
    })?;
    info!(promo_id, active, "promo code toggled");
    back_to(ctx, promo_id)
}

pub fn allow_user(req: &mut Request, state: &AppState, ctx: &StoreCtx, promo_id: i64) -> ResultResp {
    ctx.admin()?;
    let form = Form::from_body(req)?;
    let email = MagicLinkService::normalize_email(form.str_or_empty("email"))?;

    state.db.with_conn(|conn| {
        let promo = store_promo(conn, ctx, promo_id)?;
        let user = find_user_by_email(conn, ctx.store.id, &email)?.ok_or_else(|| {
            ServerError::bad_request(format!("{email} has no account in this store"))
        })?;
        add_allowed_user(conn, promo.id, user.id)
    })?;
    back_to(ctx, promo_id)
}

pub fn disallow_user(state: &AppState, ctx: &StoreCtx, promo_id: i64, user_id: i64) -> ResultResp {
    ctx.admin()?;
    state.db.with_conn(|conn| {
        let promo = store_promo(conn, ctx, promo_id)?;
        remove_allowed_user(conn, promo.id, user_id)
    })?;
    back_to(ctx, promo_id)
}

pub fn exclude_product(req: &mut Request, state: &AppState, ctx: &StoreCtx, promo_id: i64) -> ResultResp {
    ctx.admin()?;
    let form = Form::from_body(req)?;
    let product_id = parse_id(form.required("product_id")?)?;

    state.db.with_conn(|conn| {
        let promo = store_promo(conn, ctx, promo_id)?;
        let product = find_product(conn, ctx.store.id, product_id)?.ok_or(ServerError::NotFound)?;
        add_exclusion(conn, promo.id, product.id)
    })?;
    back_to(ctx, promo_id)
}

pub fn include_product(state: &AppState, ctx: &StoreCtx, promo_id: i64, product_id: i64) -> ResultResp {
    ctx.admin()?;
    state.db.with_conn(|conn| {
        let promo = store_promo(conn, ctx, promo_id)?;
        remove_exclusion(conn, promo.id, product_id)
    })?;
    back_to(ctx, promo_id)
}
