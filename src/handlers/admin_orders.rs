// src/handlers/admin_orders.rs
use astra::Request;

use crate::db::orders::{find_order, list_orders};
use crate::domain::money::parse_price;
use crate::domain::validate::{optional_text, MAX_REVIEW_LEN};
use crate::domain::{Actor, OrderAction, OrderStatus};
use crate::errors::ServerError;
use crate::forms::Form;
use crate::handlers::orders::load_order_vm;
use crate::handlers::StoreCtx;
use crate::responses::{html_response, redirect, ResultResp};
use crate::services::order_workflow::{apply_action, notify_customer, quote, set_order_promo};
use crate::spreadsheets::export_orders_xlsx;
use crate::state::AppState;
use crate::templates::pages::{admin_order_page, admin_orders_page};

/// Blank or unknown values mean "all statuses".
fn status_filter(req: &Request) -> Option<OrderStatus> {
    Form::from_query(req)
        .get_trimmed("status")
        .and_then(|s| s.parse().ok())
}

pub fn admin_action_from_path(action: &str) -> Option<OrderAction> {
    match action {
        "accept" => Some(OrderAction::Accept),
        "reject" => Some(OrderAction::Reject),
        "cancel" => Some(OrderAction::Cancel),
        "complete" => Some(OrderAction::Complete),
        _ => None,
    }
}

/// `price_{item_id}` fields of the quote form.
fn quoted_prices(form: &Form) -> Result<Vec<(i64, i64)>, ServerError> {
    let mut prices = form
        .with_prefix("price_")
        .map(|(id, raw)| {
            let id = id
                .parse::<i64>()
                .map_err(|_| ServerError::bad_request("unknown order item"))?;
            let cents = parse_price(raw).map_err(ServerError::BadRequest)?;
            Ok((id, cents))
        })
        .collect::<Result<Vec<_>, ServerError>>()?;
    prices.sort_unstable();
    Ok(prices)
}

pub fn list(req: &Request, state: &AppState, ctx: &StoreCtx) -> ResultResp {
    ctx.admin()?;
    let filter = status_filter(req);
    let orders = state
        .db
        .with_conn(|conn| list_orders(conn, ctx.store.id, filter, None))?;
    html_response(admin_orders_page(&ctx.chrome(), &orders, filter))
}

pub fn export(req: &Request, state: &AppState, ctx: &StoreCtx) -> ResultResp {
    ctx.admin()?;
    let filter = status_filter(req);
    let orders = state
        .db
        .with_conn(|conn| list_orders(conn, ctx.store.id, filter, None))?;
    export_orders_xlsx(&orders, &ctx.store.slug, filter.map(|s| s.as_str()))
}

pub fn detail(state: &AppState, ctx: &StoreCtx, order_id: i64) -> ResultResp {
    ctx.admin()?;
    let vm = state.db.with_conn(|conn| {
        let order = find_order(conn, ctx.store.id, order_id)?.ok_or(ServerError::NotFound)?;
        load_order_vm(conn, ctx.store.id, order)
    })?;
    html_response(admin_order_page(&ctx.chrome(), &vm))
}

pub fn submit_quote(req: &mut Request, state: &AppState, ctx: &StoreCtx, order_id: i64) -> ResultResp {
    ctx.admin()?;
    let form = Form::from_body(req)?;
    let prices = quoted_prices(&form)?;
    let note = optional_text("note", form.str_or_empty("admin_note"), MAX_REVIEW_LEN)?;

    let done = state.db.with_conn(|conn| {
        quote(conn, ctx.store.id, order_id, &prices, note.as_deref(), ctx.now)
    })?;

    notify_customer(state, &ctx.store, &done.order);
    redirect(&ctx.url(&format!("/admin/orders/{order_id}")))
}

pub fn promo(req: &mut Request, state: &AppState, ctx: &StoreCtx, order_id: i64) -> ResultResp {
    ctx.admin()?;
    let form = Form::from_body(req)?;
    let code = form.get_trimmed("code");

    state
        .db
        .with_conn(|conn| set_order_promo(conn, ctx.store.id, order_id, code, ctx.now))?;
    redirect(&ctx.url(&format!("/admin/orders/{order_id}")))
}

pub fn action(
    req: &mut Request,
    state: &AppState,
    ctx: &StoreCtx,
    order_id: i64,
    action: OrderAction,
) -> ResultResp {
    let admin = ctx.admin()?;
    let form = Form::from_body(req)?;
    let note = optional_text("note", form.str_or_empty("note"), MAX_REVIEW_LEN)?;

    let done = state.db.with_conn(|conn| {
        apply_action(
            conn,
            ctx.store.id,
            order_id,
            action,
            Actor::Admin,
            admin.id,
            note.as_deref(),
            ctx.now,
        )
    })?;

    notify_customer(state, &ctx.store, &done.order);
    redirect(&ctx.url(&format!("/admin/orders/{order_id}")))
}
