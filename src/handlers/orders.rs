// src/handlers/orders.rs
use astra::Request;
use rusqlite::Connection;

use crate::db::orders::{events_for_order, find_order, items_for_order, list_orders, Order};
use crate::db::promos::find_promo;
use crate::db::users::find_user_by_id;
use crate::domain::validate::{optional_text, MAX_REVIEW_LEN};
use crate::domain::{Actor, OrderAction};
use crate::errors::ServerError;
use crate::forms::Form;
use crate::handlers::StoreCtx;
use crate::responses::{html_response, redirect, ResultResp};
use crate::services::order_workflow::{apply_action, notify_customer};
use crate::state::AppState;
use crate::templates::pages::{order_page, orders_page, OrderVm};

/// Everything the customer and admin order pages show for one order.
pub fn load_order_vm(conn: &Connection, store_id: i64, order: Order) -> Result<OrderVm, ServerError> {
    let items = items_for_order(conn, order.id)?;
    let events = events_for_order(conn, order.id)?;
    let promo_code = match order.promo_code_id {
        Some(id) => find_promo(conn, store_id, id)?.map(|p| p.code),
        None => None,
    };
    let customer_email = find_user_by_id(conn, order.user_id)?
        .map(|u| u.email)
        .unwrap_or_default();

    Ok(OrderVm {
        order,
        items,
        events,
        promo_code,
        customer_email,
    })
}

pub fn my_orders(state: &AppState, ctx: &StoreCtx) -> ResultResp {
    let user = ctx.user()?;
    let orders = state
        .db
        .with_conn(|conn| list_orders(conn, ctx.store.id, None, Some(user.id)))?;
    html_response(orders_page(&ctx.chrome(), &orders))
}

pub fn my_order(state: &AppState, ctx: &StoreCtx, order_id: i64) -> ResultResp {
    let user = ctx.user()?;
    let vm = state.db.with_conn(|conn| {
        let order = find_order(conn, ctx.store.id, order_id)?
            .filter(|o| o.user_id == user.id)
            .ok_or(ServerError::NotFound)?;
        load_order_vm(conn, ctx.store.id, order)
    })?;
    html_response(order_page(&ctx.chrome(), &vm))
}

pub fn customer_action_from_path(action: &str) -> Option<OrderAction> {
    match action {
        "cancel" => Some(OrderAction::Cancel),
        "accept-quote" => Some(OrderAction::AcceptQuote),
        "request-changes" => Some(OrderAction::RequestChanges),
        _ => None,
    }
}

pub fn customer_action(
    req: &mut Request,
    state: &AppState,
    ctx: &StoreCtx,
    order_id: i64,
    action: OrderAction,
) -> ResultResp {
    let user = ctx.user()?;
    let form = Form::from_body(req)?;
    let note = optional_text("note", form.str_or_empty("note"), MAX_REVIEW_LEN)?;

    let done = state.db.with_conn(|conn| {
        apply_action(
            conn,
            ctx.store.id,
            order_id,
            action,
            Actor::Customer,
            user.id,
            note.as_deref(),
            ctx.now,
        )
    })?;

    notify_customer(state, &ctx.store, &done.order);
    redirect(&ctx.url(&format!("/orders/{order_id}")))
}
