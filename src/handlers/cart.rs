// src/handlers/cart.rs
use astra::Request;

use crate::db::cart::{add_to_cart, cart_lines, remove_cart_line, update_cart_line, CartLine};
use crate::db::orders::find_order;
use crate::domain::pricing::price_lines;
use crate::domain::validate::{parse_id, parse_quantity};
use crate::domain::PricedLine;
use crate::errors::ServerError;
use crate::forms::Form;
use crate::handlers::StoreCtx;
use crate::responses::{html_response, redirect, ResultResp};
use crate::services::checkout::{place_order, CheckoutInput};
use crate::services::order_workflow::notify_customer;
use crate::state::AppState;
use crate::templates::pages::{cart_page, CartVm};

pub fn view_cart(state: &AppState, ctx: &StoreCtx) -> ResultResp {
    let user = ctx.user()?;
    let lines = state
        .db
        .with_conn(|conn| cart_lines(conn, ctx.store.id, user.id))?;
    let priced: Vec<PricedLine> = lines.iter().map(CartLine::priced_line).collect();

    html_response(cart_page(
        &ctx.chrome(),
        &CartVm {
            lines: &lines,
            totals: price_lines(&priced, None),
        },
    ))
}

pub fn add(req: &mut Request, state: &AppState, ctx: &StoreCtx) -> ResultResp {
    let user = ctx.user()?;
    let form = Form::from_body(req)?;
    let product_id = parse_id(form.required("product_id")?)?;
    let quantity = match form.get_trimmed("quantity") {
        Some(raw) => parse_quantity(raw)?,
        None => 1,
    };

    state
        .db
        .with_conn(|conn| add_to_cart(conn, ctx.store.id, user.id, product_id, quantity, ctx.now))?;
    redirect(&ctx.url("/cart"))
}

pub fn update(req: &mut Request, state: &AppState, ctx: &StoreCtx, line_id: i64) -> ResultResp {
    let user = ctx.user()?;
    let form = Form::from_body(req)?;
    let quantity = parse_quantity(form.required("quantity")?)?;

    state
        .db
        .with_conn(|conn| update_cart_line(conn, user.id, line_id, quantity))?;
    redirect(&ctx.url("/cart"))
}

pub fn remove(state: &AppState, ctx: &StoreCtx, line_id: i64) -> ResultResp {
    let user = ctx.user()?;
    state
        .db
        .with_conn(|conn| remove_cart_line(conn, user.id, line_id))?;
    redirect(&ctx.url("/cart"))
}

pub fn checkout(req: &mut Request, state: &AppState, ctx: &StoreCtx) -> ResultResp {
    let user = ctx.user()?;
    let form = Form::from_body(req)?;
    let input = CheckoutInput::from_form(&form)?;

    let order = state.db.with_conn(|conn| {
        let placed = place_order(conn, &ctx.store, &user, &input, ctx.now)?;
        find_order(conn, ctx.store.id, placed.order_id)?.ok_or(ServerError::InternalError)
    })?;

    notify_customer(state, &ctx.store, &order);
    redirect(&ctx.url(&format!("/orders/{}", order.id)))
}
