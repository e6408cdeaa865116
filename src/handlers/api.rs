// src/handlers/api.rs
//
// Read-only JSON views. Products are public; orders need a session token,
// sent as `Authorization: Bearer <token>` or the session cookie.

use astra::Request;
use serde::Serialize;

use crate::db::orders::{events_for_order, find_order, items_for_order, list_orders, Order, OrderEvent, OrderItem};
use crate::db::products::{find_product_by_slug, list_products, Product};
use crate::db::reviews::rating_summary;
use crate::errors::ServerError;
use crate::forms::Form;
use crate::handlers::catalog::product_query;
use crate::handlers::StoreCtx;
use crate::responses::{json_response, ResultResp};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProductJson<'a> {
    pub id: i64,
    pub slug: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub category_id: Option<i64>,
    pub price_cents: Option<i64>,
    pub price_on_request: bool,
    pub negotiable: bool,
    pub in_stock: bool,
    pub image_url: Option<&'a str>,
}

impl<'a> From<&'a Product> for ProductJson<'a> {
    fn from(p: &'a Product) -> Self {
        let display = p.price_display();
        Self {
            id: p.id,
            slug: &p.slug,
            name: &p.name,
            description: &p.description,
            category_id: p.category_id,
            price_cents: display.visible_cents(),
            price_on_request: p.hide_price,
            negotiable: p.negotiable_price,
            in_stock: !matches!(p.stock, Some(s) if s <= 0),
            image_url: p.image_url.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ProductListJson<'a> {
    products: Vec<ProductJson<'a>>,
    total: i64,
    page: i64,
    page_count: i64,
}

#[derive(Debug, Serialize)]
struct ProductDetailJson<'a> {
    #[serde(flatten)]
    product: ProductJson<'a>,
    review_count: i64,
    average_rating: Option<f64>,
}

#[derive(Debug, Serialize)]
struct OrderDetailJson {
    #[serde(flatten)]
    order: Order,
    items: Vec<OrderItem>,
    events: Vec<OrderEvent>,
}

pub fn products(req: &Request, state: &AppState, ctx: &StoreCtx) -> ResultResp {
    let query = product_query(&Form::from_query(req));
    let page = state
        .db
        .with_conn(|conn| list_products(conn, ctx.store.id, &query))?;

    json_response(
        200,
        &ProductListJson {
            products: page.products.iter().map(ProductJson::from).collect(),
            total: page.total,
            page: page.page,
            page_count: page.page_count,
        },
    )
}

pub fn product(state: &AppState, ctx: &StoreCtx, slug: &str) -> ResultResp {
    let (product, summary) = state.db.with_conn(|conn| {
        let product = find_product_by_slug(conn, ctx.store.id, slug)?
            .filter(|p| !p.is_archived)
            .ok_or(ServerError::NotFound)?;
        let summary = rating_summary(conn, product.id)?;
        Ok((product, summary))
    })?;

    json_response(
        200,
        &ProductDetailJson {
            product: ProductJson::from(&product),
            review_count: summary.count,
            average_rating: summary.average,
        },
    )
}

pub fn orders(state: &AppState, ctx: &StoreCtx) -> ResultResp {
    let user = ctx.user()?;
    let orders: Vec<Order> = state
        .db
        .with_conn(|conn| list_orders(conn, ctx.store.id, None, Some(user.id)))?
        .into_iter()
        .map(|s| s.order)
        .collect();
    json_response(200, &orders)
}

pub fn order(state: &AppState, ctx: &StoreCtx, order_id: i64) -> ResultResp {
    let user = ctx.user()?;
    let detail = state.db.with_conn(|conn| {
        let order = find_order(conn, ctx.store.id, order_id)?
            .filter(|o| o.user_id == user.id)
            .ok_or(ServerError::NotFound)?;
        Ok(OrderDetailJson {
            items: items_for_order(conn, order.id)?,
            events: events_for_order(conn, order.id)?,
            order,
        })
    })?;
    json_response(200, &detail)
}
