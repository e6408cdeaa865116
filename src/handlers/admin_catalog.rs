// src/handlers/admin_catalog.rs
use astra::Request;
use tracing::info;

use crate::db::products::{
    create_category, create_product, find_product, list_all_products, list_categories,
    set_archived, update_product, ProductInput,
};
use crate::domain::money::parse_price;
use crate::domain::validate::{
    is_valid_slug, optional_text, required_text, slugify, MAX_NAME_LEN, MAX_REVIEW_LEN,
};
use crate::errors::ServerError;
use crate::forms::Form;
use crate::handlers::StoreCtx;
use crate::responses::{html_response, redirect, ResultResp};
use crate::state::AppState;
use crate::templates::pages::{admin_products_page, product_form_page};

const MAX_DESCRIPTION_LEN: usize = 10 * MAX_REVIEW_LEN;

/// Blank slugs are derived from the name.
fn slug_field(form: &Form, name: &str) -> Result<String, ServerError> {
    let slug = match form.get_trimmed("slug") {
        Some(s) => s.to_ascii_lowercase(),
        None => slugify(name),
    };
    if !is_valid_slug(&slug) {
        return Err(ServerError::bad_request(
            "slug may only contain lowercase letters, digits and dashes",
        ));
    }
    Ok(slug)
}

fn product_input(form: &Form) -> Result<ProductInput, ServerError> {
    let name = required_text("name", form.str_or_empty("name"), MAX_NAME_LEN)?;
    let slug = slug_field(form, &name)?;
    let price_cents = parse_price(form.str_or_empty("price")).map_err(ServerError::BadRequest)?;
    let stock = form.optional_i64("stock")?;
    if stock.is_some_and(|s| s < 0) {
        return Err(ServerError::bad_request("stock cannot be negative"));
    }
    let category_id = form.optional_i64("category_id")?;

    Ok(ProductInput {
        category_id,
        name,
        slug,
        description: optional_text("description", form.str_or_empty("description"), MAX_DESCRIPTION_LEN)?
            .unwrap_or_default(),
        price_cents,
        stock,
        negotiable_price: form.checkbox("negotiable_price"),
        hide_price: form.checkbox("hide_price"),
        image_url: optional_text("image url", form.str_or_empty("image_url"), MAX_NAME_LEN * 5)?,
    })
}

pub fn products(state: &AppState, ctx: &StoreCtx) -> ResultResp {
    ctx.admin()?;
    let (products, categories) = state.db.with_conn(|conn| {
        Ok((
            list_all_products(conn, ctx.store.id)?,
            list_categories(conn, ctx.store.id)?,
        ))
    })?;
    html_response(admin_products_page(&ctx.chrome(), &products, &categories))
}

pub fn new_product(state: &AppState, ctx: &StoreCtx) -> ResultResp {
    ctx.admin()?;
    let categories = state
        .db
        .with_conn(|conn| list_categories(conn, ctx.store.id))?;
    html_response(product_form_page(&ctx.chrome(), None, &categories))
}

pub fn create(req: &mut Request, state: &AppState, ctx: &StoreCtx) -> ResultResp {
    ctx.admin()?;
    let input = product_input(&Form::from_body(req)?)?;
    let id = state
        .db
        .with_conn(|conn| create_product(conn, ctx.store.id, &input, ctx.now))?;
    info!(store = %ctx.store.slug, product_id = id, slug = %input.slug, "product created");
    redirect(&ctx.url("/admin/products"))
}

pub fn edit_product(state: &AppState, ctx: &StoreCtx, product_id: i64) -> ResultResp {
    ctx.admin()?;
    let (product, categories) = state.db.with_conn(|conn| {
        let product = find_product(conn, ctx.store.id, product_id)?.ok_or(ServerError::NotFound)?;
        Ok((product, list_categories(conn, ctx.store.id)?))
    })?;
    html_response(product_form_page(&ctx.chrome(), Some(&product), &categories))
}

pub fn update(req: &mut Request, state: &AppState, ctx: &StoreCtx, product_id: i64) -> ResultResp {
    ctx.admin()?;
    let input = product_input(&Form::from_body(req)?)?;
    state
        .db
        .with_conn(|conn| update_product(conn, ctx.store.id, product_id, &input, ctx.now))?;
    info!(store = %ctx.store.slug, product_id, "product updated");
    redirect(&ctx.url("/admin/products"))
}

pub fn archive(state: &AppState, ctx: &StoreCtx, product_id: i64, archived: bool) -> ResultResp {
    ctx.admin()?;
    state
        .db
        .with_conn(|conn| set_archived(conn, ctx.store.id, product_id, archived, ctx.now))?;
    info!(store = %ctx.store.slug, product_id, archived, "product archive flag changed");
    redirect(&ctx.url("/admin/products"))
}

pub fn create_category_handler(req: &mut Request, state: &AppState, ctx: &StoreCtx) -> ResultResp {
    ctx.admin()?;
    let form = Form::from_body(req)?;
    let name = required_text("category name", form.str_or_empty("name"), MAX_NAME_LEN)?;
    let slug = slug_field(&form, &name)?;
    state
        .db
        .with_conn(|conn| create_category(conn, ctx.store.id, &name, &slug))?;
    redirect(&ctx.url("/admin/products"))
}
