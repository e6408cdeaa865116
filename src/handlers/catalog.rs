// src/handlers/catalog.rs
use astra::Request;

use crate::db::orders::has_purchased;
use crate::db::products::{
    find_category, find_product_by_slug, list_categories, list_products, ProductQuery, ProductSort,
};
use crate::db::reviews::{approved_for_product, find_user_review, rating_summary};
use crate::db::stores::list_stores;
use crate::errors::ServerError;
use crate::forms::Form;
use crate::handlers::StoreCtx;
use crate::responses::{html_response, redirect, ResultResp};
use crate::services::reviews::submit_review;
use crate::state::AppState;
use crate::templates::pages::{catalog_page, product_page, stores_page, CatalogVm, ProductVm};

pub fn stores_index(state: &AppState) -> ResultResp {
    let stores = state.db.with_conn(|conn| list_stores(conn))?;
    html_response(stores_page(&stores))
}

/// Catalog filters from a query string; the JSON listing accepts the same ones.
pub fn product_query(form: &Form) -> ProductQuery {
    ProductQuery {
        search: form.get_trimmed("q").map(str::to_string),
        category_slug: form.get_trimmed("category").map(str::to_string),
        sort: ProductSort::parse(form.get_trimmed("sort")),
        page: form
            .get_trimmed("page")
            .and_then(|p| p.parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1),
        include_archived: false,
    }
}

/// Filters as a query string without `page`, for pagination links.
fn filter_query(query: &ProductQuery) -> String {
    let mut ser = url::form_urlencoded::Serializer::new(String::new());
    if let Some(q) = &query.search {
        ser.append_pair("q", q);
    }
    if let Some(c) = &query.category_slug {
        ser.append_pair("category", c);
    }
    if query.sort != ProductSort::default() {
        ser.append_pair("sort", query.sort.as_str());
    }
    ser.finish()
}

pub fn catalog(req: &Request, state: &AppState, ctx: &StoreCtx) -> ResultResp {
    let query = product_query(&Form::from_query(req));
    let (page, categories) = state.db.with_conn(|conn| {
        Ok((
            list_products(conn, ctx.store.id, &query)?,
            list_categories(conn, ctx.store.id)?,
        ))
    })?;

    html_response(catalog_page(
        &ctx.chrome(),
        &CatalogVm {
            page: &page,
            categories: &categories,
            query: &query,
            filter_query: filter_query(&query),
        },
    ))
}

pub fn product_detail(state: &AppState, ctx: &StoreCtx, slug: &str) -> ResultResp {
    let user_id = ctx.user.as_ref().map(|u| u.id);

    let (product, category, reviews, summary, can_review, own_review) =
        state.db.with_conn(|conn| {
            let product = find_product_by_slug(conn, ctx.store.id, slug)?
                .filter(|p| !p.is_archived)
                .ok_or(ServerError::NotFound)?;
            let category = match product.category_id {
                Some(id) => find_category(conn, ctx.store.id, id)?,
                None => None,
            };
            let reviews = approved_for_product(conn, product.id)?;
            let summary = rating_summary(conn, product.id)?;
            let (can_review, own_review) = match user_id {
                Some(uid) => (
                    has_purchased(conn, uid, product.id)?,
                    find_user_review(conn, product.id, uid)?,
                ),
                None => (false, None),
            };
            Ok((product, category, reviews, summary, can_review, own_review))
        })?;

    html_response(product_page(
        &ctx.chrome(),
        &ProductVm {
            product: &product,
            category: category.as_ref(),
            reviews: &reviews,
            summary,
            can_review,
            own_review: own_review.as_ref(),
        },
    ))
}

pub fn post_review(req: &mut Request, state: &AppState, ctx: &StoreCtx, slug: &str) -> ResultResp {
    let user = ctx.user()?;
    let form = Form::from_body(req)?;

    state.db.with_conn(|conn| {
        let product = find_product_by_slug(conn, ctx.store.id, slug)?.ok_or(ServerError::NotFound)?;
        submit_review(
            conn,
            ctx.store.id,
            &user,
            product.id,
            form.str_or_empty("rating"),
            form.str_or_empty("body"),
            ctx.now,
        )
    })?;

    redirect(&ctx.url(&format!("/products/{slug}")))
}
