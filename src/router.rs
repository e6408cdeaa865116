use crate::domain::validate::parse_id;
use crate::errors::ServerError;
use crate::handlers::{
    admin, admin_catalog, admin_moderation, admin_orders, admin_promos, api, auth, cart, catalog,
    orders, StoreCtx,
};
use crate::responses::{text_response, ResultResp};
use crate::services::reviews::Moderation;
use crate::state::AppState;
use astra::Request;

pub fn handle(mut req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method.as_str(), segments.as_slice()) {
        ("GET", []) => catalog::stores_index(state),
        ("GET", ["healthz"]) => text_response(200, "ok"),
        (_, ["s", slug, rest @ ..]) => {
            let ctx = StoreCtx::load(&req, state, slug)?;
            store_route(&mut req, state, &ctx, method.as_str(), rest)
        }
        _ => Err(ServerError::NotFound),
    }
}

/// Routes below `/s/{store}`.
fn store_route(
    req: &mut Request,
    state: &AppState,
    ctx: &StoreCtx,
    method: &str,
    rest: &[&str],
) -> ResultResp {
    match (method, rest) {
        // Catalog
        ("GET", []) => catalog::catalog(req, state, ctx),
        ("GET", ["products", slug]) => catalog::product_detail(state, ctx, slug),
        ("POST", ["products", slug, "reviews"]) => catalog::post_review(req, state, ctx, slug),

        // Sign-in
        ("GET", ["login"]) => auth::login_form(ctx),
        ("POST", ["auth", "request-link"]) => auth::request_link(req, state, ctx),
        ("GET", ["auth", "magic"]) => auth::redeem_link(req, state, ctx),
        ("POST", ["logout"]) => auth::logout(req, state, ctx),

        // Cart and checkout
        ("GET", ["cart"]) => cart::view_cart(state, ctx),
        ("POST", ["cart", "add"]) => cart::add(req, state, ctx),
        ("POST", ["cart", id, "update"]) => cart::update(req, state, ctx, parse_id(id)?),
        ("POST", ["cart", id, "remove"]) => cart::remove(state, ctx, parse_id(id)?),
        ("POST", ["checkout"]) => cart::checkout(req, state, ctx),

        // Customer orders
        ("GET", ["orders"]) => orders::my_orders(state, ctx),
        ("GET", ["orders", id]) => orders::my_order(state, ctx, parse_id(id)?),
        ("POST", ["orders", id, action]) => {
            let action = orders::customer_action_from_path(action).ok_or(ServerError::NotFound)?;
            orders::customer_action(req, state, ctx, parse_id(id)?, action)
        }

        // JSON API
        ("GET", ["api", "products"]) => api::products(req, state, ctx),
        ("GET", ["api", "products", slug]) => api::product(state, ctx, slug),
        ("GET", ["api", "orders"]) => api::orders(state, ctx),
        ("GET", ["api", "orders", id]) => api::order(state, ctx, parse_id(id)?),

        ("GET" | "POST", ["admin", admin_rest @ ..]) => admin_route(req, state, ctx, method, admin_rest),

        _ => Err(ServerError::NotFound),
    }
}

/// Routes below `/s/{store}/admin`. Every handler checks the admin role itself.
fn admin_route(
    req: &mut Request,
    state: &AppState,
    ctx: &StoreCtx,
    method: &str,
    rest: &[&str],
) -> ResultResp {
    match (method, rest) {
        ("GET", []) => admin::dashboard(state, ctx),
        ("POST", ["settings"]) => admin::settings(req, state, ctx),

        // Products and categories
        ("GET", ["products"]) => admin_catalog::products(state, ctx),
        ("GET", ["products", "new"]) => admin_catalog::new_product(state, ctx),
        ("POST", ["products"]) => admin_catalog::create(req, state, ctx),
        ("GET", ["products", id]) => admin_catalog::edit_product(state, ctx, parse_id(id)?),
        ("POST", ["products", id]) => admin_catalog::update(req, state, ctx, parse_id(id)?),
        ("POST", ["products", id, "archive"]) => admin_catalog::archive(state, ctx, parse_id(id)?, true),
        ("POST", ["products", id, "unarchive"]) => {
            admin_catalog::archive(state, ctx, parse_id(id)?, false)
        }
        ("POST", ["categories"]) => admin_catalog::create_category_handler(req, state, ctx),

        // Orders
        ("GET", ["orders"]) => admin_orders::list(req, state, ctx),
        ("GET", ["orders", "export.xlsx"]) => admin_orders::export(req, state, ctx),
        ("GET", ["orders", id]) => admin_orders::detail(state, ctx, parse_id(id)?),
        ("POST", ["orders", id, "quote"]) => admin_orders::submit_quote(req, state, ctx, parse_id(id)?),
        ("POST", ["orders", id, "promo"]) => admin_orders::promo(req, state, ctx, parse_id(id)?),
        ("POST", ["orders", id, action]) => {
            let action = admin_orders::admin_action_from_path(action).ok_or(ServerError::NotFound)?;
            admin_orders::action(req, state, ctx, parse_id(id)?, action)
        }

        // Promo codes
        ("GET", ["promos"]) => admin_promos::list(state, ctx),
        ("POST", ["promos"]) => admin_promos::create(req, state, ctx),
        ("GET", ["promos", id]) => admin_promos::detail(state, ctx, parse_id(id)?),
        ("POST", ["promos", id, "toggle"]) => admin_promos::toggle(state, ctx, parse_id(id)?),
        ("POST", ["promos", id, "users"]) => admin_promos::allow_user(req, state, ctx, parse_id(id)?),
        ("POST", ["promos", id, "users", user_id, "remove"]) => {
            admin_promos::disallow_user(state, ctx, parse_id(id)?, parse_id(user_id)?)
        }
        ("POST", ["promos", id, "exclusions"]) => {
            admin_promos::exclude_product(req, state, ctx, parse_id(id)?)
        }
        ("POST", ["promos", id, "exclusions", product_id, "remove"]) => {
            admin_promos::include_product(state, ctx, parse_id(id)?, parse_id(product_id)?)
        }

        // Moderation
        ("GET", ["reviews"]) => admin_moderation::reviews(req, state, ctx),
        ("POST", ["reviews", id, action]) => {
            let action = Moderation::parse(action).ok_or(ServerError::NotFound)?;
            admin_moderation::moderate(state, ctx, parse_id(id)?, action)
        }
        ("GET", ["users"]) => admin_moderation::users(state, ctx),
        ("POST", ["users", id, action]) => {
            let action = admin_moderation::UserAction::parse(action).ok_or(ServerError::NotFound)?;
            admin_moderation::user_action(state, ctx, parse_id(id)?, action)
        }

        _ => Err(ServerError::NotFound),
    }
}
