// src/services/checkout.rs
//
// Turns a user's cart into an order, all inside one transaction.

use rusqlite::Connection;
use tracing::info;

use crate::db::cart::{cart_lines, clear_cart, CartLine};
use crate::db::orders::{insert_event, insert_item, insert_order, NewOrder, NewOrderItem};
use crate::db::products::adjust_stock;
use crate::db::promos::{change_uses, find_promo_by_code, live_uses_by_user, load_scope};
use crate::db::stores::Store;
use crate::db::users::User;
use crate::domain::pricing::{check_eligibility, compute_discount, price_lines, PromoContext, PromoRejection};
use crate::domain::validate::{normalize_promo_code, optional_text, required_text, MAX_NAME_LEN, MAX_REVIEW_LEN};
use crate::domain::{Actor, OrderStatus, OrderTotals, PricedLine};
use crate::errors::ServerError;
use crate::forms::Form;

#[derive(Debug, Clone, Default)]
pub struct CheckoutInput {
    pub ship_name: String,
    pub ship_address: String,
    pub ship_city: String,
    pub ship_postal: String,
    pub ship_country: String,
    pub customer_note: Option<String>,
    pub promo_code: Option<String>,
}

impl CheckoutInput {
    pub fn from_form(form: &Form) -> Result<Self, ServerError> {
        Ok(Self {
            ship_name: required_text("name", form.str_or_empty("ship_name"), MAX_NAME_LEN)?,
            ship_address: required_text("address", form.str_or_empty("ship_address"), MAX_NAME_LEN)?,
            ship_city: required_text("city", form.str_or_empty("ship_city"), MAX_NAME_LEN)?,
            ship_postal: required_text("postal code", form.str_or_empty("ship_postal"), 32)?,
            ship_country: required_text("country", form.str_or_empty("ship_country"), MAX_NAME_LEN)?,
            customer_note: optional_text("note", form.str_or_empty("customer_note"), MAX_REVIEW_LEN)?,
            promo_code: form.get_trimmed("promo_code").map(str::to_string),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: i64,
    pub status: OrderStatus,
    pub totals: OrderTotals,
}

pub fn place_order(
    conn: &mut Connection,
    store: &Store,
    user: &User,
    input: &CheckoutInput,
    now: i64,
) -> Result<PlacedOrder, ServerError> {
    if user.is_blocked {
        return Err(ServerError::Forbidden("this account has been blocked".into()));
    }

    let tx = conn
        .transaction()
        .map_err(|e| ServerError::DbError(format!("begin checkout failed: {e}")))?;

    let lines = cart_lines(&tx, store.id, user.id)?;
    if lines.is_empty() {
        return Err(ServerError::bad_request("your cart is empty"));
    }

    for line in &lines {
        let p = &line.product;
        if p.is_archived {
            return Err(ServerError::Conflict(format!("{} is no longer available", p.name)));
        }
        if let Some(stock) = p.stock {
            if stock < line.quantity {
                return Err(ServerError::Conflict(format!(
                    "only {stock} of {} left in stock",
                    p.name
                )));
            }
        }
    }

    let priced: Vec<PricedLine> = lines.iter().map(CartLine::priced_line).collect();
    let has_special = lines.iter().any(|l| l.product.is_special());

    let promo = match input.promo_code.as_deref() {
        Some(raw) => {
            let code = normalize_promo_code(raw)?;
            let promo = find_promo_by_code(&tx, store.id, &code)?.ok_or(PromoRejection::Unknown)?;
            let scope = load_scope(&tx, promo)?;
            let rules = scope.rules();
            let ctx = PromoContext {
                user_id: user.id,
                now,
                prior_uses_by_user: live_uses_by_user(&tx, scope.promo.id, user.id, None)?,
            };
            check_eligibility(&rules, &ctx)?;
            // Special orders are discounted once the admin has quoted them.
            if !has_special {
                compute_discount(&rules, &priced)?;
            }
            Some((scope.promo.id, rules))
        }
        None => None,
    };

    let totals = price_lines(&priced, promo.as_ref().map(|(_, rules)| rules));
    let status = OrderStatus::initial(has_special, store.auto_accept_orders);

    let order_id = insert_order(
        &tx,
        &NewOrder {
            store_id: store.id,
            user_id: user.id,
            status,
            totals,
            promo_code_id: promo.as_ref().map(|(id, _)| *id),
            ship_name: &input.ship_name,
            ship_address: &input.ship_address,
            ship_city: &input.ship_city,
            ship_postal: &input.ship_postal,
            ship_country: &input.ship_country,
            customer_note: input.customer_note.as_deref(),
        },
        now,
    )?;

    for (line, priced_line) in lines.iter().zip(&priced) {
        let display = line.product.price_display();
        insert_item(
            &tx,
            order_id,
            &NewOrderItem {
                product_id: line.product.id,
                name: &line.product.name,
                quantity: line.quantity,
                list_price_cents: display.visible_cents(),
                unit_price_cents: priced_line.unit_price_cents,
                is_special: display.is_special(),
            },
        )?;
    }

    if status == OrderStatus::Accepted {
        for line in &lines {
            if !adjust_stock(&tx, line.product.id, -line.quantity)? {
                return Err(ServerError::Conflict(format!(
                    "not enough stock for {}",
                    line.product.name
                )));
            }
        }
    }

    if let Some((promo_id, _)) = &promo {
        change_uses(&tx, *promo_id, 1)?;
    }

    let actor = if status == OrderStatus::Accepted {
        Actor::System
    } else {
        Actor::Customer
    };
    insert_event(&tx, order_id, None, status, actor.as_str(), Some("order placed"), now)?;
    clear_cart(&tx, user.id)?;

    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit checkout failed: {e}")))?;

    info!(
        store = %store.slug,
        order_id,
        user_id = user.id,
        status = %status,
        total_cents = totals.total_cents,
        "order placed"
    );

    Ok(PlacedOrder {
        order_id,
        status,
        totals,
    })
}
