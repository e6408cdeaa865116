// src/services/order_workflow.rs
//
// Status transitions and the bookkeeping that rides along with them:
// stock, promo-code uses, order events and customer mail.

use rusqlite::{Connection, Transaction};
use tracing::{info, warn};

use crate::db::orders::{
    find_order, insert_event, items_for_order, set_admin_note, set_item_price, set_promo,
    set_totals, update_status, Order, OrderItem,
};
use crate::db::products::adjust_stock;
use crate::db::promos::{change_uses, find_promo, find_promo_by_code, live_uses_by_user, load_scope};
use crate::db::stores::Store;
use crate::db::users::find_user_by_id;
use crate::domain::money::MAX_PRICE_CENTS;
use crate::domain::order_status::transition;
use crate::domain::pricing::{
    check_eligibility, compute_discount, has_unpriced, price_lines, PromoContext, PromoRejection,
};
use crate::domain::validate::normalize_promo_code;
use crate::domain::{Actor, OrderAction, OrderStatus, OrderTotals, PricedLine, PromoRules};
use crate::errors::ServerError;
use crate::mailer::{deliver, order_mail};
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct Transitioned {
    pub order: Order,
    pub from: OrderStatus,
    pub to: OrderStatus,
}

fn begin(conn: &mut Connection) -> Result<Transaction<'_>, ServerError> {
    conn.transaction()
        .map_err(|e| ServerError::DbError(format!("begin order update failed: {e}")))
}

fn commit(tx: Transaction<'_>) -> Result<(), ServerError> {
    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit order update failed: {e}")))
}

fn load_order(conn: &Connection, store_id: i64, order_id: i64) -> Result<Order, ServerError> {
    find_order(conn, store_id, order_id)?.ok_or(ServerError::NotFound)
}

fn priced_lines(items: &[OrderItem]) -> Vec<PricedLine> {
    items.iter().map(OrderItem::priced_line).collect()
}

fn promo_rules(conn: &Connection, order: &Order) -> Result<Option<PromoRules>, ServerError> {
    let Some(promo_id) = order.promo_code_id else {
        return Ok(None);
    };
    match find_promo(conn, order.store_id, promo_id)? {
        Some(promo) => Ok(Some(load_scope(conn, promo)?.rules())),
        None => Ok(None),
    }
}

/// Moves the order to `to` and applies every side effect of leaving `order.status`.
fn enter_status(
    tx: &Transaction<'_>,
    order: &Order,
    to: OrderStatus,
    actor: Actor,
    note: Option<&str>,
    now: i64,
) -> Result<(), ServerError> {
    let from = order.status;
    let items = items_for_order(tx, order.id)?;

    if to == OrderStatus::Accepted {
        if has_unpriced(&priced_lines(&items)) {
            return Err(ServerError::Conflict("every item needs a price first".into()));
        }
        for item in &items {
            let Some(product_id) = item.product_id else { continue };
            if !adjust_stock(tx, product_id, -item.quantity)? {
                return Err(ServerError::Conflict(format!(
                    "not enough stock for {}",
                    item.name
                )));
            }
        }
    }

    if from == OrderStatus::Accepted && to == OrderStatus::Cancelled {
        for item in &items {
            if let Some(product_id) = item.product_id {
                adjust_stock(tx, product_id, item.quantity)?;
            }
        }
    }

    if let Some(promo_id) = order.promo_code_id {
        if from.holds_promo() && !to.holds_promo() {
            change_uses(tx, promo_id, -1)?;
        }
    }

    update_status(tx, order.id, from, to, now)?;
    insert_event(tx, order.id, Some(from), to, actor.as_str(), note, now)?;
    Ok(())
}

/// Runs a customer or admin action through the transition table.
/// Customers may only act on their own orders; other orders look missing.
#[allow(clippy::too_many_arguments)]
pub fn apply_action(
    conn: &mut Connection,
    store_id: i64,
    order_id: i64,
    action: OrderAction,
    actor: Actor,
    acting_user_id: i64,
    note: Option<&str>,
    now: i64,
) -> Result<Transitioned, ServerError> {
    if action == OrderAction::Quote {
        return Err(ServerError::bad_request("a quote needs item prices"));
    }

    let tx = begin(conn)?;
    let order = load_order(&tx, store_id, order_id)?;
    if actor == Actor::Customer && order.user_id != acting_user_id {
        return Err(ServerError::NotFound);
    }

    let to = transition(order.status, action, actor)?;
    enter_status(&tx, &order, to, actor, note, now)?;
    let updated = load_order(&tx, store_id, order_id)?;
    commit(tx)?;

    info!(
        order_id,
        from = %order.status,
        to = %to,
        actor = actor.as_str(),
        "order status changed"
    );

    Ok(Transitioned {
        order: updated,
        from: order.status,
        to,
    })
}

/// Prices the special lines of an order and hands it to the customer for approval.
/// `prices` maps order item ids to unit prices in cents.
pub fn quote(
    conn: &mut Connection,
    store_id: i64,
    order_id: i64,
    prices: &[(i64, i64)],
    note: Option<&str>,
    now: i64,
) -> Result<Transitioned, ServerError> {
    let tx = begin(conn)?;
    let order = load_order(&tx, store_id, order_id)?;
    let to = transition(order.status, OrderAction::Quote, Actor::Admin)?;

    let items = items_for_order(&tx, order.id)?;
    for &(item_id, cents) in prices {
        let item = items
            .iter()
            .find(|i| i.id == item_id)
            .ok_or_else(|| ServerError::bad_request(format!("unknown order item {item_id}")))?;
        if !item.is_special {
            return Err(ServerError::bad_request(format!(
                "{} has a fixed price",
                item.name
            )));
        }
        if cents < 0 {
            return Err(ServerError::bad_request("prices cannot be negative"));
        }
        if cents > MAX_PRICE_CENTS {
            return Err(ServerError::bad_request("price too large"));
        }
        set_item_price(&tx, order.id, item_id, cents)?;
    }

    let lines = priced_lines(&items_for_order(&tx, order.id)?);
    if has_unpriced(&lines) {
        return Err(ServerError::bad_request("every item needs a price before quoting"));
    }

    let rules = promo_rules(&tx, &order)?;
    let totals = price_lines(&lines, rules.as_ref());
    set_totals(&tx, order.id, &totals, now)?;
    if let Some(note) = note {
        set_admin_note(&tx, order.id, Some(note))?;
    }

    enter_status(&tx, &order, to, Actor::Admin, note, now)?;
    let updated = load_order(&tx, store_id, order_id)?;
    commit(tx)?;

    info!(
        order_id,
        from = %order.status,
        to = %to,
        total_cents = totals.total_cents,
        "order quoted"
    );

    Ok(Transitioned {
        order: updated,
        from: order.status,
        to,
    })
}

/// Applies, replaces (`Some`) or removes (`None`) the promo code of an open order
/// and recomputes its totals. Use counts follow the code.
pub fn set_order_promo(
    conn: &mut Connection,
    store_id: i64,
    order_id: i64,
    code: Option<&str>,
    now: i64,
) -> Result<OrderTotals, ServerError> {
    let tx = begin(conn)?;
    let order = load_order(&tx, store_id, order_id)?;
    if !order.status.is_open() {
        return Err(ServerError::Conflict(format!(
            "promo codes cannot change on an order that is {}",
            order.status
        )));
    }

    let lines = priced_lines(&items_for_order(&tx, order.id)?);

    let new_promo = match code {
        Some(raw) => {
            let code = normalize_promo_code(raw)?;
            let promo = find_promo_by_code(&tx, store_id, &code)?.ok_or(PromoRejection::Unknown)?;
            let scope = load_scope(&tx, promo)?;
            let rules = scope.rules();
            if order.promo_code_id != Some(scope.promo.id) {
                let ctx = PromoContext {
                    user_id: order.user_id,
                    now,
                    prior_uses_by_user: live_uses_by_user(
                        &tx,
                        scope.promo.id,
                        order.user_id,
                        Some(order.id),
                    )?,
                };
                check_eligibility(&rules, &ctx)?;
            }
            if !has_unpriced(&lines) {
                compute_discount(&rules, &lines)?;
            }
            Some((scope.promo.id, scope.promo.code, rules))
        }
        None => None,
    };

    let new_id = new_promo.as_ref().map(|(id, _, _)| *id);
    if order.promo_code_id != new_id {
        if let Some(old) = order.promo_code_id {
            change_uses(&tx, old, -1)?;
        }
        if let Some(new) = new_id {
            change_uses(&tx, new, 1)?;
        }
        set_promo(&tx, order.id, new_id)?;
    }

    let totals = price_lines(&lines, new_promo.as_ref().map(|(_, _, rules)| rules));
    set_totals(&tx, order.id, &totals, now)?;

    let note = match &new_promo {
        Some((_, code, _)) => format!("promo code {code} applied"),
        None => "promo code removed".to_string(),
    };
    insert_event(
        &tx,
        order.id,
        Some(order.status),
        order.status,
        Actor::Admin.as_str(),
        Some(&note),
        now,
    )?;
    commit(tx)?;

    info!(order_id, promo = ?new_id, discount_cents = totals.discount_cents, "order promo updated");
    Ok(totals)
}

pub fn status_headline(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "We received your order and will confirm it shortly.",
        OrderStatus::AdminPending => "We received your order and are preparing a price for it.",
        OrderStatus::CustomerPending => "Your quote is ready. Please review and accept it.",
        OrderStatus::Accepted => "Your order has been accepted.",
        OrderStatus::Completed => "Your order is complete. Thank you!",
        OrderStatus::Cancelled => "Your order has been cancelled.",
        OrderStatus::Rejected => "Unfortunately we could not accept your order.",
    }
}

/// Mails the order's customer about its current status. Never fails the request.
pub fn notify_customer(state: &AppState, store: &Store, order: &Order) {
    let email = match state
        .db
        .with_conn(|conn| find_user_by_id(conn, order.user_id))
    {
        Ok(Some(user)) => user.email,
        Ok(None) => return,
        Err(e) => {
            warn!(order_id = order.id, error = %e, "could not look up order customer");
            return;
        }
    };
    let link = state.absolute(&format!("/s/{}/orders/{}", store.slug, order.id));
    deliver(
        state.mailer.as_ref(),
        order_mail(
            &email,
            &store.name,
            order.id,
            status_headline(order.status),
            &link,
        ),
    );
}
