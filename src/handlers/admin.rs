// src/handlers/admin.rs
use astra::Request;
use tracing::info;

use crate::db::orders::{revenue_since, status_counts};
use crate::db::reviews::pending_count;
use crate::db::stores::update_store_settings;
use crate::domain::validate::{required_text, MAX_NAME_LEN};
use crate::domain::OrderStatus;
use crate::forms::Form;
use crate::handlers::StoreCtx;
use crate::responses::{html_response, redirect, ResultResp};
use crate::state::AppState;
use crate::templates::pages::{admin_dashboard_page, DashboardVm};
use crate::util::start_of_month;

pub fn dashboard(state: &AppState, ctx: &StoreCtx) -> ResultResp {
    ctx.admin()?;
    let vm = state.db.with_conn(|conn| {
        let status_counts = status_counts(conn, ctx.store.id)?;
        let awaiting_admin = status_counts
            .iter()
            .filter(|(s, _)| matches!(s, OrderStatus::Pending | OrderStatus::AdminPending))
            .map(|(_, n)| n)
            .sum();
        Ok(DashboardVm {
            status_counts,
            awaiting_admin,
            pending_reviews: pending_count(conn, ctx.store.id)?,
            revenue_this_month_cents: revenue_since(conn, ctx.store.id, start_of_month(ctx.now))?,
        })
    })?;
    html_response(admin_dashboard_page(&ctx.chrome(), &vm))
}

pub fn settings(req: &mut Request, state: &AppState, ctx: &StoreCtx) -> ResultResp {
    let admin = ctx.admin()?;
    let form = Form::from_body(req)?;
    let name = required_text("store name", form.str_or_empty("name"), MAX_NAME_LEN)?;
    let auto_accept = form.checkbox("auto_accept_orders");

    state
        .db
        .with_conn(|conn| update_store_settings(conn, ctx.store.id, &name, auto_accept))?;
    info!(store = %ctx.store.slug, admin_id = admin.id, auto_accept, "store settings updated");
    redirect(&ctx.url("/admin"))
}
