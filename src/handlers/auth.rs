// src/handlers/auth.rs
use astra::Request;
use tracing::info;

use crate::auth::guard::session_token;
use crate::auth::magic::{MagicLinkConfig, MagicLinkService};
use crate::auth::sessions::{create_session, revoke_session};
use crate::forms::Form;
use crate::handlers::StoreCtx;
use crate::mailer::{deliver, magic_link_mail};
use crate::responses::html::{clear_session_cookie, session_cookie};
use crate::responses::{html_response, redirect, redirect_with_cookie, ResultResp};
use crate::state::AppState;
use crate::templates::pages::{check_email_content, login_page};

fn magic_service(state: &AppState) -> MagicLinkService {
    MagicLinkService::new(MagicLinkConfig {
        ttl_secs: state.config.magic_link_ttl_secs,
        admin_emails: state.config.admin_emails.clone(),
    })
}

pub fn login_form(ctx: &StoreCtx) -> ResultResp {
    if ctx.user.is_some() {
        return redirect(&ctx.url(""));
    }
    html_response(login_page(&ctx.chrome()))
}

pub fn request_link(req: &mut Request, state: &AppState, ctx: &StoreCtx) -> ResultResp {
    let form = Form::from_body(req)?;
    let email = form.required("email")?;
    let service = magic_service(state);

    let issued = state
        .db
        .with_conn(|conn| service.request_link(conn, &ctx.store, email, ctx.now))?;

    info!(store = %ctx.store.slug, user_id = issued.user_id, "magic link issued");
    deliver(
        state.mailer.as_ref(),
        magic_link_mail(&issued.email, &ctx.store.name, &state.absolute(&issued.link)),
    );

    html_response(check_email_content(&issued.email, &ctx.store.slug))
}

pub fn redeem_link(req: &Request, state: &AppState, ctx: &StoreCtx) -> ResultResp {
    let query = Form::from_query(req);
    let token = query.str_or_empty("token");
    let service = magic_service(state);
    let ttl = state.config.session_ttl_secs;

    let session = state.db.with_conn(|conn| {
        let redeemed = service.redeem(conn, &ctx.store, token, ctx.now)?;
        info!(store = %ctx.store.slug, user_id = redeemed.user_id, "signed in");
        create_session(conn, redeemed.user_id, ctx.now, ttl)
    })?;

    redirect_with_cookie(&ctx.url(""), session_cookie(&ctx.store.slug, &session, ttl))
}

pub fn logout(req: &Request, state: &AppState, ctx: &StoreCtx) -> ResultResp {
    if let Some(token) = session_token(req) {
        state
            .db
            .with_conn(|conn| revoke_session(conn, &token, ctx.now))?;
    }
    redirect_with_cookie(&ctx.url(""), clear_session_cookie(&ctx.store.slug))
}

