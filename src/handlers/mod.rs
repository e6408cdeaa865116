// src/handlers/mod.rs
//
// Request handlers for everything under `/s/{store}`.

use astra::Request;

use crate::auth::guard::{current_user, require_admin, require_user};
use crate::db::cart::cart_count;
use crate::db::stores::{find_store_by_slug, Store};
use crate::db::users::User;
use crate::errors::ServerError;
use crate::state::AppState;
use crate::templates::Chrome;
use crate::util::now_unix;

pub mod admin;
pub mod admin_catalog;
pub mod admin_moderation;
pub mod admin_orders;
pub mod admin_promos;
pub mod api;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;

/// The store a request targets and who is asking.
pub struct StoreCtx {
    pub store: Store,
    pub user: Option<User>,
    pub cart_count: i64,
    pub now: i64,
}

impl StoreCtx {
    pub fn load(req: &Request, state: &AppState, slug: &str) -> Result<Self, ServerError> {
        let now = now_unix();
        state.db.with_conn(|conn| {
            let store = find_store_by_slug(conn, slug)?.ok_or(ServerError::NotFound)?;
            let user = current_user(req, conn, &store, now)?;
            let cart_count = match &user {
                Some(u) => cart_count(conn, u.id)?,
                None => 0,
            };
            Ok(Self {
                store,
                user,
                cart_count,
                now,
            })
        })
    }

    pub fn chrome(&self) -> Chrome<'_> {
        Chrome {
            store: &self.store,
            user: self.user.as_ref(),
            cart_count: self.cart_count,
        }
    }

    pub fn user(&self) -> Result<User, ServerError> {
        require_user(self.user.clone())
    }

    pub fn admin(&self) -> Result<User, ServerError> {
        require_admin(self.user.clone())
    }

    /// Store-relative path, e.g. `url("/cart")` -> `/s/demo/cart`.
    pub fn url(&self, rest: &str) -> String {
        format!("/s/{}{}", self.store.slug, rest)
    }
}
