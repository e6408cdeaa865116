use crate::auth::sessions::create_session;
use crate::config::Config;
use crate::db::connection::init_db;
use crate::db::products::{create_product, ProductInput};
use crate::db::stores::{find_store_by_slug, Store};
use crate::db::users::{get_or_create_user, set_admin};
use crate::mailer::LogMailer;
use crate::responses::error_to_response;
use crate::router::handle;
use crate::state::AppState;
use crate::util::now_unix;
use astra::Body;
use http::{Method, Request};
use std::env;
use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static NEXT_DB: AtomicUsize = AtomicUsize::new(0);

/// A fresh database file with the production schema, plus a mailer that keeps what it sends.
pub struct TestApp {
    pub state: AppState,
    pub mailer: Arc<LogMailer>,
    db_path: PathBuf,
}

pub struct TestResponse {
    pub status: u16,
    pub location: Option<String>,
    pub set_cookie: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl TestApp {
    pub fn new() -> Self {
        let db_path = env::temp_dir().join(format!(
            "storefront_test_{}_{}.sqlite3",
            std::process::id(),
            NEXT_DB.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = std::fs::remove_file(&db_path);

        let config = Config {
            database_path: db_path.to_string_lossy().into_owned(),
            base_url: "http://shop.test".to_string(),
            admin_emails: vec!["owner@example.com".to_string()],
            ..Config::default()
        };
        let mailer = Arc::new(LogMailer::default());
        let state = AppState::new(config).with_mailer(mailer.clone());

        init_db(&state.db, "sql/schema.sql")
            .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

        Self {
            state,
            mailer,
            db_path,
        }
    }

    pub fn store(&self) -> Store {
        self.state
            .db
            .with_conn(|conn| find_store_by_slug(conn, "demo"))
            .unwrap()
            .unwrap()
    }

    /// Creates (or reuses) a demo-store user and returns its id and a live session token.
    pub fn sign_in(&self, email: &str, admin: bool) -> (i64, String) {
        let store = self.store();
        let now = now_unix();
        self.state
            .db
            .with_conn(|conn| {
                let id = get_or_create_user(conn, store.id, email, now)?;
                if admin {
                    set_admin(conn, store.id, id, true)?;
                }
                let token = create_session(conn, id, now, 3600)?;
                Ok((id, token))
            })
            .unwrap()
    }

    pub fn product(&self, name: &str, price_cents: i64, stock: Option<i64>) -> i64 {
        self.product_with(ProductInput {
            name: name.to_string(),
            slug: crate::domain::validate::slugify(name),
            price_cents,
            stock,
            ..ProductInput::default()
        })
    }

    pub fn product_with(&self, input: ProductInput) -> i64 {
        let store = self.store();
        self.state
            .db
            .with_conn(|conn| create_product(conn, store.id, &input, now_unix()))
            .unwrap()
    }

    pub fn query_i64(&self, sql: &str, id: i64) -> i64 {
        self.state
            .db
            .with_conn(|conn| {
                conn.query_row(sql, [id], |r| r.get(0))
                    .map_err(|e| crate::errors::ServerError::DbError(e.to_string()))
            })
            .unwrap()
    }

    pub fn query_string(&self, sql: &str, id: i64) -> String {
        self.state
            .db
            .with_conn(|conn| {
                conn.query_row(sql, [id], |r| r.get(0))
                    .map_err(|e| crate::errors::ServerError::DbError(e.to_string()))
            })
            .unwrap()
    }

    pub fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, "")
    }

    pub fn post(&self, uri: &str, token: Option<&str>, form: &str) -> TestResponse {
        self.send(Method::POST, uri, token, form)
    }

    pub fn get_bearer(&self, uri: &str, token: &str) -> TestResponse {
        let req = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        self.run(req)
    }

    fn send(&self, method: Method, uri: &str, token: Option<&str>, form: &str) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/x-www-form-urlencoded");
        if let Some(token) = token {
            builder = builder.header("Cookie", format!("session={token}"));
        }
        let req = builder.body(Body::from(form.to_string())).unwrap();
        self.run(req)
    }

    /// Runs the request through the router the way the server does, errors included.
    pub fn run(&self, req: astra::Request) -> TestResponse {
        let path = req.uri().path().to_string();
        let resp = match handle(req, &self.state) {
            Ok(resp) => resp,
            Err(err) => error_to_response(err, &path),
        };

        let header = |name: &str| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let status = resp.status().as_u16();
        let location = header("Location");
        let set_cookie = header("Set-Cookie");
        let content_type = header("Content-Type");

        let mut body = String::new();
        let mut bytes = Vec::new();
        resp.into_body().reader().read_to_end(&mut bytes).unwrap();
        if let Ok(text) = String::from_utf8(bytes) {
            body = text;
        }

        TestResponse {
            status,
            location,
            set_cookie,
            content_type,
            body,
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
    }
}

/// Value of the `token` query parameter in a sign-in link.
pub fn token_from_link(link: &str) -> String {
    link.split("token=")
        .nth(1)
        .map(|t| t.split(['&', '"', '<']).next().unwrap_or(t).to_string())
        .unwrap()
}

pub const SHIPPING: &str =
    "ship_name=Ada+Lovelace&ship_address=1+Main+St&ship_city=London&ship_postal=N1&ship_country=UK";

/// Adds `quantity` of a product to the cart and checks out; returns the new order id.
pub fn place_order(app: &TestApp, token: &str, product_id: i64, quantity: i64, promo: Option<&str>) -> i64 {
    let added = app.post(
        "/s/demo/cart/add",
        Some(token),
        &format!("product_id={product_id}&quantity={quantity}"),
    );
    assert_eq!(added.status, 303, "add to cart failed: {}", added.body);

    let form = match promo {
        Some(code) => format!("{SHIPPING}&promo_code={code}"),
        None => SHIPPING.to_string(),
    };
    let resp = app.post("/s/demo/checkout", Some(token), &form);
    assert_eq!(resp.status, 303, "checkout failed: {}", resp.body);
    order_id_from(resp.location.as_deref().unwrap())
}

pub fn order_id_from(location: &str) -> i64 {
    location
        .rsplit('/')
        .next()
        .and_then(|id| id.parse().ok())
        .unwrap_or_else(|| panic!("no order id in {location}"))
}

pub fn order_status(app: &TestApp, order_id: i64) -> String {
    app.query_string("select status from orders where id = ?", order_id)
}
