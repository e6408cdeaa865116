use crate::tests::utils::{token_from_link, TestApp};

fn session_from(set_cookie: &str) -> String {
    set_cookie
        .strip_prefix("session=")
        .and_then(|rest| rest.split(';').next())
        .unwrap()
        .to_string()
}

/// Requests a link for `email`, follows it and returns the session token.
fn sign_in_by_link(app: &TestApp, email: &str) -> String {
    let resp = app.post("/s/demo/auth/request-link", None, &format!("email={email}"));
    assert_eq!(resp.status, 200);

    let mail = app.mailer.sent().pop().unwrap();
    let token = token_from_link(&mail.html);
    let resp = app.get(&format!("/s/demo/auth/magic?token={token}"), None);
    assert_eq!(resp.status, 303);
    session_from(resp.set_cookie.as_deref().unwrap())
}

#[test]
fn login_page_loads_successfully() {
    let app = TestApp::new();
    let resp = app.get("/s/demo/login", None);

    assert_eq!(resp.status, 200);
    assert!(resp.body.contains("Sign in"));
    assert!(resp.body.contains("/s/demo/auth/request-link"));
}

#[test]
fn request_link_returns_partial_html_for_htmx() {
    let app = TestApp::new();
    let resp = app.post("/s/demo/auth/request-link", None, "email=Test%40Example.com");

    assert_eq!(resp.status, 200);
    assert!(resp.body.contains("Check your email"));
    assert!(resp.body.contains("test@example.com"));
    assert!(!resp.body.contains("<html"));

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "test@example.com");
    assert!(sent[0].html.contains("http://shop.test/s/demo/auth/magic?token="));
}

#[test]
fn invalid_email_is_rejected() {
    let app = TestApp::new();
    let resp = app.post("/s/demo/auth/request-link", None, "email=not-an-email");
    assert_eq!(resp.status, 400);
    assert!(app.mailer.sent().is_empty());
}

#[test]
fn magic_link_signs_in_once() {
    let app = TestApp::new();
    app.post("/s/demo/auth/request-link", None, "email=a%40b.com");
    let token = token_from_link(&app.mailer.sent()[0].html);

    let resp = app.get(&format!("/s/demo/auth/magic?token={token}"), None);
    assert_eq!(resp.status, 303);
    assert_eq!(resp.location.as_deref(), Some("/s/demo"));
    let cookie = resp.set_cookie.unwrap();
    assert!(cookie.contains("Path=/s/demo"));
    assert!(cookie.contains("HttpOnly"));

    let session = session_from(&cookie);
    assert_eq!(app.get("/s/demo/orders", Some(&session)).status, 200);

    // Second use: treated as signed out.
    let again = app.get(&format!("/s/demo/auth/magic?token={token}"), None);
    assert_eq!(again.status, 303);
    assert_eq!(again.location.as_deref(), Some("/s/demo/login"));
}

#[test]
fn configured_admin_email_gets_the_dashboard() {
    let app = TestApp::new();
    let session = sign_in_by_link(&app, "owner%40example.com");
    let resp = app.get("/s/demo/admin", Some(&session));
    assert_eq!(resp.status, 200);
    assert!(resp.body.contains("Admin Dashboard"));
}

#[test]
fn logout_revokes_the_session() {
    let app = TestApp::new();
    let session = sign_in_by_link(&app, "c%40d.com");

    let resp = app.post("/s/demo/logout", Some(&session), "");
    assert_eq!(resp.status, 303);
    assert!(resp.set_cookie.unwrap().contains("Max-Age=0"));

    let cart = app.get("/s/demo/cart", Some(&session));
    assert_eq!(cart.status, 303);
    assert_eq!(cart.location.as_deref(), Some("/s/demo/login"));
}

#[test]
fn sessions_do_not_cross_stores() {
    let app = TestApp::new();
    let (_, token) = app.sign_in("shopper@example.com", false);
    app.state
        .db
        .with_conn(|conn| crate::db::stores::create_store(conn, "other", "Other", "EUR", 0))
        .unwrap();

    assert_eq!(app.get("/s/demo/cart", Some(&token)).status, 200);
    let other = app.get("/s/other/cart", Some(&token));
    assert_eq!(other.status, 303);
    assert_eq!(other.location.as_deref(), Some("/s/other/login"));
}
