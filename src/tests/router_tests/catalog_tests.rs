use crate::db::products::ProductInput;
use crate::tests::utils::TestApp;

#[test]
fn home_lists_stores_and_health_check_answers() {
    let app = TestApp::new();

    let home = app.get("/", None);
    assert_eq!(home.status, 200);
    assert!(home.body.contains("Demo Store"));
    assert!(home.body.contains("/s/demo"));

    let health = app.get("/healthz", None);
    assert_eq!(health.status, 200);
    assert_eq!(health.body, "ok");
}

#[test]
fn unknown_store_and_route_are_not_found() {
    let app = TestApp::new();
    assert_eq!(app.get("/s/nope", None).status, 404);
    assert_eq!(app.get("/s/demo/no-such-page", None).status, 404);
    assert_eq!(app.get("/nowhere", None).status, 404);
}

#[test]
fn catalog_shows_active_products_with_their_price_display() {
    let app = TestApp::new();
    app.product("Desk Lamp", 2499, Some(4));
    app.product_with(ProductInput {
        name: "Custom Sofa".into(),
        slug: "custom-sofa".into(),
        price_cents: 90000,
        hide_price: true,
        ..ProductInput::default()
    });
    app.product_with(ProductInput {
        name: "Vintage Rug".into(),
        slug: "vintage-rug".into(),
        price_cents: 15000,
        negotiable_price: true,
        ..ProductInput::default()
    });

    let resp = app.get("/s/demo", None);
    assert_eq!(resp.status, 200);
    assert!(resp.body.contains("Desk Lamp"));
    assert!(resp.body.contains("$24.99"));
    assert!(resp.body.contains("Price on request"));
    assert!(!resp.body.contains("$900.00"));
    assert!(resp.body.contains("negotiable"));
}

#[test]
fn search_filters_the_catalog() {
    let app = TestApp::new();
    app.product("Desk Lamp", 2499, None);
    app.product("Oak Table", 12900, None);

    let resp = app.get("/s/demo?q=lamp", None);
    assert_eq!(resp.status, 200);
    assert!(resp.body.contains("Desk Lamp"));
    assert!(!resp.body.contains("Oak Table"));
}

#[test]
fn product_page_invites_sign_in_when_signed_out() {
    let app = TestApp::new();
    app.product("Desk Lamp", 2499, Some(3));

    let resp = app.get("/s/demo/products/desk-lamp", None);
    assert_eq!(resp.status, 200);
    assert!(resp.body.contains("Sign in to order"));

    let (_, token) = app.sign_in("shopper@example.com", false);
    let resp = app.get("/s/demo/products/desk-lamp", Some(&token));
    assert!(resp.body.contains("Add to cart"));
}

#[test]
fn archived_products_disappear() {
    let app = TestApp::new();
    let id = app.product("Old Chair", 5000, None);
    let (_, admin) = app.sign_in("admin@example.com", true);

    let resp = app.post(&format!("/s/demo/admin/products/{id}/archive"), Some(&admin), "");
    assert_eq!(resp.status, 303);

    assert_eq!(app.get("/s/demo/products/old-chair", None).status, 404);
    assert!(!app.get("/s/demo", None).body.contains("Old Chair"));
}
