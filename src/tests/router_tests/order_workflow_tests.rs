use crate::db::products::ProductInput;
use crate::tests::utils::{order_status, place_order, TestApp};

fn sofa(app: &TestApp) -> i64 {
    app.product_with(ProductInput {
        name: "Custom Sofa".into(),
        slug: "custom-sofa".into(),
        price_cents: 90000,
        stock: Some(3),
        negotiable_price: true,
        ..ProductInput::default()
    })
}

fn manual_acceptance(app: &TestApp, admin: &str) {
    let resp = app.post("/s/demo/admin/settings", Some(admin), "name=Demo+Store");
    assert_eq!(resp.status, 303);
}

#[test]
fn quote_then_customer_accepts() {
    let app = TestApp::new();
    let product = sofa(&app);
    let (_, admin) = app.sign_in("admin@example.com", true);
    let (_, customer) = app.sign_in("shopper@example.com", false);

    let order_id = place_order(&app, &customer, product, 2, None);
    assert_eq!(order_status(&app, order_id), "ADMIN_PENDING");

    let page = app.get(&format!("/s/demo/admin/orders/{order_id}"), Some(&admin));
    assert_eq!(page.status, 200);
    assert!(page.body.contains("Quote special items"));

    let item = app.query_i64("select id from order_items where order_id = ?", order_id);
    let resp = app.post(
        &format!("/s/demo/admin/orders/{order_id}/quote"),
        Some(&admin),
        &format!("price_{item}=800.00&admin_note=Best+we+can+do"),
    );
    assert_eq!(resp.status, 303);
    assert_eq!(order_status(&app, order_id), "CUSTOMER_PENDING");
    assert_eq!(app.query_i64("select total_cents from orders where id = ?", order_id), 160000);

    let resp = app.post(&format!("/s/demo/orders/{order_id}/accept-quote"), Some(&customer), "");
    assert_eq!(resp.status, 303);
    assert_eq!(order_status(&app, order_id), "ACCEPTED");
    assert_eq!(app.query_i64("select stock from products where id = ?", product), 1);

    assert_eq!(
        app.query_i64("select count(*) from order_events where order_id = ?", order_id),
        3
    );
    let history = app.get(&format!("/s/demo/orders/{order_id}"), Some(&customer));
    assert!(history.body.contains("Best we can do"));
}

#[test]
fn customer_can_ask_for_changes() {
    let app = TestApp::new();
    let product = sofa(&app);
    let (_, admin) = app.sign_in("admin@example.com", true);
    let (_, customer) = app.sign_in("shopper@example.com", false);
    let order_id = place_order(&app, &customer, product, 1, None);
    let item = app.query_i64("select id from order_items where order_id = ?", order_id);

    app.post(
        &format!("/s/demo/admin/orders/{order_id}/quote"),
        Some(&admin),
        &format!("price_{item}=850"),
    );
    let resp = app.post(
        &format!("/s/demo/orders/{order_id}/request-changes"),
        Some(&customer),
        "note=Too+expensive",
    );
    assert_eq!(resp.status, 303);
    assert_eq!(order_status(&app, order_id), "ADMIN_PENDING");
}

#[test]
fn admin_accepts_completes_and_stock_follows() {
    let app = TestApp::new();
    let lamp = app.product("Desk Lamp", 2500, Some(5));
    let (_, admin) = app.sign_in("admin@example.com", true);
    let (_, customer) = app.sign_in("shopper@example.com", false);
    manual_acceptance(&app, &admin);

    let order_id = place_order(&app, &customer, lamp, 2, None);
    assert_eq!(order_status(&app, order_id), "PENDING");
    assert_eq!(app.query_i64("select stock from products where id = ?", lamp), 5);

    // Not allowed from PENDING.
    let resp = app.post(&format!("/s/demo/admin/orders/{order_id}/complete"), Some(&admin), "");
    assert_eq!(resp.status, 409);

    app.post(&format!("/s/demo/admin/orders/{order_id}/accept"), Some(&admin), "");
    assert_eq!(order_status(&app, order_id), "ACCEPTED");
    assert_eq!(app.query_i64("select stock from products where id = ?", lamp), 3);

    app.post(&format!("/s/demo/admin/orders/{order_id}/complete"), Some(&admin), "");
    assert_eq!(order_status(&app, order_id), "COMPLETED");

    let resp = app.post(&format!("/s/demo/admin/orders/{order_id}/cancel"), Some(&admin), "");
    assert_eq!(resp.status, 409);
}

#[test]
fn cancelling_an_accepted_order_restores_stock_and_promo_use() {
    let app = TestApp::new();
    let lamp = app.product("Desk Lamp", 2500, Some(5));
    let (_, admin) = app.sign_in("admin@example.com", true);
    let (_, customer) = app.sign_in("shopper@example.com", false);
    app.post("/s/demo/admin/promos", Some(&admin), "code=FIVE&flat_off=5");

    let order_id = place_order(&app, &customer, lamp, 2, Some("five"));
    let promo = app.query_i64("select promo_code_id from orders where id = ?", order_id);
    assert_eq!(app.query_i64("select uses from promo_codes where id = ?", promo), 1);
    assert_eq!(app.query_i64("select stock from products where id = ?", lamp), 3);

    let resp = app.post(&format!("/s/demo/admin/orders/{order_id}/cancel"), Some(&admin), "");
    assert_eq!(resp.status, 303);
    assert_eq!(order_status(&app, order_id), "CANCELLED");
    assert_eq!(app.query_i64("select stock from products where id = ?", lamp), 5);
    assert_eq!(app.query_i64("select uses from promo_codes where id = ?", promo), 0);
}

#[test]
fn customers_only_see_and_touch_their_own_orders() {
    let app = TestApp::new();
    let lamp = app.product("Desk Lamp", 2500, None);
    let (_, admin) = app.sign_in("admin@example.com", true);
    let (_, alice) = app.sign_in("alice@example.com", false);
    let (_, bob) = app.sign_in("bob@example.com", false);
    manual_acceptance(&app, &admin);

    let order_id = place_order(&app, &alice, lamp, 1, None);

    assert_eq!(app.get(&format!("/s/demo/orders/{order_id}"), Some(&bob)).status, 404);
    assert_eq!(
        app.post(&format!("/s/demo/orders/{order_id}/cancel"), Some(&bob), "").status,
        404
    );
    assert!(!app.get("/s/demo/orders", Some(&bob)).body.contains(&format!("#{order_id}")));

    // Customers cannot use admin actions.
    let resp = app.post(&format!("/s/demo/admin/orders/{order_id}/accept"), Some(&alice), "");
    assert_eq!(resp.status, 403);

    let resp = app.post(&format!("/s/demo/orders/{order_id}/cancel"), Some(&alice), "");
    assert_eq!(resp.status, 303);
    assert_eq!(order_status(&app, order_id), "CANCELLED");
}

#[test]
fn admin_can_swap_the_promo_on_an_open_order() {
    let app = TestApp::new();
    let lamp = app.product("Desk Lamp", 2000, None);
    let (_, admin) = app.sign_in("admin@example.com", true);
    let (_, customer) = app.sign_in("shopper@example.com", false);
    manual_acceptance(&app, &admin);
    app.post("/s/demo/admin/promos", Some(&admin), "code=TEN&percent_off=10");
    app.post("/s/demo/admin/promos", Some(&admin), "code=HALF&percent_off=50");

    let order_id = place_order(&app, &customer, lamp, 1, Some("TEN"));
    assert_eq!(app.query_i64("select discount_cents from orders where id = ?", order_id), 200);

    let resp = app.post(&format!("/s/demo/admin/orders/{order_id}/promo"), Some(&admin), "code=half");
    assert_eq!(resp.status, 303);
    assert_eq!(app.query_i64("select discount_cents from orders where id = ?", order_id), 1000);

    app.post(&format!("/s/demo/admin/orders/{order_id}/promo"), Some(&admin), "code=");
    assert_eq!(app.query_i64("select discount_cents from orders where id = ?", order_id), 0);
    assert_eq!(app.query_i64("select total_cents from orders where id = ?", order_id), 2000);
}

#[test]
fn transitions_mail_the_customer() {
    let app = TestApp::new();
    let lamp = app.product("Desk Lamp", 2500, None);
    let (_, admin) = app.sign_in("admin@example.com", true);
    let (_, customer) = app.sign_in("shopper@example.com", false);
    manual_acceptance(&app, &admin);

    let order_id = place_order(&app, &customer, lamp, 1, None);
    let before = app.mailer.sent().len();
    app.post(&format!("/s/demo/admin/orders/{order_id}/reject"), Some(&admin), "note=Sold+out");

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), before + 1);
    assert_eq!(sent[before].to, "shopper@example.com");
    assert!(sent[before].html.contains("could not accept"));
}
