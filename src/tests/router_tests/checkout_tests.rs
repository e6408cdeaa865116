use crate::db::products::ProductInput;
use crate::tests::utils::{order_status, place_order, TestApp, SHIPPING};

#[test]
fn cart_requires_sign_in() {
    let app = TestApp::new();
    let resp = app.get("/s/demo/cart", None);
    assert_eq!(resp.status, 303);
    assert_eq!(resp.location.as_deref(), Some("/s/demo/login"));
}

#[test]
fn cart_lines_merge_update_and_remove() {
    let app = TestApp::new();
    let lamp = app.product("Desk Lamp", 2500, None);
    let (user, token) = app.sign_in("shopper@example.com", false);

    for _ in 0..2 {
        let resp = app.post("/s/demo/cart/add", Some(&token), &format!("product_id={lamp}&quantity=2"));
        assert_eq!(resp.status, 303);
        assert_eq!(resp.location.as_deref(), Some("/s/demo/cart"));
    }
    let line = app.query_i64("select id from cart_items where user_id = ?", user);
    assert_eq!(app.query_i64("select quantity from cart_items where id = ?", line), 4);

    let cart = app.get("/s/demo/cart", Some(&token));
    assert_eq!(cart.status, 200);
    assert!(cart.body.contains("Desk Lamp"));
    assert!(cart.body.contains("$100.00"));

    app.post(&format!("/s/demo/cart/{line}/update"), Some(&token), "quantity=1");
    assert_eq!(app.query_i64("select quantity from cart_items where id = ?", line), 1);

    app.post(&format!("/s/demo/cart/{line}/remove"), Some(&token), "");
    assert_eq!(
        app.query_i64("select count(*) from cart_items where user_id = ?", user),
        0
    );
}

#[test]
fn standard_checkout_is_auto_accepted_and_takes_stock() {
    let app = TestApp::new();
    let lamp = app.product("Desk Lamp", 2500, Some(5));
    let (user, token) = app.sign_in("shopper@example.com", false);

    let order_id = place_order(&app, &token, lamp, 2, None);

    assert_eq!(order_status(&app, order_id), "ACCEPTED");
    assert_eq!(app.query_i64("select total_cents from orders where id = ?", order_id), 5000);
    assert_eq!(app.query_i64("select stock from products where id = ?", lamp), 3);
    assert_eq!(
        app.query_i64("select count(*) from cart_items where user_id = ?", user),
        0
    );

    let mails = app.mailer.sent();
    let last = mails.last().unwrap();
    assert_eq!(last.to, "shopper@example.com");
    assert!(last.subject.contains(&format!("order #{order_id}")));

    let page = app.get(&format!("/s/demo/orders/{order_id}"), Some(&token));
    assert_eq!(page.status, 200);
    assert!(page.body.contains("Ada Lovelace"));
}

#[test]
fn special_items_wait_for_a_quote() {
    let app = TestApp::new();
    let sofa = app.product_with(ProductInput {
        name: "Custom Sofa".into(),
        slug: "custom-sofa".into(),
        price_cents: 90000,
        stock: Some(2),
        hide_price: true,
        ..ProductInput::default()
    });
    let (_, token) = app.sign_in("shopper@example.com", false);

    let order_id = place_order(&app, &token, sofa, 1, None);

    assert_eq!(order_status(&app, order_id), "ADMIN_PENDING");
    assert_eq!(app.query_i64("select stock from products where id = ?", sofa), 2);
    let page = app.get(&format!("/s/demo/orders/{order_id}"), Some(&token));
    assert!(page.body.contains("to be quoted"));
}

#[test]
fn empty_cart_cannot_check_out() {
    let app = TestApp::new();
    let (_, token) = app.sign_in("shopper@example.com", false);
    assert_eq!(app.post("/s/demo/checkout", Some(&token), SHIPPING).status, 400);
}

#[test]
fn missing_shipping_fields_are_rejected() {
    let app = TestApp::new();
    let lamp = app.product("Desk Lamp", 2500, None);
    let (_, token) = app.sign_in("shopper@example.com", false);
    app.post("/s/demo/cart/add", Some(&token), &format!("product_id={lamp}"));

    let resp = app.post("/s/demo/checkout", Some(&token), "ship_name=Ada");
    assert_eq!(resp.status, 400);
}

#[test]
fn insufficient_stock_is_a_conflict() {
    let app = TestApp::new();
    let lamp = app.product("Desk Lamp", 2500, Some(1));
    let (_, token) = app.sign_in("shopper@example.com", false);
    app.post("/s/demo/cart/add", Some(&token), &format!("product_id={lamp}&quantity=3"));

    let resp = app.post("/s/demo/checkout", Some(&token), SHIPPING);
    assert_eq!(resp.status, 409);
    assert_eq!(app.query_i64("select stock from products where id = ?", lamp), 1);
}

#[test]
fn promo_code_discounts_the_order() {
    let app = TestApp::new();
    let lamp = app.product("Desk Lamp", 2000, None);
    let (_, admin) = app.sign_in("admin@example.com", true);
    let (_, token) = app.sign_in("shopper@example.com", false);

    let created = app.post("/s/demo/admin/promos", Some(&admin), "code=save10&percent_off=10");
    assert_eq!(created.status, 303);

    let order_id = place_order(&app, &token, lamp, 1, Some("save10"));
    assert_eq!(app.query_i64("select discount_cents from orders where id = ?", order_id), 200);
    assert_eq!(app.query_i64("select total_cents from orders where id = ?", order_id), 1800);

    let promo = app.query_i64("select promo_code_id from orders where id = ?", order_id);
    assert_eq!(app.query_i64("select uses from promo_codes where id = ?", promo), 1);
}

#[test]
fn unknown_promo_code_is_rejected() {
    let app = TestApp::new();
    let lamp = app.product("Desk Lamp", 2000, None);
    let (_, token) = app.sign_in("shopper@example.com", false);
    app.post("/s/demo/cart/add", Some(&token), &format!("product_id={lamp}"));

    let resp = app.post("/s/demo/checkout", Some(&token), &format!("{SHIPPING}&promo_code=NOPE"));
    assert_eq!(resp.status, 400);
}
