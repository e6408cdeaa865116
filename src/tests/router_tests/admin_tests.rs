use crate::tests::utils::{order_status, place_order, TestApp};

#[test]
fn admin_area_requires_an_admin() {
    let app = TestApp::new();
    let (_, customer) = app.sign_in("shopper@example.com", false);
    let (_, admin) = app.sign_in("admin@example.com", true);

    let anonymous = app.get("/s/demo/admin", None);
    assert_eq!(anonymous.status, 303);
    assert_eq!(anonymous.location.as_deref(), Some("/s/demo/login"));

    assert_eq!(app.get("/s/demo/admin", Some(&customer)).status, 403);
    assert_eq!(app.get("/s/demo/admin/orders", Some(&customer)).status, 403);

    let resp = app.get("/s/demo/admin", Some(&admin));
    assert_eq!(resp.status, 200);
    assert!(resp.body.contains("Admin Dashboard"));
}

#[test]
fn dashboard_shows_queue_and_month_revenue() {
    let app = TestApp::new();
    let lamp = app.product("Desk Lamp", 2500, None);
    let (_, admin) = app.sign_in("admin@example.com", true);
    let (_, customer) = app.sign_in("shopper@example.com", false);

    let accepted = place_order(&app, &customer, lamp, 1, None);
    assert_eq!(order_status(&app, accepted), "ACCEPTED");
    app.post("/s/demo/products/desk-lamp/reviews", Some(&customer), "rating=5");

    let resp = app.post("/s/demo/admin/settings", Some(&admin), "name=Demo+Store");
    assert_eq!(resp.status, 303);
    let pending = place_order(&app, &customer, lamp, 3, None);
    assert_eq!(order_status(&app, pending), "PENDING");

    let page = app.get("/s/demo/admin", Some(&admin));
    assert_eq!(page.status, 200);
    assert!(page.body.contains("orders?status=ADMIN_PENDING\">1</a>"));
    assert!(page.body.contains("/s/demo/admin/reviews\">1</a>"));
    // the pending order is not revenue yet
    assert!(page.body.contains("$25.00"));
    assert!(!page.body.contains("$100.00"));
}

#[test]
fn products_created_by_form_show_in_the_catalog() {
    let app = TestApp::new();
    let (_, admin) = app.sign_in("admin@example.com", true);

    let resp = app.post(
        "/s/demo/admin/products",
        Some(&admin),
        "name=Brass+Lamp&slug=&price=42.50&stock=3&description=Warm+light",
    );
    assert_eq!(resp.status, 303);

    let page = app.get("/s/demo/products/brass-lamp", None);
    assert_eq!(page.status, 200);
    assert!(page.body.contains("$42.50"));
    assert!(page.body.contains("Warm light"));

    let dupe = app.post(
        "/s/demo/admin/products",
        Some(&admin),
        "name=Other+Lamp&slug=brass-lamp&price=10",
    );
    assert_eq!(dupe.status, 409);
}

#[test]
fn invalid_product_fields_are_rejected() {
    let app = TestApp::new();
    let (_, admin) = app.sign_in("admin@example.com", true);

    let no_name = app.post("/s/demo/admin/products", Some(&admin), "name=&price=10");
    assert_eq!(no_name.status, 400);
    let bad_price = app.post("/s/demo/admin/products", Some(&admin), "name=Lamp&price=abc");
    assert_eq!(bad_price.status, 400);
    let negative_stock = app.post("/s/demo/admin/products", Some(&admin), "name=Lamp&price=1&stock=-1");
    assert_eq!(negative_stock.status, 400);
}

#[test]
fn order_export_is_a_spreadsheet() {
    let app = TestApp::new();
    let lamp = app.product("Desk Lamp", 2500, None);
    let (_, admin) = app.sign_in("admin@example.com", true);
    let (_, customer) = app.sign_in("shopper@example.com", false);
    place_order(&app, &customer, lamp, 1, None);

    let resp = app.get("/s/demo/admin/orders/export.xlsx?status=ACCEPTED", Some(&admin));
    assert_eq!(resp.status, 200);
    assert_eq!(
        resp.content_type.as_deref(),
        Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
    );

    let list = app.get("/s/demo/admin/orders", Some(&admin));
    assert!(list.body.contains("shopper@example.com"));
}

#[test]
fn admins_cannot_block_themselves() {
    let app = TestApp::new();
    let (admin_id, admin) = app.sign_in("admin@example.com", true);

    let resp = app.post(&format!("/s/demo/admin/users/{admin_id}/block"), Some(&admin), "");
    assert_eq!(resp.status, 403);
    let resp = app.post(&format!("/s/demo/admin/users/{admin_id}/revoke-admin"), Some(&admin), "");
    assert_eq!(resp.status, 403);
}

#[test]
fn blocked_users_lose_access() {
    let app = TestApp::new();
    let (_, admin) = app.sign_in("admin@example.com", true);
    let (customer_id, customer) = app.sign_in("shopper@example.com", false);
    assert_eq!(app.get("/s/demo/cart", Some(&customer)).status, 200);

    let resp = app.post(&format!("/s/demo/admin/users/{customer_id}/block"), Some(&admin), "");
    assert_eq!(resp.status, 303);

    let cart = app.get("/s/demo/cart", Some(&customer));
    assert_eq!(cart.status, 303);
    assert_eq!(cart.location.as_deref(), Some("/s/demo/login"));

    app.post(&format!("/s/demo/admin/users/{customer_id}/unblock"), Some(&admin), "");
    assert_eq!(app.get("/s/demo/cart", Some(&customer)).status, 200);
}

#[test]
fn granting_admin_opens_the_dashboard() {
    let app = TestApp::new();
    let (_, admin) = app.sign_in("admin@example.com", true);
    let (staff_id, staff) = app.sign_in("staff@example.com", false);

    app.post(&format!("/s/demo/admin/users/{staff_id}/grant-admin"), Some(&admin), "");
    assert_eq!(app.get("/s/demo/admin", Some(&staff)).status, 200);
}

#[test]
fn promo_scope_is_managed_from_its_page() {
    let app = TestApp::new();
    let lamp = app.product("Desk Lamp", 2500, None);
    let (_, admin) = app.sign_in("admin@example.com", true);
    let (customer_id, _) = app.sign_in("vip@example.com", false);

    let created = app.post("/s/demo/admin/promos", Some(&admin), "code=vip&percent_off=20&max_uses=5");
    assert_eq!(created.status, 303);
    let location = created.location.unwrap();
    let promo_id: i64 = location.rsplit('/').next().unwrap().parse().unwrap();

    app.post(&format!("{location}/users"), Some(&admin), "email=vip%40example.com");
    assert_eq!(
        app.query_i64("select user_id from promo_code_users where promo_code_id = ?", promo_id),
        customer_id
    );
    let unknown = app.post(&format!("{location}/users"), Some(&admin), "email=nobody%40example.com");
    assert_eq!(unknown.status, 400);

    app.post(&format!("{location}/exclusions"), Some(&admin), &format!("product_id={lamp}"));
    assert_eq!(
        app.query_i64("select product_id from promo_code_exclusions where promo_code_id = ?", promo_id),
        lamp
    );

    let page = app.get(&location, Some(&admin));
    assert_eq!(page.status, 200);
    assert!(page.body.contains("VIP"));
    assert!(page.body.contains("vip@example.com"));

    app.post(&format!("{location}/toggle"), Some(&admin), "");
    assert_eq!(app.query_i64("select is_active from promo_codes where id = ?", promo_id), 0);
}
