use crate::tests::utils::{place_order, TestApp};

#[test]
fn reviews_require_a_purchase() {
    let app = TestApp::new();
    app.product("Desk Lamp", 2500, None);
    let (_, token) = app.sign_in("shopper@example.com", false);

    let resp = app.post(
        "/s/demo/products/desk-lamp/reviews",
        Some(&token),
        "rating=5&body=Lovely",
    );
    assert_eq!(resp.status, 403);

    let anonymous = app.post("/s/demo/products/desk-lamp/reviews", None, "rating=5");
    assert_eq!(anonymous.status, 303);
    assert_eq!(anonymous.location.as_deref(), Some("/s/demo/login"));
}

#[test]
fn reviews_wait_for_moderation() {
    let app = TestApp::new();
    let lamp = app.product("Desk Lamp", 2500, None);
    let (_, admin) = app.sign_in("admin@example.com", true);
    let (_, token) = app.sign_in("shopper@example.com", false);
    place_order(&app, &token, lamp, 1, None);

    let resp = app.post(
        "/s/demo/products/desk-lamp/reviews",
        Some(&token),
        "rating=4&body=Bright+and+sturdy",
    );
    assert_eq!(resp.status, 303);
    assert_eq!(resp.location.as_deref(), Some("/s/demo/products/desk-lamp"));

    let review = app.query_i64("select id from reviews where product_id = ?", lamp);
    assert!(!app
        .get("/s/demo/products/desk-lamp", None)
        .body
        .contains("Bright and sturdy"));

    let queue = app.get("/s/demo/admin/reviews", Some(&admin));
    assert_eq!(queue.status, 200);
    assert!(queue.body.contains("Bright and sturdy"));

    let resp = app.post(&format!("/s/demo/admin/reviews/{review}/approve"), Some(&admin), "");
    assert_eq!(resp.status, 303);
    assert!(app
        .get("/s/demo/products/desk-lamp", None)
        .body
        .contains("Bright and sturdy"));
}

#[test]
fn out_of_range_ratings_are_rejected() {
    let app = TestApp::new();
    let lamp = app.product("Desk Lamp", 2500, None);
    let (_, token) = app.sign_in("shopper@example.com", false);
    place_order(&app, &token, lamp, 1, None);

    for rating in ["0", "6", "five"] {
        let resp = app.post(
            "/s/demo/products/desk-lamp/reviews",
            Some(&token),
            &format!("rating={rating}"),
        );
        assert_eq!(resp.status, 400, "rating {rating}");
    }
}

#[test]
fn customers_cannot_moderate() {
    let app = TestApp::new();
    let lamp = app.product("Desk Lamp", 2500, None);
    let (_, token) = app.sign_in("shopper@example.com", false);
    place_order(&app, &token, lamp, 1, None);
    app.post("/s/demo/products/desk-lamp/reviews", Some(&token), "rating=5");
    let review = app.query_i64("select id from reviews where product_id = ?", lamp);

    let resp = app.post(&format!("/s/demo/admin/reviews/{review}/approve"), Some(&token), "");
    assert_eq!(resp.status, 403);
    assert_eq!(
        app.query_string("select status from reviews where id = ?", review),
        "PENDING"
    );
}
