use serde_json::Value;

use crate::db::products::ProductInput;
use crate::tests::utils::{place_order, TestApp};

fn json(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}

#[test]
fn product_list_hides_request_only_prices() {
    let app = TestApp::new();
    app.product("Desk Lamp", 2499, Some(0));
    app.product_with(ProductInput {
        name: "Custom Sofa".into(),
        slug: "custom-sofa".into(),
        price_cents: 90000,
        hide_price: true,
        ..ProductInput::default()
    });

    let resp = app.get("/s/demo/api/products?sort=name", None);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.content_type.as_deref(), Some("application/json"));

    let body = json(&resp.body);
    assert_eq!(body["total"], 2);
    let products = body["products"].as_array().unwrap();
    let sofa = products.iter().find(|p| p["slug"] == "custom-sofa").unwrap();
    assert!(sofa["price_cents"].is_null());
    assert_eq!(sofa["price_on_request"], true);

    let lamp = products.iter().find(|p| p["slug"] == "desk-lamp").unwrap();
    assert_eq!(lamp["price_cents"], 2499);
    assert_eq!(lamp["in_stock"], false);
}

#[test]
fn product_detail_carries_rating_summary() {
    let app = TestApp::new();
    app.product("Desk Lamp", 2499, None);

    let resp = app.get("/s/demo/api/products/desk-lamp", None);
    assert_eq!(resp.status, 200);
    let body = json(&resp.body);
    assert_eq!(body["name"], "Desk Lamp");
    assert_eq!(body["review_count"], 0);

    let missing = app.get("/s/demo/api/products/nope", None);
    assert_eq!(missing.status, 404);
    assert!(json(&missing.body)["error"].is_string());
}

#[test]
fn orders_need_a_token() {
    let app = TestApp::new();
    let resp = app.get("/s/demo/api/orders", None);
    assert_eq!(resp.status, 401);
    assert_eq!(resp.content_type.as_deref(), Some("application/json"));
    assert!(json(&resp.body)["error"].is_string());
}

#[test]
fn bearer_token_lists_only_own_orders() {
    let app = TestApp::new();
    let lamp = app.product("Desk Lamp", 2500, None);
    let (alice_id, alice) = app.sign_in("alice@example.com", false);
    let (_, bob) = app.sign_in("bob@example.com", false);

    let alice_order = place_order(&app, &alice, lamp, 1, None);
    let bob_order = place_order(&app, &bob, lamp, 2, None);

    let resp = app.get_bearer("/s/demo/api/orders", &alice);
    assert_eq!(resp.status, 200);
    let orders = json(&resp.body);
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], alice_order);
    assert_eq!(orders[0]["user_id"], alice_id);
    assert_eq!(orders[0]["status"], "ACCEPTED");

    let detail = app.get_bearer(&format!("/s/demo/api/orders/{alice_order}"), &alice);
    assert_eq!(detail.status, 200);
    let detail = json(&detail.body);
    assert_eq!(detail["items"][0]["name"], "Desk Lamp");
    assert_eq!(detail["events"].as_array().unwrap().len(), 1);

    let foreign = app.get_bearer(&format!("/s/demo/api/orders/{bob_order}"), &alice);
    assert_eq!(foreign.status, 404);
    assert!(json(&foreign.body)["error"].is_string());
}

#[test]
fn unknown_store_is_a_json_not_found() {
    let app = TestApp::new();
    let resp = app.get("/s/nowhere/api/products", None);
    assert_eq!(resp.status, 404);
    assert!(json(&resp.body)["error"].is_string());
}
