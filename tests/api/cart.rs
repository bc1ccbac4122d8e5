use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};
use foodhub::schema::{cart_items, carts};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::helpers::TestApp;

#[actix_web::test]
async fn empty_cart_is_returned_before_first_add(){
    let app = TestApp::spawn_app().await;
    let customer = app.register_customer().await;

    let cart = app.get_cart(&customer).await;

    assert_eq!(cart["items"], json!([]));
}

#[actix_web::test]
async fn repeated_adds_accumulate_quantity(){
    let app = TestApp::spawn_app().await;
    let (_, _, menu_item_id) = app.restaurant_with_item("Dosa Corner", "Masala Dosa", "120").await;
    let customer = app.register_customer().await;

    for quantity in [None, Some(2), Some(4)] {
        let response = app.add_to_cart(&customer, menu_item_id, quantity).await;
        assert_eq!(response.status().as_u16(), 201);
    }

    let cart = app.get_cart(&customer).await;
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 7);
    assert_eq!(items[0]["menuItem"]["name"], "Masala Dosa");

    let mut conn = app.pool.get().unwrap();
    let rows: i64 = cart_items::table
        .filter(cart_items::menu_item_id.eq(menu_item_id))
        .count()
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(rows, 1);
}

#[actix_web::test]
async fn add_rejects_bad_input(){
    let app = TestApp::spawn_app().await;
    let (_, _, menu_item_id) = app.restaurant_with_item("Dosa Corner", "Masala Dosa", "120").await;
    let customer = app.register_customer().await;

    let response = app.api_client.post(app.url("/cart/add"))
        .bearer_auth(&customer.token)
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    assert_eq!(app.add_to_cart(&customer, menu_item_id, Some(0)).await.status().as_u16(), 400);
    assert_eq!(app.add_to_cart(&customer, Uuid::new_v4(), None).await.status().as_u16(), 404);
}

#[actix_web::test]
async fn unavailable_items_cannot_be_added(){
    let app = TestApp::spawn_app().await;
    let (owner, _, menu_item_id) = app.restaurant_with_item("Dosa Corner", "Masala Dosa", "120").await;
    let customer = app.register_customer().await;

    app.api_client.put(app.url(&format!("/menu/{}", menu_item_id)))
        .bearer_auth(&owner.token)
        .json(&json!({ "isAvailable": false }))
        .send()
        .await
        .unwrap();

    assert_eq!(app.add_to_cart(&customer, menu_item_id, None).await.status().as_u16(), 404);
}

#[actix_web::test]
async fn only_customers_have_carts(){
    let app = TestApp::spawn_app().await;
    let (owner, _, menu_item_id) = app.restaurant_with_item("Dosa Corner", "Masala Dosa", "120").await;

    assert_eq!(app.add_to_cart(&owner, menu_item_id, None).await.status().as_u16(), 403);
}

#[actix_web::test]
async fn update_replaces_quantity(){
    let app = TestApp::spawn_app().await;
    let (_, _, menu_item_id) = app.restaurant_with_item("Dosa Corner", "Masala Dosa", "120").await;
    let customer = app.register_customer().await;
    app.add_to_cart(&customer, menu_item_id, Some(3)).await;
    let url = app.url(&format!("/cart/update/{}", menu_item_id));

    let response = app.api_client.put(&url)
        .bearer_auth(&customer.token)
        .json(&json!({ "quantity": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let item: Value = response.json().await.unwrap();
    assert_eq!(item["quantity"], 5);

    for quantity in [0, -2] {
        let response = app.api_client.put(&url)
            .bearer_auth(&customer.token)
            .json(&json!({ "quantity": quantity }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);
    }

    let cart = app.get_cart(&customer).await;
    assert_eq!(cart["items"][0]["quantity"], 5);

    let response = app.api_client.put(app.url(&format!("/cart/update/{}", Uuid::new_v4())))
        .bearer_auth(&customer.token)
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[actix_web::test]
async fn update_without_cart_is_not_found(){
    let app = TestApp::spawn_app().await;
    let customer = app.register_customer().await;

    let response = app.api_client.put(app.url(&format!("/cart/update/{}", Uuid::new_v4())))
        .bearer_auth(&customer.token)
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[actix_web::test]
async fn remove_deletes_single_line(){
    let app = TestApp::spawn_app().await;
    let (owner, restaurant_id, dosa) = app.restaurant_with_item("Dosa Corner", "Masala Dosa", "120").await;
    let coffee = app.add_menu_item(&owner, restaurant_id, "Filter Coffee", "30").await;
    let customer = app.register_customer().await;
    app.add_to_cart(&customer, dosa, None).await;
    app.add_to_cart(&customer, coffee, None).await;

    let response = app.api_client.delete(app.url("/cart/item"))
        .bearer_auth(&customer.token)
        .json(&json!({ "menuItemId": dosa }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let cart = app.get_cart(&customer).await;
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["menuItemId"], coffee.to_string());

    // POST alias behaves the same and reports lines that are gone
    let response = app.api_client.post(app.url("/cart/remove"))
        .bearer_auth(&customer.token)
        .json(&json!({ "menuItemId": dosa }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[actix_web::test]
async fn delete_cart_removes_cart_and_items(){
    let app = TestApp::spawn_app().await;
    let (_, _, menu_item_id) = app.restaurant_with_item("Dosa Corner", "Masala Dosa", "120").await;
    let customer = app.register_customer().await;
    app.add_to_cart(&customer, menu_item_id, Some(2)).await;

    let response = app.api_client.delete(app.url("/cart"))
        .bearer_auth(&customer.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let mut conn = app.pool.get().unwrap();
    let remaining: i64 = carts::table
        .filter(carts::user_id.eq(customer.id))
        .count()
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(remaining, 0);

    let response = app.api_client.delete(app.url("/cart"))
        .bearer_auth(&customer.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[actix_web::test]
async fn quantities_are_capped_per_line(){
    let app = TestApp::spawn_app().await;
    let (_, _, menu_item_id) = app.restaurant_with_item("Dosa Corner", "Masala Dosa", "120").await;
    let customer = app.register_customer().await;

    for quantity in [1000, 100_000_000, i32::MAX] {
        let response = app.add_to_cart(&customer, menu_item_id, Some(quantity)).await;
        assert_eq!(response.status().as_u16(), 400);
    }

    assert_eq!(app.add_to_cart(&customer, menu_item_id, Some(999)).await.status().as_u16(), 201);

    let response = app.add_to_cart(&customer, menu_item_id, Some(1)).await;
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Quantity cannot exceed 999");

    let response = app.api_client.put(app.url(&format!("/cart/update/{}", menu_item_id)))
        .bearer_auth(&customer.token)
        .json(&json!({ "quantity": 1000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let cart = app.get_cart(&customer).await;
    assert_eq!(cart["items"][0]["quantity"], 999);

    let response = app.checkout(&customer, None).await;
    assert_eq!(response.status().as_u16(), 201);
}
