use rust_decimal::Decimal;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::helpers::{decimal, TestApp};

#[actix_web::test]
async fn menu_lists_items_of_restaurant(){
    let app = TestApp::spawn_app().await;
    let (owner, restaurant_id, _) = app.restaurant_with_item("Dosa Corner", "Masala Dosa", "120.50").await;
    app.add_menu_item(&owner, restaurant_id, "Filter Coffee", "30").await;

    let response = app.api_client.get(app.url(&format!("/restaurants/{}/menu", restaurant_id)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let items: Vec<Value> = response.json().await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "Masala Dosa");
    assert_eq!(decimal(&items[0]["price"]), Decimal::new(12050, 2));
    assert_eq!(items[0]["isAvailable"], true);
}

#[actix_web::test]
async fn add_menu_item_validates_input(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_user_with_role("RESTAURANT").await;
    let restaurant_id = app.create_restaurant(&owner, "Strict").await;
    let url = app.url(&format!("/restaurants/{}/menu", restaurant_id));
    let test_cases = vec![
        (json!({ "price": "10" }), "missing name"),
        (json!({ "name": "Tea" }), "missing price"),
        (json!({ "name": "Tea", "price": "-1" }), "negative price"),
        (json!({ "name": "Tea", "price": "ten" }), "malformed price"),
    ];

    for (body, description) in test_cases {
        let response = app.api_client.post(&url)
            .bearer_auth(&owner.token)
            .json(&body)
            .send()
            .await
            .unwrap();

        assert_eq!(
            response.status().as_u16(),
            400,
            "add menu item did not fail with 400 for {}",
            description
        );
    }
}

#[actix_web::test]
async fn only_owner_manages_menu(){
    let app = TestApp::spawn_app().await;
    let (_, restaurant_id, menu_item_id) = app.restaurant_with_item("Mine", "Tea", "10").await;
    let intruder = app.create_user_with_role("RESTAURANT").await;

    let response = app.api_client.post(app.url(&format!("/restaurants/{}/menu", restaurant_id)))
        .bearer_auth(&intruder.token)
        .json(&json!({ "name": "Poison", "price": "1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);

    let response = app.api_client.put(app.url(&format!("/menu/{}", menu_item_id)))
        .bearer_auth(&intruder.token)
        .json(&json!({ "price": "0" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);

    let response = app.api_client.delete(app.url(&format!("/menu/{}", menu_item_id)))
        .bearer_auth(&intruder.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
}

#[actix_web::test]
async fn owner_updates_and_deletes_menu_item(){
    let app = TestApp::spawn_app().await;
    let (owner, restaurant_id, menu_item_id) = app.restaurant_with_item("Mine", "Tea", "10").await;
    let url = app.url(&format!("/menu/{}", menu_item_id));

    let response = app.api_client.put(&url)
        .bearer_auth(&owner.token)
        .json(&json!({ "price": "12.50", "isAvailable": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let item: Value = response.json().await.unwrap();
    assert_eq!(item["name"], "Tea");
    assert_eq!(decimal(&item["price"]), Decimal::new(1250, 2));
    assert_eq!(item["isAvailable"], false);

    let response = app.api_client.put(&url)
        .bearer_auth(&owner.token)
        .json(&json!({ "price": "-3" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let response = app.api_client.delete(&url)
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = app.api_client.get(app.url(&format!("/restaurants/{}/menu", restaurant_id)))
        .send()
        .await
        .unwrap();
    let items: Vec<Value> = response.json().await.unwrap();
    assert!(items.is_empty());
}

#[actix_web::test]
async fn unknown_menu_item_is_not_found(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_user_with_role("RESTAURANT").await;

    let response = app.api_client.delete(app.url(&format!("/menu/{}", Uuid::new_v4())))
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}
