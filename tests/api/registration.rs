use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl, SelectableHelper};
use foodhub::{models::User, schema::users};
use serde_json::{json, Value};

use crate::helpers::{TestApp, TEST_PASSWORD};

#[actix_web::test]
async fn register_with_valid_data_creates_customer(){
    let app = TestApp::spawn_app().await;

    let response = app.post_register(&json!({
        "name": "Asha Rao",
        "email": "Asha.Rao@Example.com",
        "password": TEST_PASSWORD,
        "phone": "+1 650 253 0000"
    }))
    .await;

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["role"], "CUSTOMER");
    assert_eq!(body["email"], "asha.rao@example.com");
    assert_eq!(body["phone"], "+16502530000");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

    let mut conn = app.pool.get().unwrap();
    let user = users::table
        .filter(users::email.eq("asha.rao@example.com"))
        .select(User::as_select())
        .first::<User>(&mut conn)
        .unwrap();

    assert_eq!(user.role, "CUSTOMER");
    assert_ne!(user.password_hash, TEST_PASSWORD);
}

#[actix_web::test]
async fn register_ignores_requested_role(){
    let app = TestApp::spawn_app().await;

    let response = app.post_register(&json!({
        "name": "Sneaky",
        "email": "sneaky@example.com",
        "password": TEST_PASSWORD,
        "role": "ADMIN"
    }))
    .await;

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["role"], "CUSTOMER");
}

#[actix_web::test]
async fn register_twice_with_same_email_fails(){
    let app = TestApp::spawn_app().await;
    let body = json!({
        "name": "Asha Rao",
        "email": "asha@example.com",
        "password": TEST_PASSWORD
    });

    assert_eq!(app.post_register(&body).await.status().as_u16(), 201);

    let response = app.post_register(&body).await;
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "User already exists");
}

#[actix_web::test]
async fn register_with_invalid_data_is_rejected(){
    let app = TestApp::spawn_app().await;
    let test_cases = vec![
        (json!({ "name": "A", "email": "not-an-email", "password": TEST_PASSWORD }), "invalid email"),
        (json!({ "name": "", "email": "a@example.com", "password": TEST_PASSWORD }), "empty name"),
        (json!({ "name": "A", "email": "a@example.com", "password": TEST_PASSWORD, "phone": "123" }), "invalid phone"),
        (json!({ "email": "a@example.com", "password": TEST_PASSWORD }), "missing name"),
    ];

    for (body, description) in test_cases {
        let response = app.post_register(&body).await;
        assert_eq!(
            response.status().as_u16(),
            400,
            "register did not fail with 400 for {}",
            description
        );

        let body: Value = response.json().await.unwrap();
        assert!(body["message"].is_string(), "no message for {}", description);
    }
}

#[actix_web::test]
async fn only_admin_can_create_users_with_roles(){
    let app = TestApp::spawn_app().await;
    let customer = app.register_customer().await;
    let admin = app.login_admin().await;
    let body = json!({
        "name": "Driver Dan",
        "email": "dan@example.com",
        "password": TEST_PASSWORD,
        "role": "DRIVER"
    });

    let response = app.api_client.post(app.url("/auth/create-user"))
        .bearer_auth(&customer.token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);

    let response = app.api_client.post(app.url("/auth/create-user"))
        .bearer_auth(&admin.token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["role"], "DRIVER");
    assert!(created.get("token").is_none());

    let response = app.api_client.post(app.url("/auth/create-user"))
        .bearer_auth(&admin.token)
        .json(&json!({
            "name": "Nobody",
            "email": "nobody@example.com",
            "password": TEST_PASSWORD,
            "role": "CHEF"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}
