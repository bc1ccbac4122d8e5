use std::{error::Error, str::FromStr};

use diesel::{pg::Pg, r2d2::ConnectionManager, Connection, PgConnection, RunQueryDsl};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use fake::{faker::{internet::en::SafeEmail, name::en::Name}, Fake};
use foodhub::{configuration::{DatabaseSettings, Settings}, startup::Application, telemetry::{get_subscriber, init_subscriber}, utils::DbPool};
use once_cell::sync::Lazy;
use r2d2::Pool;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use uuid::Uuid;

static LOGGER_INSTANCE: Lazy<()> = Lazy::new(|| {
    let log_level = "info".to_string();
    let name = "foodhub-test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(name, log_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(name, log_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

pub const ADMIN_EMAIL: &str = "admin@foodapp.com";
pub const ADMIN_PASSWORD: &str = "admin@123";
pub const TEST_PASSWORD: &str = "testpassword";

fn run_migrations(connection: &mut impl MigrationHarness<Pg>)
    -> Result<(), Box<dyn Error + Send + Sync + 'static>>
{
    connection.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

pub struct TestApp{
    pub host: String,
    pub port: u16,
    pub pool: DbPool,
    pub api_client: reqwest::Client
}

// A logged in account
pub struct TestUser{
    pub id: Uuid,
    pub email: String,
    pub token: String
}

// Reads a decimal that was serialized either as a string or a number
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("Invalid decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("Invalid decimal number"),
        other => panic!("Expected a decimal, got {}", other)
    }
}

impl TestApp {
    fn create_db(settings: &DatabaseSettings) -> DbPool{
        let mut connection = PgConnection::establish(&settings.get_database_url())
                                .expect("Failed to connect to postgres database");

        let query = format!(r#"CREATE DATABASE "{}";"#, settings.name);
        diesel::sql_query(query)
            .execute(&mut connection)
            .expect("Failed to create test database");

        let pool = Pool::new(ConnectionManager::<PgConnection>::new(settings.get_database_table_url()))
            .expect("Failed to build connection pool to test database");

        let mut conn = pool.get().expect("Failed to get connection to test database");
        run_migrations(&mut conn).expect("Failed to run migrations");

        pool
    }

    pub fn get_app_url(&self) -> String{
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn url(&self, path: &str) -> String{
        format!("{}{}", self.get_app_url(), path)
    }

    pub async fn spawn_app() -> TestApp{
        Lazy::force(&LOGGER_INSTANCE);

        let mut settings = Settings::get().expect("Failed to read configuration");
        settings.application.port = 0;
        settings.database.name = Uuid::new_v4().to_string();

        let pool = TestApp::create_db(&settings.database);

        let application = Application::new(settings)
                            .await
                            .expect("Failed to build application");

        let host = application.host.clone();
        let port = application.port;
        tokio::task::spawn(application.run_until_stopped());

        TestApp{
            host,
            port,
            pool,
            api_client: reqwest::Client::new()
        }
    }

    pub async fn post_register(&self, body: &Value) -> reqwest::Response{
        self.api_client.post(self.url("/auth/register"))
            .json(body)
            .send()
            .await
            .expect("Failed to send request to register endpoint")
    }

    pub async fn post_login(&self, email: &str, password: &str) -> reqwest::Response{
        self.api_client.post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to send request to login endpoint")
    }

    async fn login_as(&self, email: &str, password: &str) -> TestUser{
        let response = self.post_login(email, password).await;
        assert_eq!(response.status().as_u16(), 200);

        let body: Value = response.json().await.unwrap();
        TestUser{
            id: Uuid::parse_str(body["id"].as_str().unwrap()).unwrap(),
            email: email.to_string(),
            token: body["token"].as_str().unwrap().to_string()
        }
    }

    pub async fn login_admin(&self) -> TestUser{
        self.login_as(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    pub async fn register_customer(&self) -> TestUser{
        let email: String = SafeEmail().fake();
        let name: String = Name().fake();

        let response = self.post_register(&json!({
            "name": name,
            "email": email,
            "password": TEST_PASSWORD
        }))
        .await;
        assert_eq!(response.status().as_u16(), 201);

        let body: Value = response.json().await.unwrap();
        TestUser{
            id: Uuid::parse_str(body["id"].as_str().unwrap()).unwrap(),
            email: body["email"].as_str().unwrap().to_string(),
            token: body["token"].as_str().unwrap().to_string()
        }
    }

    // Accounts other than CUSTOMER are provisioned by the seeded admin
    pub async fn create_user_with_role(&self, role: &str) -> TestUser{
        let admin = self.login_admin().await;
        let email: String = SafeEmail().fake();
        let name: String = Name().fake();

        let response = self.api_client.post(self.url("/auth/create-user"))
            .bearer_auth(&admin.token)
            .json(&json!({
                "name": name,
                "email": email,
                "password": TEST_PASSWORD,
                "role": role
            }))
            .send()
            .await
            .expect("Failed to send request to create-user endpoint");
        assert_eq!(response.status().as_u16(), 201);

        self.login_as(&email.to_lowercase(), TEST_PASSWORD).await
    }

    pub async fn create_restaurant(&self, owner: &TestUser, name: &str) -> Uuid{
        let response = self.api_client.post(self.url("/restaurants"))
            .bearer_auth(&owner.token)
            .json(&json!({ "name": name, "city": "Pune" }))
            .send()
            .await
            .expect("Failed to send request to restaurants endpoint");
        assert_eq!(response.status().as_u16(), 201);

        let body: Value = response.json().await.unwrap();
        Uuid::parse_str(body["id"].as_str().unwrap()).unwrap()
    }

    pub async fn add_menu_item(&self, owner: &TestUser, restaurant_id: Uuid, name: &str, price: &str) -> Uuid{
        let response = self.api_client.post(self.url(&format!("/restaurants/{}/menu", restaurant_id)))
            .bearer_auth(&owner.token)
            .json(&json!({ "name": name, "price": price }))
            .send()
            .await
            .expect("Failed to send request to menu endpoint");
        assert_eq!(response.status().as_u16(), 201);

        let body: Value = response.json().await.unwrap();
        Uuid::parse_str(body["id"].as_str().unwrap()).unwrap()
    }

    // Restaurant owned by a fresh RESTAURANT account with a single menu item
    pub async fn restaurant_with_item(&self, name: &str, item: &str, price: &str) -> (TestUser, Uuid, Uuid){
        let owner = self.create_user_with_role("RESTAURANT").await;
        let restaurant_id = self.create_restaurant(&owner, name).await;
        let menu_item_id = self.add_menu_item(&owner, restaurant_id, item, price).await;

        (owner, restaurant_id, menu_item_id)
    }

    pub async fn add_to_cart(&self, customer: &TestUser, menu_item_id: Uuid, quantity: Option<i32>) -> reqwest::Response{
        let mut body = json!({ "menuItemId": menu_item_id });
        if let Some(quantity) = quantity {
            body["quantity"] = json!(quantity);
        }

        self.api_client.post(self.url("/cart/add"))
            .bearer_auth(&customer.token)
            .json(&body)
            .send()
            .await
            .expect("Failed to send request to cart endpoint")
    }

    pub async fn get_cart(&self, customer: &TestUser) -> Value{
        let response = self.api_client.get(self.url("/cart"))
            .bearer_auth(&customer.token)
            .send()
            .await
            .expect("Failed to send request to cart endpoint");
        assert_eq!(response.status().as_u16(), 200);

        response.json().await.unwrap()
    }

    pub async fn checkout(&self, customer: &TestUser, body: Option<Value>) -> reqwest::Response{
        let request = self.api_client.post(self.url("/orders"))
            .bearer_auth(&customer.token);

        let request = match body {
            Some(body) => request.json(&body),
            None => request
        };

        request.send()
            .await
            .expect("Failed to send request to orders endpoint")
    }

    pub async fn patch_status(&self, actor: &TestUser, order_id: &str, status: &str) -> reqwest::Response{
        self.api_client.patch(self.url(&format!("/orders/{}/status", order_id)))
            .bearer_auth(&actor.token)
            .json(&json!({ "status": status }))
            .send()
            .await
            .expect("Failed to send request to order status endpoint")
    }
}
