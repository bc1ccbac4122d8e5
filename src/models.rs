use chrono::{DateTime, Utc};
use diesel::prelude::{AsChangeset, Insertable, Queryable, Selectable};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::order_status::OrderStatus;
use crate::domain::user_role::UserRole;
use crate::schema::{cart_items, carts, menu_items, order_items, orders, restaurants, users};

#[derive(Queryable, Selectable, Insertable, Clone, Debug)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User{
    pub user_id : Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>
}

impl User {
    // Rows written by this crate always hold a valid role, anything else gets the least privileged one
    pub fn role(&self) -> UserRole {
        self.role.parse().unwrap_or(UserRole::CUSTOMER)
    }
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Debug)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct UserProfileInfo{
    #[serde(rename = "id")]
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Clone, Debug)]
#[diesel(table_name = restaurants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Restaurant{
    #[serde(rename = "id")]
    pub restaurant_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
    pub created_at: DateTime<Utc>
}

// Partial update of a restaurant profile, `None` leaves the column untouched
#[derive(AsChangeset, Deserialize, Debug, Default)]
#[diesel(table_name = restaurants)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantChangeset{
    pub name: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantWithMenu{
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub menu_items: Vec<MenuItem>
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[diesel(table_name = menu_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct MenuItem{
    #[serde(rename = "id")]
    pub menu_item_id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>
}

#[derive(AsChangeset, Deserialize, Debug, Default)]
#[diesel(table_name = menu_items)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemChangeset{
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Clone, Debug)]
#[diesel(table_name = carts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Cart{
    #[serde(rename = "id")]
    pub cart_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[diesel(table_name = cart_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct CartItem{
    #[serde(rename = "id")]
    pub cart_item_id: Uuid,
    pub cart_id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub added_at: DateTime<Utc>
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartItemWithMenuItem{
    #[serde(flatten)]
    pub item: CartItem,
    pub menu_item: MenuItem
}

// A customer's cart; `id` is absent until the first item is added
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartView{
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub items: Vec<CartItemWithMenuItem>
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Clone, Debug)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Order{
    #[serde(rename = "id")]
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    pub total: Decimal,
    pub status: String,
    pub address_snapshot: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>
}

impl Order {
    pub fn status(&self) -> Result<OrderStatus, String> {
        self.status.parse()
    }
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[diesel(table_name = order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct OrderItemModel{
    #[serde(rename = "id")]
    pub order_item_id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Option<Uuid>,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Clone, Debug)]
#[diesel(table_name = restaurants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct RestaurantSummary{
    #[serde(rename = "id")]
    pub restaurant_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>
}

// An order aggregate as returned by the API
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems{
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemModel>,
    pub restaurant: RestaurantSummary
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResult{
    pub grand_total: Decimal,
    pub orders: Vec<OrderWithItems>
}
