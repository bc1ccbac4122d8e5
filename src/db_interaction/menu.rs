use std::{error::Error, fmt::Debug};

use chrono::Utc;
use diesel::{Connection, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::{auth::extractors::Identity, error::ApiError, models::{MenuItem, MenuItemChangeset}, policy::{Action, PolicyError}, schema::{menu_items, restaurants}, telemetry::spawn_blocking_with_tracing, utils::{error_fmt_chain, DbConnection}};

use super::restaurant::{load_owned_restaurant, RestaurantError};

#[derive(Debug)]
pub struct NewMenuItem{
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub is_available: bool
}

// Errors associated with menu management
#[derive(Error)]
pub enum MenuError{
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
    #[error("Restaurant not found")]
    NoRestaurantError(Uuid),
    #[error("Menu item not found")]
    NoMenuItemError(Uuid),
    #[error(transparent)]
    Forbidden(#[from] PolicyError),
    #[error("Unexpected error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for MenuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, self.source())
    }
}

impl From<RestaurantError> for MenuError {
    fn from(e: RestaurantError) -> Self {
        match e {
            RestaurantError::NoRestaurantError(id) => MenuError::NoRestaurantError(id),
            RestaurantError::Forbidden(p) => MenuError::Forbidden(p),
            RestaurantError::ThreadpoolError(j) => MenuError::ThreadpoolError(j),
            RestaurantError::RunQueryError(q) => MenuError::RunQueryError(q),
            other => MenuError::UnexpectedError(anyhow::anyhow!("{:?}", other))
        }
    }
}

impl From<MenuError> for ApiError {
    fn from(e: MenuError) -> Self {
        match e {
            MenuError::NoRestaurantError(_)
            | MenuError::NoMenuItemError(_) => ApiError::NotFound(e.to_string()),
            MenuError::Forbidden(p) => p.into(),
            _ => ApiError::Internal(anyhow::anyhow!("{:?}", e))
        }
    }
}

// Loads a menu item after checking that `actor` owns its restaurant
fn load_owned_menu_item(
    conn: &mut DbConnection,
    actor: &Identity,
    menu_item_id: Uuid
) -> Result<MenuItem, MenuError>{
    let item = menu_items::table
        .filter(menu_items::menu_item_id.eq(menu_item_id))
        .select(MenuItem::as_select())
        .first::<MenuItem>(conn)
        .optional()?
        .ok_or(MenuError::NoMenuItemError(menu_item_id))?;

    load_owned_restaurant(conn, actor, Action::ManageRestaurant, item.restaurant_id)?;

    Ok(item)
}

#[tracing::instrument(
    "Getting menu items of restaurant",
    skip(conn)
)]
pub async fn get_menu_items(
    mut conn: DbConnection,
    restaurant_id: Uuid
) -> Result<Vec<MenuItem>, MenuError>{
    let res = spawn_blocking_with_tracing(move || {
        let exists: i64 = restaurants::table
            .filter(restaurants::restaurant_id.eq(restaurant_id))
            .count()
            .get_result(&mut conn)?;

        if exists == 0 {
            return Err(MenuError::NoRestaurantError(restaurant_id))
        }

        let items = menu_items::table
            .filter(menu_items::restaurant_id.eq(restaurant_id))
            .order(menu_items::created_at.asc())
            .select(MenuItem::as_select())
            .load::<MenuItem>(&mut conn)?;

        Ok(items)
    })
    .await??;

    Ok(res)
}

#[tracing::instrument(
    "Adding menu item",
    skip(conn)
)]
pub async fn add_menu_item(
    mut conn: DbConnection,
    actor: Identity,
    restaurant_id: Uuid,
    new_item: NewMenuItem
) -> Result<MenuItem, MenuError>{
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<MenuItem, MenuError, _>(|conn| {
            load_owned_restaurant(conn, &actor, Action::ManageRestaurant, restaurant_id)?;

            let item = MenuItem{
                menu_item_id: Uuid::new_v4(),
                restaurant_id,
                name: new_item.name,
                description: new_item.description,
                price: new_item.price,
                image_url: new_item.image_url,
                is_available: new_item.is_available,
                created_at: Utc::now()
            };

            diesel::insert_into(menu_items::table)
                .values(&item)
                .execute(conn)?;

            Ok(item)
        })
    })
    .await??;

    Ok(res)
}

#[tracing::instrument(
    "Updating menu item",
    skip(conn)
)]
pub async fn update_menu_item(
    mut conn: DbConnection,
    actor: Identity,
    menu_item_id: Uuid,
    changes: MenuItemChangeset
) -> Result<MenuItem, MenuError>{
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<MenuItem, MenuError, _>(|conn| {
            let current = load_owned_menu_item(conn, &actor, menu_item_id)?;

            if changes.is_empty() {
                return Ok(current)
            }

            let updated = diesel::update(menu_items::table)
                .filter(menu_items::menu_item_id.eq(menu_item_id))
                .set(&changes)
                .returning(MenuItem::as_returning())
                .get_result::<MenuItem>(conn)?;

            Ok(updated)
        })
    })
    .await??;

    Ok(res)
}

// Order items keep their copied name and price, their reference is nulled by the FK
#[tracing::instrument(
    "Deleting menu item",
    skip(conn)
)]
pub async fn delete_menu_item(
    mut conn: DbConnection,
    actor: Identity,
    menu_item_id: Uuid
) -> Result<(), MenuError>{
    spawn_blocking_with_tracing(move || {
        conn.transaction::<(), MenuError, _>(|conn| {
            load_owned_menu_item(conn, &actor, menu_item_id)?;

            diesel::delete(menu_items::table)
                .filter(menu_items::menu_item_id.eq(menu_item_id))
                .execute(conn)?;

            Ok(())
        })
    })
    .await??;

    Ok(())
}

impl MenuItemChangeset {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.image_url.is_none()
            && self.is_available.is_none()
    }
}
