use std::{collections::HashMap, error::Error, fmt::Debug};

use anyhow::Context;
use chrono::Utc;
use diesel::{Connection, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper};
use thiserror::Error;
use uuid::Uuid;

use crate::{auth::extractors::Identity, error::ApiError, models::{MenuItem, Restaurant, RestaurantChangeset, RestaurantWithMenu}, policy::{authorize, Action, PolicyError, Resource}, schema::{menu_items, orders, restaurants}, telemetry::spawn_blocking_with_tracing, utils::{error_fmt_chain, DbConnection}};

#[derive(Debug)]
pub struct NewRestaurant{
    pub name: String,
    pub profile: RestaurantChangeset
}

// Errors associated with restaurant management
#[derive(Error)]
pub enum RestaurantError{
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[source] diesel::result::Error),
    #[error("Restaurant not found")]
    NoRestaurantError(Uuid),
    #[error("User already owns a restaurant")]
    AlreadyOwnsRestaurant,
    #[error("Restaurant has orders and cannot be deleted")]
    HasOrdersError,
    #[error(transparent)]
    Forbidden(#[from] PolicyError)
}

impl Debug for RestaurantError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, self.source())
    }
}

impl From<diesel::result::Error> for RestaurantError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _
            ) => RestaurantError::AlreadyOwnsRestaurant,
            _ => RestaurantError::RunQueryError(e)
        }
    }
}

impl From<RestaurantError> for ApiError {
    fn from(e: RestaurantError) -> Self {
        match e {
            RestaurantError::NoRestaurantError(_) => ApiError::NotFound(e.to_string()),
            RestaurantError::AlreadyOwnsRestaurant
            | RestaurantError::HasOrdersError => ApiError::InvalidState(e.to_string()),
            RestaurantError::Forbidden(p) => p.into(),
            _ => ApiError::Internal(anyhow::anyhow!("{:?}", e))
        }
    }
}

// Loads a restaurant and checks that `actor` may act on it
pub(crate) fn load_owned_restaurant(
    conn: &mut DbConnection,
    actor: &Identity,
    action: Action,
    restaurant_id: Uuid
) -> Result<Restaurant, RestaurantError>{
    let restaurant = restaurants::table
        .filter(restaurants::restaurant_id.eq(restaurant_id))
        .select(Restaurant::as_select())
        .first::<Restaurant>(conn)
        .optional()?
        .ok_or(RestaurantError::NoRestaurantError(restaurant_id))?;

    authorize(actor, action, Resource::Restaurant{ owner_id: restaurant.owner_id })?;

    Ok(restaurant)
}

#[tracing::instrument(
    "Creating restaurant",
    skip(conn)
)]
pub async fn create_restaurant(
    mut conn: DbConnection,
    actor: Identity,
    new_restaurant: NewRestaurant
) -> Result<Restaurant, RestaurantError>{
    authorize(&actor, Action::CreateRestaurant, Resource::Own)?;

    let profile = new_restaurant.profile;
    let restaurant = Restaurant{
        restaurant_id: Uuid::new_v4(),
        owner_id: actor.user_id,
        name: new_restaurant.name,
        description: profile.description,
        phone: profile.phone,
        email: profile.email,
        logo_url: profile.logo_url,
        banner_url: profile.banner_url,
        address: profile.address,
        city: profile.city,
        lat: profile.lat,
        lng: profile.lng,
        opening_time: profile.opening_time,
        closing_time: profile.closing_time,
        created_at: Utc::now()
    };

    let res = spawn_blocking_with_tracing(move || {
        diesel::insert_into(restaurants::table)
            .values(&restaurant)
            .execute(&mut conn)?;

        Ok::<_, RestaurantError>(restaurant)
    })
    .await??;

    Ok(res)
}

// Groups menu rows under their restaurants, keeping the restaurants' order
fn attach_menus(restaurants: Vec<Restaurant>, items: Vec<MenuItem>) -> Vec<RestaurantWithMenu>{
    let mut by_restaurant: HashMap<Uuid, Vec<MenuItem>> = HashMap::new();
    for item in items {
        by_restaurant.entry(item.restaurant_id).or_default().push(item);
    }

    restaurants.into_iter()
        .map(|restaurant| {
            let menu_items = by_restaurant.remove(&restaurant.restaurant_id).unwrap_or_default();
            RestaurantWithMenu{ restaurant, menu_items }
        })
        .collect()
}

#[tracing::instrument(
    "Getting all restaurants with menus",
    skip_all
)]
pub async fn get_restaurants_with_menu(
    mut conn: DbConnection
) -> Result<Vec<RestaurantWithMenu>, anyhow::Error>{
    spawn_blocking_with_tracing(move || -> Result<Vec<RestaurantWithMenu>, anyhow::Error> {
        let all = restaurants::table
            .order(restaurants::created_at.asc())
            .select(Restaurant::as_select())
            .load::<Restaurant>(&mut conn)
            .context("Failed to load restaurants")?;

        let items = menu_items::table
            .order(menu_items::created_at.asc())
            .select(MenuItem::as_select())
            .load::<MenuItem>(&mut conn)
            .context("Failed to load menu items")?;

        Ok(attach_menus(all, items))
    })
    .await
    .context("Failed due to threadpool error")?
}

#[tracing::instrument(
    "Getting restaurant with menu",
    skip(conn)
)]
pub async fn get_restaurant_with_menu(
    mut conn: DbConnection,
    restaurant_id: Uuid
) -> Result<RestaurantWithMenu, RestaurantError>{
    let res = spawn_blocking_with_tracing(move || {
        let restaurant = restaurants::table
            .filter(restaurants::restaurant_id.eq(restaurant_id))
            .select(Restaurant::as_select())
            .first::<Restaurant>(&mut conn)
            .optional()?
            .ok_or(RestaurantError::NoRestaurantError(restaurant_id))?;

        let items = menu_items::table
            .filter(menu_items::restaurant_id.eq(restaurant_id))
            .order(menu_items::created_at.asc())
            .select(MenuItem::as_select())
            .load::<MenuItem>(&mut conn)?;

        Ok::<_, RestaurantError>(RestaurantWithMenu{ restaurant, menu_items: items })
    })
    .await??;

    Ok(res)
}

#[tracing::instrument(
    "Updating restaurant",
    skip(conn)
)]
pub async fn update_restaurant(
    mut conn: DbConnection,
    actor: Identity,
    restaurant_id: Uuid,
    changes: RestaurantChangeset
) -> Result<Restaurant, RestaurantError>{
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Restaurant, RestaurantError, _>(|conn| {
            let current = load_owned_restaurant(conn, &actor, Action::ManageRestaurant, restaurant_id)?;

            if changes.is_empty() {
                return Ok(current)
            }

            let updated = diesel::update(restaurants::table)
                .filter(restaurants::restaurant_id.eq(restaurant_id))
                .set(&changes)
                .returning(Restaurant::as_returning())
                .get_result::<Restaurant>(conn)?;

            Ok(updated)
        })
    })
    .await??;

    Ok(res)
}

// Orders keep a hard reference to their restaurant, so a restaurant with order
// history is never removed. Menu items and the cart lines pointing at them cascade.
#[tracing::instrument(
    "Deleting restaurant",
    skip(conn)
)]
pub async fn delete_restaurant(
    mut conn: DbConnection,
    actor: Identity,
    restaurant_id: Uuid
) -> Result<(), RestaurantError>{
    spawn_blocking_with_tracing(move || {
        conn.transaction::<(), RestaurantError, _>(|conn| {
            load_owned_restaurant(conn, &actor, Action::ManageRestaurant, restaurant_id)?;

            let order_count: i64 = orders::table
                .filter(orders::restaurant_id.eq(restaurant_id))
                .count()
                .get_result(conn)?;

            if order_count > 0 {
                return Err(RestaurantError::HasOrdersError)
            }

            diesel::delete(restaurants::table)
                .filter(restaurants::restaurant_id.eq(restaurant_id))
                .execute(conn)?;

            Ok(())
        })
    })
    .await??;

    Ok(())
}

impl RestaurantChangeset {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.logo_url.is_none()
            && self.banner_url.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.lat.is_none()
            && self.lng.is_none()
            && self.opening_time.is_none()
            && self.closing_time.is_none()
    }
}
