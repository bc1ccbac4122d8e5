use std::{error::Error, fmt::Debug};

use chrono::Utc;
use diesel::{upsert::excluded, Connection, ExpressionMethods, OptionalExtension, QueryDsl, QueryResult, RunQueryDsl, SelectableHelper};
use thiserror::Error;
use uuid::Uuid;

use crate::{auth::extractors::Identity, error::ApiError, models::{Cart, CartItem, CartItemWithMenuItem, CartView, MenuItem}, policy::{authorize, Action, PolicyError, Resource}, schema::{cart_items, carts, menu_items}, telemetry::spawn_blocking_with_tracing, utils::{error_fmt_chain, DbConnection}};

// Errors associated with reading and mutating a customer's cart
#[derive(Error)]
pub enum CartError{
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
    #[error("Menu item not found")]
    NoMenuItemError(Uuid),
    #[error("Cart not found")]
    NoCartError,
    #[error("Item not found in cart")]
    ItemNotInCartError(Uuid),
    #[error("Valid quantity is required")]
    InvalidQuantityError(i32),
    #[error("Quantity cannot exceed {}", MAX_ITEM_QUANTITY)]
    QuantityLimitError(i64),
    #[error(transparent)]
    Forbidden(#[from] PolicyError)
}

impl Debug for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, self.source())
    }
}

impl From<CartError> for ApiError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::NoMenuItemError(_)
            | CartError::NoCartError
            | CartError::ItemNotInCartError(_) => ApiError::NotFound(e.to_string()),
            CartError::InvalidQuantityError(_)
            | CartError::QuantityLimitError(_) => ApiError::InvalidArgument(e.to_string()),
            CartError::Forbidden(p) => p.into(),
            _ => ApiError::Internal(anyhow::anyhow!("{:?}", e))
        }
    }
}

// Most units of one menu item a cart line may hold
pub const MAX_ITEM_QUANTITY: i32 = 999;

fn check_quantity(quantity: i32) -> Result<i32, CartError>{
    match quantity {
        q if q < 1 => Err(CartError::InvalidQuantityError(q)),
        q if q > MAX_ITEM_QUANTITY => Err(CartError::QuantityLimitError(i64::from(q))),
        q => Ok(q)
    }
}

pub(crate) fn find_cart(conn: &mut DbConnection, user_id: Uuid) -> QueryResult<Option<Cart>>{
    carts::table
        .filter(carts::user_id.eq(user_id))
        .select(Cart::as_select())
        .first::<Cart>(conn)
        .optional()
}

// Cart lines of `cart_id` joined with the menu item they point at, oldest first
pub(crate) fn load_cart_lines(conn: &mut DbConnection, cart_id: Uuid) -> QueryResult<Vec<(CartItem, MenuItem)>>{
    cart_items::table
        .inner_join(menu_items::table)
        .filter(cart_items::cart_id.eq(cart_id))
        .order((cart_items::added_at.asc(), cart_items::cart_item_id.asc()))
        .select((CartItem::as_select(), MenuItem::as_select()))
        .load::<(CartItem, MenuItem)>(conn)
}

// Every write to a cart's lines, checkout included, holds this row lock first
pub(crate) fn lock_cart(conn: &mut DbConnection, user_id: Uuid) -> QueryResult<Option<Cart>>{
    carts::table
        .filter(carts::user_id.eq(user_id))
        .select(Cart::as_select())
        .for_update()
        .first::<Cart>(conn)
        .optional()
}

pub(crate) fn clear_cart_items(conn: &mut DbConnection, cart_id: Uuid) -> QueryResult<usize>{
    diesel::delete(cart_items::table)
        .filter(cart_items::cart_id.eq(cart_id))
        .execute(conn)
}

/// Adds `quantity` of a menu item to the caller's cart.
///
/// The cart is created on first use. Adding an item that is already in the
/// cart increments its quantity; the `(cart_id, menu_item_id)` unique
/// constraint makes the increment a single upsert, so concurrent adds of the
/// same item never produce duplicate rows or lost updates. The cart row is
/// locked for the whole write, so an add never lands in the middle of a checkout.
#[tracing::instrument(
    "Adding item to cart",
    skip(conn)
)]
pub async fn add_item_to_cart(
    mut conn: DbConnection,
    actor: Identity,
    menu_item_id: Uuid,
    quantity: i32
) -> Result<CartItem, CartError>{
    authorize(&actor, Action::ManageCart, Resource::Own)?;
    check_quantity(quantity)?;

    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<CartItem, CartError, _>(|conn| {
            let available: i64 = menu_items::table
                .filter(menu_items::menu_item_id.eq(menu_item_id))
                .filter(menu_items::is_available.eq(true))
                .count()
                .get_result(conn)?;

            if available == 0 {
                return Err(CartError::NoMenuItemError(menu_item_id))
            }

            diesel::insert_into(carts::table)
                .values(&Cart{
                    cart_id: Uuid::new_v4(),
                    user_id: actor.user_id,
                    created_at: Utc::now()
                })
                .on_conflict(carts::user_id)
                .do_nothing()
                .execute(conn)?;

            let cart = lock_cart(conn, actor.user_id)?
                .ok_or(CartError::NoCartError)?;

            let current: Option<i32> = cart_items::table
                .filter(cart_items::cart_id.eq(cart.cart_id))
                .filter(cart_items::menu_item_id.eq(menu_item_id))
                .select(cart_items::quantity)
                .first(conn)
                .optional()?;

            let total = i64::from(current.unwrap_or(0)) + i64::from(quantity);
            if total > i64::from(MAX_ITEM_QUANTITY) {
                return Err(CartError::QuantityLimitError(total))
            }

            let item = diesel::insert_into(cart_items::table)
                .values(&CartItem{
                    cart_item_id: Uuid::new_v4(),
                    cart_id: cart.cart_id,
                    menu_item_id,
                    quantity,
                    added_at: Utc::now()
                })
                .on_conflict((cart_items::cart_id, cart_items::menu_item_id))
                .do_update()
                .set(cart_items::quantity.eq(cart_items::quantity + excluded(cart_items::quantity)))
                .returning(CartItem::as_returning())
                .get_result::<CartItem>(conn)?;

            Ok(item)
        })
    })
    .await??;

    Ok(res)
}

// Replaces the quantity of an item already in the cart
#[tracing::instrument(
    "Updating cart item quantity",
    skip(conn)
)]
pub async fn update_cart_item_quantity(
    mut conn: DbConnection,
    actor: Identity,
    menu_item_id: Uuid,
    quantity: i32
) -> Result<CartItem, CartError>{
    authorize(&actor, Action::ManageCart, Resource::Own)?;
    check_quantity(quantity)?;

    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<CartItem, CartError, _>(|conn| {
            let cart = lock_cart(conn, actor.user_id)?
                .ok_or(CartError::NoCartError)?;

            diesel::update(cart_items::table)
                .filter(cart_items::cart_id.eq(cart.cart_id))
                .filter(cart_items::menu_item_id.eq(menu_item_id))
                .set(cart_items::quantity.eq(quantity))
                .returning(CartItem::as_returning())
                .get_result::<CartItem>(conn)
                .optional()?
                .ok_or(CartError::ItemNotInCartError(menu_item_id))
        })
    })
    .await??;

    Ok(res)
}

#[tracing::instrument(
    "Removing item from cart",
    skip(conn)
)]
pub async fn remove_cart_item(
    mut conn: DbConnection,
    actor: Identity,
    menu_item_id: Uuid
) -> Result<(), CartError>{
    authorize(&actor, Action::ManageCart, Resource::Own)?;

    spawn_blocking_with_tracing(move || {
        conn.transaction::<(), CartError, _>(|conn| {
            let cart = lock_cart(conn, actor.user_id)?
                .ok_or(CartError::NoCartError)?;

            let affected_rows = diesel::delete(cart_items::table)
                .filter(cart_items::cart_id.eq(cart.cart_id))
                .filter(cart_items::menu_item_id.eq(menu_item_id))
                .execute(conn)?;

            if affected_rows == 0 {
                return Err(CartError::ItemNotInCartError(menu_item_id))
            }

            Ok(())
        })
    })
    .await??;

    Ok(())
}

// A missing cart is an empty cart here, not an error
#[tracing::instrument(
    "Getting cart",
    skip(conn)
)]
pub async fn get_cart(
    mut conn: DbConnection,
    actor: Identity
) -> Result<CartView, CartError>{
    authorize(&actor, Action::ManageCart, Resource::Own)?;

    let res = spawn_blocking_with_tracing(move || {
        let cart = match find_cart(&mut conn, actor.user_id)? {
            Some(cart) => cart,
            None => return Ok::<_, CartError>(CartView{ id: None, user_id: None, items: Vec::new() })
        };

        let items = load_cart_lines(&mut conn, cart.cart_id)?
            .into_iter()
            .map(|(item, menu_item)| CartItemWithMenuItem{ item, menu_item })
            .collect();

        Ok(CartView{
            id: Some(cart.cart_id),
            user_id: Some(cart.user_id),
            items
        })
    })
    .await??;

    Ok(res)
}

#[tracing::instrument(
    "Deleting cart",
    skip(conn)
)]
pub async fn delete_cart(
    mut conn: DbConnection,
    actor: Identity
) -> Result<(), CartError>{
    authorize(&actor, Action::ManageCart, Resource::Own)?;

    spawn_blocking_with_tracing(move || {
        conn.transaction::<(), CartError, _>(|conn| {
            let cart = lock_cart(conn, actor.user_id)?
                .ok_or(CartError::NoCartError)?;

            clear_cart_items(conn, cart.cart_id)?;

            diesel::delete(carts::table)
                .filter(carts::cart_id.eq(cart.cart_id))
                .execute(conn)?;

            Ok(())
        })
    })
    .await??;

    Ok(())
}
