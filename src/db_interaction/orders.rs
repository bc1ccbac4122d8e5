use std::{collections::HashMap, error::Error, fmt::Debug};

use chrono::Utc;
use diesel::{Connection, ExpressionMethods, OptionalExtension, QueryDsl, QueryResult, RunQueryDsl, SelectableHelper};
use thiserror::Error;
use uuid::Uuid;

use crate::{auth::extractors::Identity, domain::{checkout::{plan_checkout, CheckoutLine, CheckoutPlanError}, order_status::OrderStatus}, error::ApiError, models::{CheckoutResult, Order, OrderItemModel, OrderWithItems, RestaurantSummary}, policy::{authorize, Action, PolicyError, Resource}, schema::{order_items, orders, restaurants}, telemetry::spawn_blocking_with_tracing, utils::{error_fmt_chain, DbConnection}};

use super::{cart::{clear_cart_items, load_cart_lines, lock_cart}, restaurant::{load_owned_restaurant, RestaurantError}};

#[derive(Debug, Clone, Copy)]
pub struct Page{
    pub page: i64,
    pub limit: i64
}

impl Page {
    fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

// Attaches items and restaurant summaries to `orders`, keeping their order
#[tracing::instrument(
    "Getting order items and restaurants for orders",
    skip_all
)]
pub fn get_order_with_items(conn: &mut DbConnection, orders: Vec<Order>) -> QueryResult<Vec<OrderWithItems>>{
    if orders.is_empty() {
        return Ok(Vec::new())
    }

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.order_id).collect();
    let restaurant_ids: Vec<Uuid> = orders.iter().map(|o| o.restaurant_id).collect();

    let mut items_by_order: HashMap<Uuid, Vec<OrderItemModel>> = HashMap::new();
    for item in order_items::table
        .filter(order_items::order_id.eq_any(order_ids))
        .select(OrderItemModel::as_select())
        .load::<OrderItemModel>(conn)?
    {
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    let restaurants_by_id: HashMap<Uuid, RestaurantSummary> = restaurants::table
        .filter(restaurants::restaurant_id.eq_any(restaurant_ids))
        .select(RestaurantSummary::as_select())
        .load::<RestaurantSummary>(conn)?
        .into_iter()
        .map(|r| (r.restaurant_id, r))
        .collect();

    orders.into_iter()
        .map(|order| {
            let restaurant = restaurants_by_id
                .get(&order.restaurant_id)
                .cloned()
                .ok_or(diesel::result::Error::NotFound)?;
            let items = items_by_order.remove(&order.order_id).unwrap_or_default();

            Ok(OrderWithItems{ order, items, restaurant })
        })
        .collect()
}

// Error associated with turning a cart into orders
#[derive(Error)]
pub enum CheckoutError{
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
    #[error("Cart is empty")]
    EmptyCartError,
    #[error("{0} is no longer available")]
    UnavailableItemError(String),
    #[error("Order total exceeds the allowed maximum")]
    TotalTooLargeError(Uuid),
    #[error(transparent)]
    Forbidden(#[from] PolicyError)
}

impl Debug for CheckoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, self.source())
    }
}

impl From<CheckoutPlanError> for CheckoutError {
    fn from(e: CheckoutPlanError) -> Self {
        match e {
            CheckoutPlanError::EmptyCart => CheckoutError::EmptyCartError,
            CheckoutPlanError::UnavailableItem(name) => CheckoutError::UnavailableItemError(name),
            CheckoutPlanError::TotalTooLarge(restaurant_id) => CheckoutError::TotalTooLargeError(restaurant_id)
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::EmptyCartError
            | CheckoutError::UnavailableItemError(_)
            | CheckoutError::TotalTooLargeError(_) => ApiError::InvalidState(e.to_string()),
            CheckoutError::Forbidden(p) => p.into(),
            _ => ApiError::Internal(anyhow::anyhow!("{:?}", e))
        }
    }
}

/// Converts the caller's cart into one order per restaurant and empties the cart.
///
/// Everything happens in one transaction. The cart row is locked first, so a
/// second checkout of the same cart waits for this one and then finds the cart
/// empty. Prices and names are copied from the menu items as they are read
/// here. If anything fails nothing is written and the cart is left as it was.
#[tracing::instrument(
    "Checking out cart",
    skip(conn)
)]
pub async fn checkout_cart(
    mut conn: DbConnection,
    actor: Identity,
    address_snapshot: serde_json::Value
) -> Result<CheckoutResult, CheckoutError>{
    authorize(&actor, Action::Checkout, Resource::Own)?;

    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<CheckoutResult, CheckoutError, _>(|conn| {
            let cart = lock_cart(conn, actor.user_id)?
                .ok_or(CheckoutError::EmptyCartError)?;

            let lines = load_cart_lines(conn, cart.cart_id)?
                .into_iter()
                .map(|(item, menu_item)| CheckoutLine{
                    menu_item_id: menu_item.menu_item_id,
                    restaurant_id: menu_item.restaurant_id,
                    name: menu_item.name,
                    price: menu_item.price,
                    quantity: item.quantity,
                    is_available: menu_item.is_available
                })
                .collect();

            let plan = plan_checkout(lines)?;
            let now = Utc::now();
            let mut created = Vec::with_capacity(plan.groups.len());

            for group in plan.groups {
                let order = Order{
                    order_id: Uuid::new_v4(),
                    customer_id: actor.user_id,
                    restaurant_id: group.restaurant_id,
                    total: group.subtotal,
                    status: OrderStatus::Pending.as_str().to_string(),
                    address_snapshot: address_snapshot.clone(),
                    created_at: now,
                    updated_at: now
                };

                diesel::insert_into(orders::table)
                    .values(&order)
                    .execute(conn)?;

                let items: Vec<OrderItemModel> = group.lines.into_iter()
                    .map(|line| OrderItemModel{
                        order_item_id: Uuid::new_v4(),
                        order_id: order.order_id,
                        menu_item_id: Some(line.menu_item_id),
                        name: line.name,
                        price: line.price,
                        quantity: line.quantity
                    })
                    .collect();

                diesel::insert_into(order_items::table)
                    .values(&items)
                    .execute(conn)?;

                created.push(order);
            }

            clear_cart_items(conn, cart.cart_id)?;

            let orders = get_order_with_items(conn, created)?;

            tracing::info!(
                order_count = orders.len(),
                grand_total = %plan.grand_total,
                "Cart checked out"
            );

            Ok(CheckoutResult{
                grand_total: plan.grand_total,
                orders
            })
        })
    })
    .await??;

    Ok(res)
}

// Errors associated with reading orders
#[derive(Error)]
pub enum OrderQueryError{
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
    #[error("Order not found")]
    NoOrderIdError(Uuid),
    #[error("Restaurant not found")]
    NoRestaurantError(Uuid),
    #[error(transparent)]
    Forbidden(#[from] PolicyError),
    #[error("Unexpected error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for OrderQueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, self.source())
    }
}

impl From<RestaurantError> for OrderQueryError {
    fn from(e: RestaurantError) -> Self {
        match e {
            RestaurantError::NoRestaurantError(id) => OrderQueryError::NoRestaurantError(id),
            RestaurantError::Forbidden(p) => OrderQueryError::Forbidden(p),
            RestaurantError::RunQueryError(q) => OrderQueryError::RunQueryError(q),
            other => OrderQueryError::UnexpectedError(anyhow::anyhow!("{:?}", other))
        }
    }
}

impl From<OrderQueryError> for ApiError {
    fn from(e: OrderQueryError) -> Self {
        match e {
            OrderQueryError::NoOrderIdError(_)
            | OrderQueryError::NoRestaurantError(_) => ApiError::NotFound(e.to_string()),
            OrderQueryError::Forbidden(p) => p.into(),
            _ => ApiError::Internal(anyhow::anyhow!("{:?}", e))
        }
    }
}

#[tracing::instrument(
    "Getting orders of customer",
    skip(conn)
)]
pub async fn get_orders_for_customer(
    mut conn: DbConnection,
    actor: Identity,
    page: Page
) -> Result<Vec<OrderWithItems>, OrderQueryError>{
    authorize(&actor, Action::ListOwnOrders, Resource::Own)?;

    let res = spawn_blocking_with_tracing(move || {
        let placed = orders::table
            .filter(orders::customer_id.eq(actor.user_id))
            .order((orders::created_at.desc(), orders::order_id.asc()))
            .limit(page.limit)
            .offset(page.offset())
            .select(Order::as_select())
            .load::<Order>(&mut conn)?;

        get_order_with_items(&mut conn, placed)
    })
    .await??;

    Ok(res)
}

#[tracing::instrument(
    "Getting order by id",
    skip(conn)
)]
pub async fn get_order_by_id(
    mut conn: DbConnection,
    actor: Identity,
    order_id: Uuid
) -> Result<OrderWithItems, OrderQueryError>{
    let res = spawn_blocking_with_tracing(move || {
        let (order, restaurant_owner_id) = orders::table
            .inner_join(restaurants::table)
            .filter(orders::order_id.eq(order_id))
            .select((Order::as_select(), restaurants::owner_id))
            .first::<(Order, Uuid)>(&mut conn)
            .optional()?
            .ok_or(OrderQueryError::NoOrderIdError(order_id))?;

        authorize(&actor, Action::ViewOrder, Resource::Order{
            customer_id: order.customer_id,
            restaurant_owner_id
        })?;

        let mut with_items = get_order_with_items(&mut conn, vec![order])?;
        with_items.pop().ok_or(OrderQueryError::NoOrderIdError(order_id))
    })
    .await??;

    Ok(res)
}

#[tracing::instrument(
    "Getting orders of restaurant",
    skip(conn)
)]
pub async fn get_restaurant_orders(
    mut conn: DbConnection,
    actor: Identity,
    restaurant_id: Uuid,
    page: Page
) -> Result<Vec<OrderWithItems>, OrderQueryError>{
    let res = spawn_blocking_with_tracing(move || {
        load_owned_restaurant(&mut conn, &actor, Action::ViewRestaurantOrders, restaurant_id)?;

        let received = orders::table
            .filter(orders::restaurant_id.eq(restaurant_id))
            .order((orders::created_at.desc(), orders::order_id.asc()))
            .limit(page.limit)
            .offset(page.offset())
            .select(Order::as_select())
            .load::<Order>(&mut conn)?;

        Ok::<_, OrderQueryError>(get_order_with_items(&mut conn, received)?)
    })
    .await??;

    Ok(res)
}

// Error associated with updating order status
#[derive(Error)]
pub enum UpdateOrderStatusError{
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
    #[error("Order not found")]
    NoOrderIdError(Uuid),
    #[error("cannot move order from {from} to {to}")]
    InvalidTransitionError{
        from: OrderStatus,
        to: OrderStatus
    },
    #[error("Stored order status is invalid: {0}")]
    CorruptStatusError(String),
    #[error(transparent)]
    Forbidden(#[from] PolicyError)
}

impl Debug for UpdateOrderStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, self.source())
    }
}

impl From<UpdateOrderStatusError> for ApiError {
    fn from(e: UpdateOrderStatusError) -> Self {
        match e {
            UpdateOrderStatusError::NoOrderIdError(_) => ApiError::NotFound(e.to_string()),
            UpdateOrderStatusError::InvalidTransitionError{ from, to } => ApiError::InvalidTransition{ from, to },
            UpdateOrderStatusError::Forbidden(p) => p.into(),
            _ => ApiError::Internal(anyhow::anyhow!("{:?}", e))
        }
    }
}

/// Moves an order to `status`.
///
/// The order row is locked while the current status is checked against the
/// transition table, so two actors racing on the same order cannot both
/// apply a transition from the same starting state. Only the status (and
/// the `updated_at` bookkeeping column) is written.
#[tracing::instrument(
    "Updating order status",
    skip(conn)
)]
pub async fn update_order_status(
    mut conn: DbConnection,
    actor: Identity,
    order_id: Uuid,
    status: OrderStatus
) -> Result<Order, UpdateOrderStatusError> {
    authorize(&actor, Action::UpdateOrderStatus, Resource::Platform)?;

    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Order, UpdateOrderStatusError, _>(|conn| {
            let order = orders::table
                .filter(orders::order_id.eq(order_id))
                .select(Order::as_select())
                .for_update()
                .first::<Order>(conn)
                .optional()?
                .ok_or(UpdateOrderStatusError::NoOrderIdError(order_id))?;

            let restaurant_owner_id = restaurants::table
                .filter(restaurants::restaurant_id.eq(order.restaurant_id))
                .select(restaurants::owner_id)
                .first::<Uuid>(conn)?;

            authorize(&actor, Action::UpdateOrderStatus, Resource::Order{
                customer_id: order.customer_id,
                restaurant_owner_id
            })?;

            let current = order.status()
                .map_err(UpdateOrderStatusError::CorruptStatusError)?;

            if !current.can_transition_to(status) {
                return Err(UpdateOrderStatusError::InvalidTransitionError{ from: current, to: status })
            }

            let updated = diesel::update(orders::table)
                .filter(orders::order_id.eq(order_id))
                .set((
                    orders::status.eq(status.as_str()),
                    orders::updated_at.eq(Utc::now())
                ))
                .returning(Order::as_returning())
                .get_result::<Order>(conn)?;

            tracing::info!(%order_id, from = %current, to = %status, "Order status updated");

            Ok(updated)
        })
    })
    .await??;

    Ok(res)
}
