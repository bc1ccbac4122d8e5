//! Splitting a cart into one order per restaurant.
//!
//! This is the pure half of checkout: it takes the cart lines as they were read
//! inside the checkout transaction (already joined with the current menu item
//! price) and decides which orders to create and what they cost. Persisting the
//! result is done by `db_interaction::orders::checkout_cart`.

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

// Largest value an order total column can hold, NUMERIC(12, 2)
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

// A cart item resolved against its menu item at checkout time
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutLine{
    pub menu_item_id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub is_available: bool
}

impl CheckoutLine {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantGroup{
    pub restaurant_id: Uuid,
    pub lines: Vec<CheckoutLine>,
    pub subtotal: Decimal
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutPlan{
    pub groups: Vec<RestaurantGroup>,
    pub grand_total: Decimal
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CheckoutPlanError{
    #[error("Cart is empty")]
    EmptyCart,
    #[error("{0} is no longer available")]
    UnavailableItem(String),
    #[error("Order total exceeds the allowed maximum")]
    TotalTooLarge(Uuid)
}

/// Groups `lines` by restaurant, keeping the order in which each restaurant
/// first shows up, and totals every group.
pub fn plan_checkout(lines: Vec<CheckoutLine>) -> Result<CheckoutPlan, CheckoutPlanError>{
    if lines.is_empty() {
        return Err(CheckoutPlanError::EmptyCart)
    }

    if let Some(line) = lines.iter().find(|line| !line.is_available) {
        return Err(CheckoutPlanError::UnavailableItem(line.name.clone()))
    }

    let mut groups: Vec<RestaurantGroup> = Vec::new();
    let mut index_by_restaurant: HashMap<Uuid, usize> = HashMap::new();

    for line in lines {
        let idx = *index_by_restaurant
            .entry(line.restaurant_id)
            .or_insert_with(|| {
                groups.push(RestaurantGroup{
                    restaurant_id: line.restaurant_id,
                    lines: Vec::new(),
                    subtotal: Decimal::ZERO
                });
                groups.len() - 1
            });

        let group = &mut groups[idx];
        group.subtotal += line.line_total();
        group.lines.push(line);
    }

    if let Some(group) = groups.iter().find(|group| group.subtotal > MAX_ORDER_TOTAL) {
        return Err(CheckoutPlanError::TotalTooLarge(group.restaurant_id))
    }

    let grand_total = groups.iter().map(|group| group.subtotal).sum();

    Ok(CheckoutPlan{ groups, grand_total })
}
