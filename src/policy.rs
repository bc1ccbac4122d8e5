//! Access control for every state-changing and owner-scoped operation.
//!
//! Handlers resolve the resource they are about to touch (who owns the
//! restaurant, who placed the order) and ask [`authorize`] before doing any
//! work. Role gating and ownership checks both live here.

use uuid::Uuid;

use crate::{auth::extractors::Identity, domain::user_role::UserRole, error::ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action{
    ManageCart,
    Checkout,
    ListOwnOrders,
    ViewOrder,
    UpdateOrderStatus,
    CreateRestaurant,
    ManageRestaurant,
    ViewRestaurantOrders,
    CreateUser
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource{
    // Something scoped to the caller themselves (their cart, their order list)
    Own,
    Order{
        customer_id: Uuid,
        restaurant_owner_id: Uuid
    },
    Restaurant{
        owner_id: Uuid
    },
    Platform
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PolicyError{
    #[error("Forbidden: insufficient rights")]
    InsufficientRole,
    #[error("Not authorized")]
    NotOwner
}

impl From<PolicyError> for ApiError {
    fn from(e: PolicyError) -> Self {
        ApiError::Forbidden(e.to_string())
    }
}

#[tracing::instrument(
    "Authorizing action",
    level = "debug"
)]
pub fn authorize(actor: &Identity, action: Action, resource: Resource) -> Result<(), PolicyError>{
    use UserRole::*;

    match (action, resource) {
        (Action::ManageCart | Action::Checkout | Action::ListOwnOrders, Resource::Own) => {
            require_role(actor, &[CUSTOMER])
        },
        (Action::ViewOrder, Resource::Order { customer_id, .. }) => {
            require_role(actor, &[CUSTOMER])?;
            require_owner(actor, customer_id)
        },
        // Role gate applied before the order is looked up
        (Action::UpdateOrderStatus, Resource::Platform) => require_role(actor, &[RESTAURANT, DRIVER, ADMIN]),
        (Action::UpdateOrderStatus, Resource::Order { restaurant_owner_id, .. }) => {
            require_role(actor, &[RESTAURANT, DRIVER, ADMIN])?;
            match actor.role {
                RESTAURANT => require_owner(actor, restaurant_owner_id),
                _ => Ok(())
            }
        },
        (Action::CreateRestaurant, Resource::Own) => require_role(actor, &[RESTAURANT]),
        (Action::ManageRestaurant, Resource::Restaurant { owner_id }) => {
            require_role(actor, &[RESTAURANT])?;
            require_owner(actor, owner_id)
        },
        (Action::ViewRestaurantOrders, Resource::Restaurant { owner_id }) => {
            match actor.role {
                ADMIN => Ok(()),
                RESTAURANT => require_owner(actor, owner_id),
                _ => Err(PolicyError::InsufficientRole)
            }
        },
        (Action::CreateUser, Resource::Platform) => require_role(actor, &[ADMIN]),
        _ => Err(PolicyError::InsufficientRole)
    }
}

fn require_role(actor: &Identity, allowed: &[UserRole]) -> Result<(), PolicyError>{
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        Err(PolicyError::InsufficientRole)
    }
}

fn require_owner(actor: &Identity, owner_id: Uuid) -> Result<(), PolicyError>{
    if actor.user_id == owner_id {
        Ok(())
    } else {
        Err(PolicyError::NotOwner)
    }
}
