use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{auth::extractors::Identity, db_interaction::checkout_cart, error::ApiError, utils::{get_pooled_connection, DbPool}};

#[derive(Deserialize, Debug, Default)]
pub struct CheckoutForm{
    pub address: Option<serde_json::Value>
}

// Delivery address stored on every created order, `{}` when none is given.
// A body that is present but not a valid checkout form is refused.
fn address_snapshot(body: &[u8]) -> Result<serde_json::Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}))
    }

    let form: CheckoutForm = serde_json::from_slice(body)
        .map_err(|e| ApiError::InvalidArgument(format!("Invalid checkout body: {}", e)))?;

    match form.address {
        Some(serde_json::Value::Null) | None => Ok(json!({})),
        Some(address) => Ok(address)
    }
}

#[tracing::instrument(
    "Placing orders from cart",
    skip(pool, body)
)]
pub async fn checkout(
    pool: web::Data<DbPool>,
    actor: Identity,
    body: web::Bytes
) -> Result<HttpResponse, ApiError> {
    let address = address_snapshot(&body)?;

    let conn = get_pooled_connection(&pool).await?;
    let result = checkout_cart(conn, actor, address).await?;

    Ok(HttpResponse::Created().json(result))
}
