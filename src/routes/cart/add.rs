use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::extractors::Identity, db_interaction::add_item_to_cart, error::ApiError, utils::{get_pooled_connection, DbPool}};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemForm{
    pub menu_item_id: Option<Uuid>,
    pub quantity: Option<i32>
}

#[tracing::instrument(
    "Adding item to cart",
    skip(pool)
)]
pub async fn add_cart_item(
    pool: web::Data<DbPool>,
    actor: Identity,
    form: web::Json<AddCartItemForm>
) -> Result<HttpResponse, ApiError>{
    let form = form.into_inner();
    let menu_item_id = form.menu_item_id
        .ok_or_else(|| ApiError::InvalidArgument("Menu item ID is required".to_string()))?;

    let conn = get_pooled_connection(&pool).await?;
    let item = add_item_to_cart(conn, actor, menu_item_id, form.quantity.unwrap_or(1)).await?;

    Ok(HttpResponse::Created().json(item))
}
