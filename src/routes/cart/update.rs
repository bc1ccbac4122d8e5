use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::extractors::Identity, db_interaction::update_cart_item_quantity, error::ApiError, utils::{get_pooled_connection, DbPool}};

#[derive(Deserialize, Debug)]
pub struct UpdateCartItemForm{
    pub quantity: Option<i32>
}

// `{id}` is the menu item id of the cart line
#[tracing::instrument(
    "Updating cart item",
    skip(pool)
)]
pub async fn update_cart_item(
    pool: web::Data<DbPool>,
    actor: Identity,
    path: web::Path<Uuid>,
    form: web::Json<UpdateCartItemForm>
) -> Result<HttpResponse, ApiError>{
    let quantity = form.quantity
        .ok_or_else(|| ApiError::InvalidArgument("Valid quantity is required".to_string()))?;

    let conn = get_pooled_connection(&pool).await?;
    let item = update_cart_item_quantity(conn, actor, path.into_inner(), quantity).await?;

    Ok(HttpResponse::Ok().json(item))
}
