use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{auth::extractors::Identity, db_interaction::remove_cart_item as remove_item, error::ApiError, utils::{get_pooled_connection, DbPool}};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCartItemForm{
    pub menu_item_id: Option<Uuid>
}

#[tracing::instrument(
    "Removing item from cart",
    skip(pool)
)]
pub async fn remove_cart_item(
    pool: web::Data<DbPool>,
    actor: Identity,
    form: web::Json<RemoveCartItemForm>
) -> Result<HttpResponse, ApiError>{
    let menu_item_id = form.menu_item_id
        .ok_or_else(|| ApiError::InvalidArgument("Menu item ID is required".to_string()))?;

    let conn = get_pooled_connection(&pool).await?;
    remove_item(conn, actor, menu_item_id).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Item removed from cart" })))
}
