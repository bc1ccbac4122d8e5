use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::{
    auth::extractors::Identity,
    db_interaction::update_menu_item as update_item,
    error::ApiError,
    models::MenuItemChangeset,
    utils::{get_pooled_connection, DbPool}
};

use super::post::validate_price;

#[tracing::instrument(
    "Updating menu item",
    skip(pool, body)
)]
pub async fn update_menu_item(
    pool: web::Data<DbPool>,
    actor: Identity,
    path: web::Path<Uuid>,
    body: web::Json<MenuItemChangeset>
) -> Result<HttpResponse, ApiError>{
    let changes = body.into_inner();
    if changes.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err(ApiError::InvalidArgument("Name cannot be empty".to_string()))
    }
    if let Some(price) = changes.price {
        validate_price(price)?;
    }

    let conn = get_pooled_connection(&pool).await?;
    let item = update_item(conn, actor, path.into_inner(), changes).await?;

    Ok(HttpResponse::Ok().json(item))
}
